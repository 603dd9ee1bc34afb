//! Fantasy-league roster source
//!
//! The pipeline only needs each team's display name and its players in the
//! provider's order. [`LeagueProvider`] is that boundary; [`EspnClient`] is
//! the production implementation and [`MockLeagueProvider`] serves tests.

pub mod espn;

pub use espn::EspnClient;

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A team as reported by the league provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueTeam {
    pub name: String,
    pub players: Vec<String>,
}

impl LeagueTeam {
    pub fn new(name: impl Into<String>, players: &[&str]) -> Self {
        Self {
            name: name.into(),
            players: players.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[async_trait]
pub trait LeagueProvider: Send + Sync {
    /// Fetch every team in the configured league and season
    async fn teams(&self) -> Result<Vec<LeagueTeam>>;
}

/// Test double returning a fixed team list or a fixed failure
#[derive(Clone, Default)]
pub struct MockLeagueProvider {
    teams: Vec<LeagueTeam>,
    failure: Option<String>,
    calls: Arc<Mutex<usize>>,
}

impl MockLeagueProvider {
    pub fn new(teams: Vec<LeagueTeam>) -> Self {
        Self {
            teams,
            failure: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// A provider whose every call fails as an auth error
    pub fn failing(message: &str) -> Self {
        Self {
            teams: Vec::new(),
            failure: Some(message.to_string()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl LeagueProvider for MockLeagueProvider {
    async fn teams(&self) -> Result<Vec<LeagueTeam>> {
        *self.calls.lock().await += 1;
        match &self.failure {
            Some(message) => Err(Error::Auth(message.clone())),
            None => Ok(self.teams.clone()),
        }
    }
}
