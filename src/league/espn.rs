//! ESPN fantasy football league client

use super::{LeagueProvider, LeagueTeam};
use crate::config::LeagueConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const ESPN_BASE_URL: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl";

pub struct EspnClient {
    client: Client,
    base_url: String,
    league_id: String,
    season: u16,
    cookie: Option<String>,
}

impl EspnClient {
    pub fn new(config: &LeagueConfig) -> Result<Self> {
        let league_id = config
            .league_id
            .clone()
            .ok_or_else(|| Error::Config("league.league_id is required".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let cookie = match (&config.espn_s2, &config.swid) {
            (Some(s2), Some(swid)) => Some(format!("espn_s2={s2}; SWID={swid}")),
            _ => None,
        };

        Ok(Self {
            client,
            base_url: ESPN_BASE_URL.to_string(),
            league_id,
            season: config.season,
            cookie,
        })
    }

    /// Point the client at another host (used against local fixtures)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn league_url(&self) -> String {
        format!(
            "{}/seasons/{}/segments/0/leagues/{}",
            self.base_url.trim_end_matches('/'),
            self.season,
            self.league_id
        )
    }
}

#[async_trait]
impl LeagueProvider for EspnClient {
    async fn teams(&self) -> Result<Vec<LeagueTeam>> {
        let url = self.league_url();
        debug!("Fetching league rosters from {}", url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("view", "mTeam"), ("view", "mRoster")]);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => {
                let league: LeagueResponse = response.json().await.map_err(|e| {
                    Error::MalformedResponse(format!("Failed to parse ESPN league: {}", e))
                })?;
                Ok(league.into_teams())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth(format!(
                "ESPN rejected credentials for league {} ({})",
                self.league_id,
                response.status()
            ))),
            StatusCode::NOT_FOUND => Err(Error::External(format!(
                "ESPN league {} not found for season {}",
                self.league_id, self.season
            ))),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(Error::HttpStatus(format!("ESPN {}: {}", status, error_text)))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct LeagueResponse {
    #[serde(default)]
    teams: Vec<TeamEntry>,
}

impl LeagueResponse {
    fn into_teams(self) -> Vec<LeagueTeam> {
        self.teams.into_iter().map(TeamEntry::into_team).collect()
    }
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    roster: Option<Roster>,
}

impl TeamEntry {
    /// `name` when present, otherwise "location nickname"
    fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!(
                "{} {}",
                self.location.as_deref().unwrap_or_default(),
                self.nickname.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string(),
        }
    }

    fn into_team(self) -> LeagueTeam {
        let name = self.display_name();
        let players = self
            .roster
            .map(|roster| {
                roster
                    .entries
                    .into_iter()
                    .filter_map(|entry| entry.player_pool_entry)
                    .map(|pool| pool.player.full_name)
                    .collect()
            })
            .unwrap_or_default();
        LeagueTeam { name, players }
    }
}

#[derive(Debug, Deserialize)]
struct Roster {
    #[serde(default)]
    entries: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterEntry {
    #[serde(default)]
    player_pool_entry: Option<PlayerPoolEntry>,
}

#[derive(Debug, Deserialize)]
struct PlayerPoolEntry {
    player: Player,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Player {
    full_name: String,
}
