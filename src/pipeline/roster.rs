//! Roster loading: league teams to notify-target rosters

use super::types::{TeamRoster, UNKNOWN_TARGET};
use crate::error::Result;
use crate::league::{LeagueProvider, LeagueTeam};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Static, exact-match mapping from team name to notify target
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    targets: BTreeMap<String, String>,
}

impl TeamDirectory {
    pub fn new(targets: BTreeMap<String, String>) -> Self {
        Self { targets }
    }

    /// Target for `team_name`, or [`UNKNOWN_TARGET`] when unmapped
    pub fn resolve(&self, team_name: &str) -> &str {
        self.targets
            .get(team_name)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_TARGET)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Pure: pair every team with its target, keeping provider order.
pub fn build_rosters(teams: Vec<LeagueTeam>, directory: &TeamDirectory) -> Vec<TeamRoster> {
    teams
        .into_iter()
        .map(|team| {
            let target = directory.resolve(&team.name);
            if target == UNKNOWN_TARGET {
                warn!("No notify target mapped for team '{}'", team.name);
            }
            TeamRoster::new(target, team.players)
        })
        .collect()
}

/// Fetch the league and build rosters. Provider failures propagate.
pub async fn load_rosters(
    provider: &dyn LeagueProvider,
    directory: &TeamDirectory,
) -> Result<Vec<TeamRoster>> {
    let teams = provider.teams().await?;
    let rosters = build_rosters(teams, directory);
    info!(
        "Loaded {} rosters ({} players total)",
        rosters.len(),
        rosters.iter().map(|r| r.players.len()).sum::<usize>()
    );
    Ok(rosters)
}
