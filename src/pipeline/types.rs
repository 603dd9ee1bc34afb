//! Data shapes passed between pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::aggregation::TakeList;

/// Notification target used when a team name has no entry in the directory
pub const UNKNOWN_TARGET: &str = "Unknown";

/// One fantasy team's membership, as fetched from the league provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoster {
    /// Who gets notified about this team (e.g. a Slack handle)
    pub notify_target: String,
    /// Player names in provider order; duplicates are kept as-is
    pub players: Vec<String>,
}

impl TeamRoster {
    pub fn new(notify_target: impl Into<String>, players: Vec<String>) -> Self {
        Self {
            notify_target: notify_target.into(),
            players,
        }
    }

    pub fn contains_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }

    /// Players joined the way prompts present them
    pub fn player_list(&self) -> String {
        self.players.join(" // ")
    }
}

/// The run-wide block of external discussion text.
///
/// Cloning shares the underlying buffer, so every work item observes the
/// same, fully materialized instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedContext(Arc<str>);

impl SharedContext {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when there is no content worth sending to a model
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether two handles point at the same materialized context
    pub fn same_instance(&self, other: &SharedContext) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated narrative unit about one rostered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Take {
    pub title: String,
    pub body: String,
    pub source_url: String,
    /// Discussion-post URL the news came from
    pub origin_url: String,
    /// Why the take applies; must name the rostered player verbatim
    pub justification: String,
}

/// Self-contained input for one take-generation branch
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Position in dispatch order
    pub index: usize,
    pub roster: TeamRoster,
    pub context: SharedContext,
}

/// Everything one pipeline execution accumulates; discarded at run end
#[derive(Debug, Clone)]
pub struct RunState {
    pub rosters: Vec<TeamRoster>,
    pub context: SharedContext,
    pub takes: TakeList,
}

impl RunState {
    pub fn new(rosters: Vec<TeamRoster>, context: SharedContext) -> Self {
        Self {
            rosters,
            context,
            takes: TakeList::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_keeps_duplicates_and_order() {
        let roster = TeamRoster::new(
            "@X",
            vec!["B".to_string(), "A".to_string(), "B".to_string()],
        );
        assert_eq!(roster.players, vec!["B", "A", "B"]);
        assert_eq!(roster.player_list(), "B // A // B");
        assert!(roster.contains_player("A"));
        assert!(!roster.contains_player("a"));
    }

    #[test]
    fn test_shared_context_clone_is_same_instance() {
        let context = SharedContext::new("news");
        let clone = context.clone();
        let other = SharedContext::new("news");

        assert!(context.same_instance(&clone));
        assert!(!context.same_instance(&other));
        assert_eq!(context, other);
    }

    #[test]
    fn test_blank_context() {
        assert!(SharedContext::new("").is_blank());
        assert!(SharedContext::new("  \n\n").is_blank());
        assert!(!SharedContext::new("Title: x").is_blank());
    }

    #[test]
    fn test_run_state_starts_without_takes() {
        let state = RunState::new(vec![], SharedContext::new(""));
        assert!(state.takes.is_empty());
    }
}
