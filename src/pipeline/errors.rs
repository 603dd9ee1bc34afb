//! Pipeline error taxonomy
//!
//! Only stages that every branch depends on can fail a run. A
//! [`PipelineError::Branch`] is contained: it is recorded in that branch's
//! outcome and the run carries on.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stages a pipeline error can be attributed to.
///
/// Roster and context loading are the only fatal stages. `GenerateTakes`
/// labels contained branch failures. Fan-out cannot fail and publish
/// failures are reported per take, so neither has a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    LoadRosters,
    LoadContext,
    GenerateTakes,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::LoadRosters => write!(f, "load-rosters"),
            PipelineStage::LoadContext => write!(f, "load-context"),
            PipelineStage::GenerateTakes => write!(f, "generate-takes"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Stage {stage} failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Error,
    },

    #[error("Branch for {team} failed: {source}")]
    Branch {
        team: String,
        #[source]
        source: Error,
    },
}

impl PipelineError {
    pub fn stage(stage: PipelineStage, source: Error) -> Self {
        PipelineError::Stage { stage, source }
    }

    pub fn branch(team: impl Into<String>, source: Error) -> Self {
        PipelineError::Branch {
            team: team.into(),
            source,
        }
    }

    pub fn failed_stage(&self) -> PipelineStage {
        match self {
            PipelineError::Stage { stage, .. } => *stage,
            PipelineError::Branch { .. } => PipelineStage::GenerateTakes,
        }
    }

    /// Whether the error ends the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Stage { .. })
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_names_stage_and_cause() {
        let err = PipelineError::stage(
            PipelineStage::LoadRosters,
            Error::Auth("ESPN returned 401".to_string()),
        );
        assert_eq!(err.failed_stage(), PipelineStage::LoadRosters);
        let message = err.to_string();
        assert!(message.contains("load-rosters"));
        assert!(message.contains("401"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_stage_labels() {
        let labels: Vec<String> = [
            PipelineStage::LoadRosters,
            PipelineStage::LoadContext,
            PipelineStage::GenerateTakes,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(labels, vec!["load-rosters", "load-context", "generate-takes"]);
    }

    #[test]
    fn test_branch_error_is_contained() {
        let err = PipelineError::branch("@Wei Wong", Error::External("overloaded".to_string()));
        assert!(!err.is_fatal());
        assert_eq!(err.failed_stage(), PipelineStage::GenerateTakes);
        assert_eq!(err.to_string(), "Branch for @Wei Wong failed: External API error: overloaded");
    }
}
