//! Two-phase take generation for one work item
//!
//! Phase one drafts free-form takes from the roster and shared context.
//! Phase two asks the backend to re-check the draft against the roster and
//! return it in the structured take schema. The structured result is then
//! filtered through the roster-membership rules in [`super::validation`].

use super::types::{Take, WorkItem};
use super::validation::{players_named_in, retain_valid};
use crate::claude::prompt::take_list_schema;
use crate::claude::{OutputSchema, PromptEngine, TextGenerator};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Unstructured phase-one output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeDraft {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StructuredTakes {
    Wrapped { takes: Vec<Take> },
    Bare(Vec<Take>),
}

impl StructuredTakes {
    fn into_takes(self) -> Vec<Take> {
        match self {
            StructuredTakes::Wrapped { takes } | StructuredTakes::Bare(takes) => takes,
        }
    }
}

/// Parse the structured phase output into takes.
pub fn parse_takes(value: Value) -> Result<Vec<Take>> {
    serde_json::from_value::<StructuredTakes>(value)
        .map(StructuredTakes::into_takes)
        .map_err(|e| Error::MalformedResponse(format!("Structured takes did not match schema: {e}")))
}

pub struct TakeGenerator {
    backend: Arc<dyn TextGenerator>,
    prompts: PromptEngine,
    schema: OutputSchema,
}

impl TakeGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Result<Self> {
        Ok(Self {
            backend,
            prompts: PromptEngine::new()?,
            schema: take_list_schema(),
        })
    }

    /// Phase one: free-text draft
    pub async fn draft(&self, item: &WorkItem) -> Result<TakeDraft> {
        let request = self.prompts.draft_request(
            &item.roster.notify_target,
            item.context.as_str(),
            &item.roster.player_list(),
        )?;
        let text = self.backend.complete(&request).await?;
        debug!("Draft for {}: {} bytes", item.roster.notify_target, text.len());
        Ok(TakeDraft { text })
    }

    /// Phase two: verify the draft against the roster and structure it
    pub async fn review(&self, item: &WorkItem, draft: &TakeDraft) -> Result<Vec<Take>> {
        let request = self.prompts.review_request(
            &item.roster.notify_target,
            &draft.text,
            &item.roster.player_list(),
        )?;
        let value = self
            .backend
            .complete_structured(&request, &self.schema)
            .await?;
        parse_takes(value)
    }

    /// Run both phases and keep only takes that pass validation.
    ///
    /// A roster none of whose players appear in the shared context yields an
    /// empty list without touching the backend.
    pub async fn generate(&self, item: &WorkItem) -> Result<Vec<Take>> {
        if players_named_in(&item.roster, item.context.as_str()).is_empty() {
            debug!(
                "No rostered player named in context for {}, skipping backend",
                item.roster.notify_target
            );
            return Ok(Vec::new());
        }

        let draft = self.draft(item).await?;
        let proposed = self.review(item, &draft).await?;
        let proposed_count = proposed.len();
        let takes = retain_valid(proposed, &item.roster, &item.context);

        info!(
            "{}: {} takes ({} proposed)",
            item.roster.notify_target,
            takes.len(),
            proposed_count
        );
        Ok(takes)
    }
}
