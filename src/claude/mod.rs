//! Text-generation backend
//!
//! Take generation talks to the model through [`TextGenerator`], which offers
//! a free-text completion and a schema-constrained completion. The
//! production implementation is [`ClaudeClient`] (Anthropic Messages API);
//! [`MockTextGenerator`] answers from closures for tests.

pub mod api;
pub mod mock;
pub mod prompt;

pub use api::ClaudeClient;
pub use mock::MockTextGenerator;
pub use prompt::PromptEngine;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A system instruction plus one user instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// JSON schema the structured completion must conform to
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Free-text completion
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Completion constrained to `schema`; returns the conforming JSON value
    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        schema: &OutputSchema,
    ) -> Result<Value>;
}
