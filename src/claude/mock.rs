//! Closure-driven text generator for tests
//!
//! Branches run concurrently against one shared generator, so responses are
//! computed from the request instead of popped from a queue.

use super::{CompletionRequest, OutputSchema, TextGenerator};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

type CompleteHandler = Arc<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>;
type StructuredHandler = Arc<dyn Fn(&CompletionRequest) -> Result<Value> + Send + Sync>;

/// Which backend entry point a recorded call went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Complete,
    Structured,
}

pub struct MockTextGenerator {
    complete: CompleteHandler,
    structured: StructuredHandler,
    calls: Arc<Mutex<Vec<(CallKind, CompletionRequest)>>>,
}

impl MockTextGenerator {
    /// A generator that drafts nothing and structures an empty take list
    pub fn new() -> Self {
        Self {
            complete: Arc::new(|_| Ok("No relevant news was found for the team's players.".to_string())),
            structured: Arc::new(|_| Ok(json!({ "takes": [] }))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn on_complete<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        self.complete = Arc::new(handler);
        self
    }

    pub fn on_structured<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<Value> + Send + Sync + 'static,
    {
        self.structured = Arc::new(handler);
        self
    }

    /// Every call made so far, in arrival order
    pub async fn calls(&self) -> Vec<(CallKind, CompletionRequest)> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls
            .lock()
            .await
            .push((CallKind::Complete, request.clone()));
        (self.complete)(request)
    }

    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        _schema: &OutputSchema,
    ) -> Result<Value> {
        self.calls
            .lock()
            .await
            .push((CallKind::Structured, request.clone()));
        (self.structured)(request)
    }
}
