//! Notification channel for rendered takes

pub mod blocks;
pub mod slack;

pub use blocks::{render_take, Block, SlackMessage, TextObject, HEADER_TEXT};
pub use slack::SlackWebhook;

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message; each call is independent of the others
    async fn deliver(&self, message: &SlackMessage) -> Result<()>;
}

/// Logs payloads instead of posting them (`--dry-run`)
#[derive(Debug, Default)]
pub struct LoggingSink;

#[async_trait]
impl NotificationSink for LoggingSink {
    async fn deliver(&self, message: &SlackMessage) -> Result<()> {
        let payload = serde_json::to_string_pretty(message)?;
        info!("Dry run, not posting:\n{}", payload);
        Ok(())
    }
}

/// Records delivered messages; can be told to fail specific attempts
#[derive(Clone, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<SlackMessage>>>,
    attempts: Arc<Mutex<usize>>,
    fail_attempts: HashSet<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given zero-based delivery attempts
    pub fn failing_on(attempts: &[usize]) -> Self {
        Self {
            fail_attempts: attempts.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub async fn delivered(&self) -> Vec<SlackMessage> {
        self.delivered.lock().await.clone()
    }

    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, message: &SlackMessage) -> Result<()> {
        let attempt = {
            let mut attempts = self.attempts.lock().await;
            let current = *attempts;
            *attempts += 1;
            current
        };

        if self.fail_attempts.contains(&attempt) {
            return Err(Error::HttpStatus(format!(
                "simulated failure on delivery {}",
                attempt
            )));
        }
        self.delivered.lock().await.push(message.clone());
        Ok(())
    }
}
