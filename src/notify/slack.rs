//! Slack incoming-webhook delivery

use super::blocks::SlackMessage;
use super::NotificationSink;
use crate::config::NotifyConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct SlackWebhook {
    client: Client,
    url: url::Url,
}

impl SlackWebhook {
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let raw = config
            .webhook_url
            .as_deref()
            .ok_or_else(|| Error::Config("notify.webhook_url is required".to_string()))?;
        let url = url::Url::parse(raw)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationSink for SlackWebhook {
    async fn deliver(&self, message: &SlackMessage) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(Error::HttpStatus(format!(
                "Webhook returned {}: {}",
                status, error_text
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_webhook_url() {
        let err = SlackWebhook::new(&NotifyConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_invalid_url() {
        let config = NotifyConfig {
            webhook_url: Some("hooks.slack.com/no-scheme".to_string()),
            ..Default::default()
        };
        let err = SlackWebhook::new(&config).err().unwrap();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_accepts_https_url() {
        let config = NotifyConfig {
            webhook_url: Some("https://hooks.slack.com/services/T0/B0/xyz".to_string()),
            ..Default::default()
        };
        let webhook = SlackWebhook::new(&config).unwrap();
        assert_eq!(webhook.url.host_str(), Some("hooks.slack.com"));
    }
}
