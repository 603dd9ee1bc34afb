//! Static configuration for a take-bot run
//!
//! Configuration is assembled once at process start from, in increasing
//! priority: built-in defaults, a TOML file, and environment variables. The
//! resulting [`TakeBotConfig`] is passed by reference into every component;
//! nothing reads the environment after loading.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub mod loader;

pub use loader::ConfigLoader;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_SUBREDDIT: &str = "fantasyfootball";
pub const DEFAULT_USER_AGENT: &str = "Fantasy Football Loader";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeBotConfig {
    pub league: LeagueConfig,
    pub forum: ForumConfig,
    pub llm: LlmConfig,
    pub notify: NotifyConfig,
    pub pipeline: PipelineConfig,
    /// Exact-match team name to notification target (e.g. a Slack handle)
    pub teams: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub league_id: Option<String>,
    pub season: u16,
    pub espn_s2: Option<String>,
    pub swid: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            league_id: None,
            season: 2024,
            espn_s2: None,
            swid: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Recency window for the forum's "top" listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: String,
    pub subreddit: String,
    pub time_filter: TimeFilter,
    pub post_limit: usize,
    pub comment_limit: usize,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            subreddit: DEFAULT_SUBREDDIT.to_string(),
            time_filter: TimeFilter::Day,
            post_limit: 10,
            comment_limit: 5,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on concurrently running take-generation branches
    pub max_parallel: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_parallel: 4 }
    }
}

impl TakeBotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("ESPN_LEAGUE_ID") {
            self.league.league_id = Some(id);
        }
        if let Some(s2) = lookup("ESPN_S2") {
            self.league.espn_s2 = Some(s2);
        }
        if let Some(swid) = lookup("ESPN_SWID") {
            self.league.swid = Some(swid);
        }
        if let Some(season) = lookup("ESPN_SEASON") {
            match season.parse::<u16>() {
                Ok(value) => self.league.season = value,
                Err(_) => tracing::warn!("Ignoring non-numeric ESPN_SEASON={}", season),
            }
        }

        if let Some(id) = lookup("REDDIT_CLIENT_ID") {
            self.forum.client_id = Some(id);
        }
        if let Some(secret) = lookup("REDDIT_CLIENT_SECRET") {
            self.forum.client_secret = Some(secret);
        }

        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.llm.api_key = Some(key);
        }

        if let Some(webhook) = lookup("TAKE_BOT_SLACK_URL") {
            self.notify.webhook_url = Some(webhook);
        }

        if let Some(max_parallel) = lookup("TAKE_BOT_MAX_PARALLEL") {
            match max_parallel.parse::<usize>() {
                Ok(value) => self.pipeline.max_parallel = value,
                Err(_) => tracing::warn!(
                    "Ignoring non-numeric TAKE_BOT_MAX_PARALLEL={}",
                    max_parallel
                ),
            }
        }
    }

    /// Check the whole configuration, reporting every problem at once.
    ///
    /// `require_webhook` is false for dry runs, which never post.
    pub fn validate(&self, require_webhook: bool) -> Result<()> {
        let mut problems = Vec::new();

        match self.league.league_id.as_deref() {
            None | Some("") => problems.push("league.league_id is required".to_string()),
            Some(id) if !id.chars().all(|c| c.is_ascii_digit()) => {
                problems.push(format!("league.league_id must be numeric, got '{id}'"))
            }
            Some(_) => {}
        }
        if self.league.espn_s2.is_some() != self.league.swid.is_some() {
            problems.push("league.espn_s2 and league.swid must be set together".to_string());
        }

        if is_blank(&self.forum.client_id) {
            problems.push("forum.client_id is required".to_string());
        }
        if is_blank(&self.forum.client_secret) {
            problems.push("forum.client_secret is required".to_string());
        }
        if self.forum.subreddit.trim().is_empty() {
            problems.push("forum.subreddit must not be empty".to_string());
        }
        if self.forum.post_limit == 0 {
            problems.push("forum.post_limit must be at least 1".to_string());
        }

        if is_blank(&self.llm.api_key) {
            problems.push("llm.api_key is required".to_string());
        }
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            problems.push(format!(
                "llm.temperature must be within 0.0..=1.0, got {}",
                self.llm.temperature
            ));
        }
        if let Err(e) = url::Url::parse(&self.llm.base_url) {
            problems.push(format!("llm.base_url is not a valid URL: {e}"));
        }

        match self.notify.webhook_url.as_deref() {
            None | Some("") if require_webhook => {
                problems.push("notify.webhook_url is required".to_string())
            }
            Some(raw) if !raw.is_empty() => {
                if let Err(e) = url::Url::parse(raw) {
                    problems.push(format!("notify.webhook_url is not a valid URL: {e}"));
                }
            }
            _ => {}
        }

        if self.pipeline.max_parallel == 0 {
            problems.push("pipeline.max_parallel must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(problems.join("; ")))
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete_config() -> TakeBotConfig {
        let mut config = TakeBotConfig::new();
        config.league.league_id = Some("123456".to_string());
        config.forum.client_id = Some("id".to_string());
        config.forum.client_secret = Some("secret".to_string());
        config.llm.api_key = Some("sk-test".to_string());
        config.notify.webhook_url = Some("https://hooks.slack.com/services/T/B/X".to_string());
        config
    }

    #[test]
    fn test_defaults_match_original_deployment() {
        let config = TakeBotConfig::default();
        assert_eq!(config.forum.subreddit, "fantasyfootball");
        assert_eq!(config.forum.time_filter, TimeFilter::Day);
        assert_eq!(config.forum.post_limit, 10);
        assert_eq!(config.forum.comment_limit, 5);
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.league.season, 2024);
        assert!(config.teams.is_empty());
    }

    #[test]
    fn test_merge_env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("ESPN_LEAGUE_ID", "42"),
            ("ESPN_S2", "s2-cookie"),
            ("ESPN_SWID", "{SWID}"),
            ("REDDIT_CLIENT_ID", "rid"),
            ("REDDIT_CLIENT_SECRET", "rsecret"),
            ("ANTHROPIC_API_KEY", "key"),
            ("TAKE_BOT_SLACK_URL", "https://example.com/hook"),
            ("TAKE_BOT_MAX_PARALLEL", "8"),
        ]
        .into_iter()
        .collect();

        let mut config = TakeBotConfig::new();
        config.league.league_id = Some("1".to_string());
        config.merge_env_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.league.league_id.as_deref(), Some("42"));
        assert_eq!(config.league.espn_s2.as_deref(), Some("s2-cookie"));
        assert_eq!(config.league.swid.as_deref(), Some("{SWID}"));
        assert_eq!(config.forum.client_id.as_deref(), Some("rid"));
        assert_eq!(config.llm.api_key.as_deref(), Some("key"));
        assert_eq!(
            config.notify.webhook_url.as_deref(),
            Some("https://example.com/hook")
        );
        assert_eq!(config.pipeline.max_parallel, 8);
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn test_merge_env_ignores_unparseable_numbers() {
        let mut config = TakeBotConfig::new();
        config.merge_env_with(|key| match key {
            "TAKE_BOT_MAX_PARALLEL" => Some("lots".to_string()),
            "ESPN_SEASON" => Some("next".to_string()),
            _ => None,
        });
        assert_eq!(config.pipeline.max_parallel, 4);
        assert_eq!(config.league.season, 2024);
    }

    #[test]
    fn test_validate_accumulates_all_problems() {
        let mut config = TakeBotConfig::new();
        config.pipeline.max_parallel = 0;

        let err = config.validate(true).unwrap_err().to_string();
        assert!(err.contains("league.league_id is required"));
        assert!(err.contains("forum.client_id is required"));
        assert!(err.contains("llm.api_key is required"));
        assert!(err.contains("notify.webhook_url is required"));
        assert!(err.contains("pipeline.max_parallel must be at least 1"));
    }

    #[test]
    fn test_validate_webhook_optional_for_dry_run() {
        let mut config = complete_config();
        config.notify.webhook_url = None;
        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = complete_config();
        config.league.league_id = Some("abc".to_string());
        config.league.espn_s2 = Some("only-half".to_string());
        config.notify.webhook_url = Some("not a url".to_string());

        let err = config.validate(true).unwrap_err().to_string();
        assert!(err.contains("must be numeric"));
        assert!(err.contains("must be set together"));
        assert!(err.contains("notify.webhook_url is not a valid URL"));
    }

    #[test]
    fn test_time_filter_serializes_lowercase() {
        assert_eq!(TimeFilter::Week.to_string(), "week");
        let parsed: ForumConfig = toml::from_str("time_filter = \"month\"").unwrap();
        assert_eq!(parsed.time_filter, TimeFilter::Month);
    }
}
