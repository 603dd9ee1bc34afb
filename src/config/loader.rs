use super::TakeBotConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "take-bot.toml";

pub struct ConfigLoader {
    path: Option<PathBuf>,
    require_webhook: bool,
}

impl ConfigLoader {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            require_webhook: true,
        }
    }

    /// Skip the webhook requirement (dry runs render but never post)
    pub fn without_webhook(mut self) -> Self {
        self.require_webhook = false;
        self
    }

    /// Load file + environment and validate the result.
    pub async fn load(&self) -> Result<TakeBotConfig> {
        let mut config = self.load_file().await?;
        config.merge_env_vars();
        config.validate(self.require_webhook)?;
        Ok(config)
    }

    async fn load_file(&self) -> Result<TakeBotConfig> {
        match &self.path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::read(path).await
            }
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::read(fallback).await
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(TakeBotConfig::new())
                }
            }
        }
    }

    async fn read(path: &Path) -> Result<TakeBotConfig> {
        let content = fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        info!(
            "Loaded configuration from {} ({} team mappings)",
            path.display(),
            config.teams.len()
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<TakeBotConfig> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeFilter;
    use std::time::Duration;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[league]
league_id = "987654"
season = 2025
timeout = "10s"

[forum]
subreddit = "nfl"
time_filter = "week"
post_limit = 3
comment_limit = 2

[llm]
model = "claude-3-5-haiku-latest"
max_tokens = 2048

[pipeline]
max_parallel = 2

[teams]
"Lance's Hit Squad" = "@lance"
"Rookie Season" = "@Maddy"
"#;

    #[test]
    fn test_parse_full_file() {
        let config = ConfigLoader::parse(SAMPLE).unwrap();
        assert_eq!(config.league.league_id.as_deref(), Some("987654"));
        assert_eq!(config.league.season, 2025);
        assert_eq!(config.league.timeout, Duration::from_secs(10));
        assert_eq!(config.forum.subreddit, "nfl");
        assert_eq!(config.forum.time_filter, TimeFilter::Week);
        assert_eq!(config.forum.post_limit, 3);
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.pipeline.max_parallel, 2);
        assert_eq!(
            config.teams.get("Lance's Hit Squad").map(String::as_str),
            Some("@lance")
        );
        // untouched sections keep defaults
        assert_eq!(config.forum.user_agent, crate::config::DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_parse_empty_file_yields_defaults() {
        let config = ConfigLoader::parse("").unwrap();
        assert_eq!(config.pipeline.max_parallel, 4);
        assert!(config.teams.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let err = ConfigLoader::parse("[league\nleague_id = 1").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(Some(temp_dir.path().join("absent.toml")));
        let err = loader.load().await.unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_example_file_parses() {
        let config =
            ConfigLoader::parse(include_str!("../../take-bot.example.toml")).unwrap();
        assert_eq!(config.teams.len(), 10);
        assert_eq!(
            config.teams.get("Mookillem").map(String::as_str),
            Some("@Mukil Loganathan")
        );
        assert_eq!(config.llm.timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_read_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("take-bot.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ConfigLoader::read(&path).await.unwrap();
        assert_eq!(config.teams.len(), 2);
    }
}
