use crate::matcher::MatchPredicate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TOKEN_ENV: &str = "CREDLY_AUTH_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeSourceConfig {
    Api {
        base_url: String,
        #[serde(default)]
        authorization_token: String,
    },
    File {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("credmatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub console: bool,
    pub json_path: Option<PathBuf>,
    pub sqlite_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            console: true,
            json_path: None,
            sqlite_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Remote feed to download. When absent the cache path is read as-is.
    #[serde(default)]
    pub course_feed_url: Option<String>,
    pub course_cache_path: PathBuf,
    pub badges: BadgeSourceConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub predicate: MatchPredicate,
    #[serde(default)]
    pub report: ReportConfig,
}

impl AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("http.timeout_seconds must be positive".into()));
        }
        if let BadgeSourceConfig::Api { authorization_token, .. } = &self.badges {
            if authorization_token.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "badge API token missing; set badges.authorization_token or {}",
                    TOKEN_ENV
                )));
            }
        }
        Ok(())
    }

    fn apply_token_override(&mut self, token: Option<String>) {
        if let (Some(token), BadgeSourceConfig::Api { authorization_token, .. }) =
            (token.filter(|t| !t.trim().is_empty()), &mut self.badges)
        {
            *authorization_token = token;
        }
    }
}

pub fn parse_config(content: &str, token_override: Option<String>) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = serde_json::from_str(content)?;
    config.apply_token_override(token_override);
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, std::env::var(TOKEN_ENV).ok())
}
