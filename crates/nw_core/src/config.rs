use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    NewsApi,
    GNews,
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "newsapi" => Ok(ProviderKind::NewsApi),
            "gnews" => Ok(ProviderKind::GNews),
            other => Err(Error::Configuration(format!(
                "unknown news provider '{}' (expected newsapi or gnews)",
                other
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::NewsApi => write!(f, "newsapi"),
            ProviderKind::GNews => write!(f, "gnews"),
        }
    }
}

#[derive(Clone)]
pub struct NewsConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    /// Overrides the provider's default search endpoint.
    pub endpoint: Option<Url>,
    pub language: Option<String>,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub channel_id: String,
    pub api_base: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

/// Process-wide settings, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub news: NewsConfig,
    pub telegram: TelegramConfig,
    pub server: ServerConfig,
}

impl fmt::Debug for NewsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_ref().map(Url::as_str))
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| Error::Configuration(format!("{} is not set", key)))
        };

        let news = NewsConfig {
            provider: get("NEWS_PROVIDER")
                .map(|s| s.parse::<ProviderKind>())
                .transpose()?
                .unwrap_or_default(),
            api_key: require("NEWS_API_KEY")?,
            endpoint: get("NEWS_API_ENDPOINT")
                .map(|s| parse_url("NEWS_API_ENDPOINT", &s))
                .transpose()?,
            language: get("NEWS_LANGUAGE"),
            timeout: parse_timeout("SEARCH_TIMEOUT_SECS", get("SEARCH_TIMEOUT_SECS"))?,
        };

        let telegram = TelegramConfig {
            bot_token: require("TELEGRAM_BOT_TOKEN")?,
            channel_id: require("TELEGRAM_CHANNEL_ID")?,
            api_base: parse_url(
                "TELEGRAM_API_BASE",
                &get("TELEGRAM_API_BASE").unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string()),
            )?,
            timeout: parse_timeout("PUBLISH_TIMEOUT_SECS", get("PUBLISH_TIMEOUT_SECS"))?,
        };

        let server = ServerConfig {
            allowed_origins: get("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };

        Ok(Self {
            news,
            telegram,
            server,
        })
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.chars().take(4).collect::<String>();
            format!("{}...({} chars)", n, val.chars().count())
        }

        tracing::info!("⚙️ Config loaded:");
        tracing::info!("  NEWS_PROVIDER: {}", self.news.provider);
        tracing::info!("  NEWS_API_KEY: {}", preview(&self.news.api_key));
        tracing::info!("  TELEGRAM_BOT_TOKEN: {}", preview(&self.telegram.bot_token));
        tracing::info!("  TELEGRAM_CHANNEL_ID: {}", self.telegram.channel_id);
        tracing::info!(
            "  ALLOWED_ORIGINS: {}",
            if self.server.allowed_origins.is_empty() {
                "<any>".to_string()
            } else {
                self.server.allowed_origins.join(", ")
            }
        );
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::Configuration(format!("{} is not a valid URL: {}", key, e)))
}

fn parse_timeout(key: &str, value: Option<String>) -> Result<Duration> {
    let Some(value) = value else {
        return Ok(DEFAULT_TIMEOUT);
    };
    match value.parse::<u64>() {
        Ok(0) => Err(Error::Configuration(format!("{} must be greater than zero", key))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(Error::Configuration(format!("{} is not a number: {}", key, e))),
    }
}
