use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_SNAPSHOT_URL: &str =
    "https://raw.githubusercontent.com/yashsinghall/news_scrapper_safe/main/news_articles.db";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_snapshot_url")]
    pub snapshot_url: String,

    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    #[serde(default = "default_cache_duration")]
    pub cache_duration_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_snapshot_url() -> String {
    DEFAULT_SNAPSHOT_URL.to_string()
}

fn default_cache_path() -> PathBuf {
    std::env::temp_dir().join("news_articles_cached.db")
}

fn default_cache_duration() -> u64 {
    3600
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_url: default_snapshot_url(),
            cache_path: default_cache_path(),
            cache_duration_secs: default_cache_duration(),
            fetch_timeout_secs: default_fetch_timeout(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl Config {
    /// Load from an explicit file, the user config file if it exists, or defaults,
    /// then apply `NEWS_API_*` environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let config_path = Self::config_path();
                if config_path.exists() {
                    Self::from_file(&config_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("NEWS_API_SNAPSHOT_URL") {
            self.snapshot_url = url;
        }
        if let Some(path) = lookup("NEWS_API_CACHE_PATH") {
            self.cache_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("NEWS_API_CACHE_DURATION_SECS") {
            self.cache_duration_secs = parse_secs("NEWS_API_CACHE_DURATION_SECS", &secs)?;
        }
        if let Some(secs) = lookup("NEWS_API_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = parse_secs("NEWS_API_FETCH_TIMEOUT_SECS", &secs)?;
        }
        if let Some(bind) = lookup("NEWS_API_BIND") {
            self.bind_addr = bind;
        }
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got {port:?}")))?;
            let mut addr = self.socket_addr()?;
            addr.set_port(port);
            self.bind_addr = addr.to_string();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.snapshot_url)
            .map_err(|e| AppError::Config(format!("invalid snapshot_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "snapshot_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(AppError::Config("fetch_timeout_secs must be positive".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|e| AppError::Config(format!("invalid bind_addr {:?}: {}", self.bind_addr, e)))
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("news-snapshot-api")
            .join("config.toml")
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key} must be a whole number of seconds, got {raw:?}")))
}
