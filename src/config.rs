use std::env;
use std::str::FromStr;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub api_url: String,
    pub cache_ttl_seconds: u64,
    pub request_timeout_seconds: u64,
    pub max_repos: usize,
    pub concurrency_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            cache_ttl_seconds: 300,
            request_timeout_seconds: 15,
            max_repos: 100,
            concurrency_limit: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key/value source. Unset keys fall back
    /// to defaults; set but malformed values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let github_token = lookup("GITHUB_TOKEN")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        let api_url = lookup("GITHUB_API_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let cache_ttl_seconds =
            parse_var(&lookup, "CACHE_TTL_SECONDS")?.unwrap_or(defaults.cache_ttl_seconds);

        let request_timeout_seconds = parse_var(&lookup, "REQUEST_TIMEOUT_SECONDS")?
            .unwrap_or(defaults.request_timeout_seconds);

        let max_repos = parse_var(&lookup, "MAX_REPOS")?.unwrap_or(defaults.max_repos);

        let concurrency_limit =
            parse_var::<usize, _>(&lookup, "CONCURRENCY_LIMIT")?.filter(|limit| *limit > 0);

        let config = Self {
            github_token,
            api_url,
            cache_ttl_seconds,
            request_timeout_seconds,
            max_repos,
            concurrency_limit,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_repos == 0 {
            return Err(Error::Config("MAX_REPOS must be at least 1".to_string()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(Error::Config(
                "REQUEST_TIMEOUT_SECONDS must be at least 1".to_string(),
            ));
        }
        if let Some(limit) = self.concurrency_limit {
            if limit > Semaphore::MAX_PERMITS {
                return Err(Error::Config(format!(
                    "CONCURRENCY_LIMIT must be at most {}",
                    Semaphore::MAX_PERMITS
                )));
            }
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn has_token(&self) -> bool {
        !self.github_token.is_empty()
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", key, raw))),
        _ => Ok(None),
    }
}

/// Settings the GitHub gateway needs. Read-only once the client is built.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub github_token: Option<String>,
    pub api_url: String,
    pub request_timeout: Duration,
}

impl From<&Config> for GatewayConfig {
    fn from(config: &Config) -> Self {
        Self {
            github_token: config
                .has_token()
                .then(|| config.github_token.clone()),
            api_url: config.api_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_repos: usize,
    pub concurrency_limit: Option<usize>,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_repos: 100,
            concurrency_limit: None,
            show_progress: false,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_repos: config.max_repos,
            concurrency_limit: config.concurrency_limit,
            show_progress: false,
        }
    }
}
