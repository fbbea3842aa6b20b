use chrono::{DateTime, Utc};
use thiserror::Error;

/// Upstream response bodies are cut to this many characters before they are
/// carried in an error.
pub const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub resource not found: {0}")]
    NotFound(String),

    #[error("GitHub token invalid or missing")]
    Unauthorized,

    #[error("GitHub rate limit exceeded{}", format_reset(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("GitHub API error {}: {}", format_status(.status), .body)]
    Upstream { status: Option<u16>, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn upstream(status: Option<u16>, body: &str) -> Self {
        Error::Upstream {
            status,
            body: truncate_body(body),
        }
    }

    /// HTTP status a front end should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::Unauthorized => 401,
            Error::RateLimited { .. } => 429,
            Error::Upstream { .. } => 502,
            Error::Config(_) => 500,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            tracing::warn!("GitHub request timed out: {}", err);
        }
        Error::upstream(err.status().map(|s| s.as_u16()), &err.to_string())
    }
}

pub fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

fn format_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(", resets at {}", at.to_rfc3339()),
        None => String::new(),
    }
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "(no response)".to_string(),
    }
}
