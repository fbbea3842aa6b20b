use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};

use crate::error::{Error, Result};

/// Remaining quota below which a warning is logged.
const LOW_QUOTA_WARNING: u32 = 10;

/// Rate-limit headers from a single GitHub response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let remaining = header_value(headers, "x-ratelimit-remaining");
        let reset_at = header_value::<i64>(headers, "x-ratelimit-reset")
            .and_then(|epoch| Utc.timestamp_opt(epoch, 0).single());
        Self { remaining, reset_at }
    }

    pub fn log(&self, url: &str) {
        match self.remaining {
            Some(remaining) if remaining < LOW_QUOTA_WARNING => {
                tracing::warn!(
                    "GitHub rate limit nearly exhausted: {} requests left (resets {:?})",
                    remaining,
                    self.reset_at
                );
            }
            Some(remaining) => tracing::debug!("{} -> {} requests left", url, remaining),
            None => {}
        }
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Maps a non-success response onto the error taxonomy. `resource` names what
/// was requested, for `NotFound` messages.
pub fn classify_failure(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    resource: &str,
) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            reset_at: RateLimitInfo::from_headers(headers).reset_at,
        },
        StatusCode::NOT_FOUND => Error::NotFound(resource.to_string()),
        other => Error::upstream(Some(other.as_u16()), body),
    }
}

/// Passes successful responses through and turns everything else into an
/// error, consuming the body for the message.
pub async fn check_response(response: Response, resource: &str) -> Result<Response> {
    let rate_limit = RateLimitInfo::from_headers(response.headers());
    rate_limit.log(response.url().as_str());

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("GitHub returned {} for {}", status, resource);
    Err(classify_failure(status, &headers, &body, resource))
}
