use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GitHubUser, LanguageBreakdown, Repository};

/// Read access to a repository host. Implementations surface only
/// `NotFound`, `Unauthorized`, `RateLimited` and `Upstream` errors.
#[async_trait]
pub trait SourceGateway: Send + Sync {
    async fn fetch_user(&self, username: &str) -> Result<GitHubUser>;

    /// Most recently updated first, at most `max_count` entries.
    async fn fetch_repositories(&self, username: &str, max_count: usize) -> Result<Vec<Repository>>;

    /// A repository without detectable languages yields an empty breakdown.
    async fn fetch_languages(&self, owner: &str, repo: &str) -> Result<LanguageBreakdown>;
}
