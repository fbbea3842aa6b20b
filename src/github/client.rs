use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::github::gateway::SourceGateway;
use crate::github::paginator::Paginator;
use crate::github::status::check_response;
use crate::models::{GitHubUser, LanguageBreakdown, Repository};

pub struct GitHubClient {
    client: Client,
    base_url: Url,
}

impl GitHubClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = config.github_token.as_deref() {
            let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Config(format!("invalid GITHUB_TOKEN: {}", e)))?;
            auth.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth);
        } else {
            tracing::info!("No GitHub token configured, using anonymous rate limits");
        }
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("repoanalyzer/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("invalid GITHUB_API_URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "invalid GITHUB_API_URL: {} cannot hold a path",
                config.api_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Appends `segments` to the API root, percent-encoding each one so a
    /// name containing `/`, `?` or `#` stays a single path segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl SourceGateway for GitHubClient {
    async fn fetch_user(&self, username: &str) -> Result<GitHubUser> {
        let url = self.endpoint(&["users", username]);
        tracing::info!("Fetching user: {}", username);

        let response = self.client.get(url).send().await?;
        let response = check_response(response, &format!("user {}", username)).await?;

        Ok(response.json().await?)
    }

    async fn fetch_repositories(&self, username: &str, max_count: usize) -> Result<Vec<Repository>> {
        let mut url = self.endpoint(&["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("type", "owner")
            .append_pair("sort", "updated");
        tracing::info!("Fetching up to {} repositories for: {}", max_count, username);

        Paginator::new(&self.client)
            .fetch_limited(url, &format!("repositories of {}", username), max_count)
            .await
    }

    async fn fetch_languages(&self, owner: &str, repo: &str) -> Result<LanguageBreakdown> {
        let url = self.endpoint(&["repos", owner, repo, "languages"]);
        tracing::debug!("Fetching languages for: {}/{}", owner, repo);

        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => {
                tracing::warn!("No language data for {}/{}, treating as empty", owner, repo);
                return Ok(LanguageBreakdown::new());
            }
            _ => {}
        }

        let response = check_response(response, &format!("repository {}/{}", owner, repo)).await?;
        Ok(response.json().await?)
    }
}
