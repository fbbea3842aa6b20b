//! In-memory gateway for pipeline and service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::github::SourceGateway;
use crate::models::{GitHubUser, LanguageBreakdown, Repository, RepositoryOwner};

pub(crate) fn repository(name: &str, fork: bool) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: format!("octocat/{name}"),
        description: None,
        html_url: format!("https://github.com/octocat/{name}"),
        homepage: None,
        topics: Vec::new(),
        stargazers_count: 0,
        forks_count: 0,
        open_issues_count: 0,
        fork,
        has_wiki: false,
        has_pages: false,
        license: None,
        created_at: Some("2020-01-01T00:00:00Z".to_string()),
        updated_at: Some(Utc::now().to_rfc3339()),
        pushed_at: Some(Utc::now().to_rfc3339()),
        owner: RepositoryOwner {
            login: "octocat".to_string(),
        },
    }
}

pub(crate) fn languages(pairs: &[(&str, u64)]) -> LanguageBreakdown {
    pairs.iter().map(|(l, b)| (l.to_string(), *b)).collect()
}

pub(crate) struct FakeGateway {
    login: String,
    repos: Vec<(Repository, LanguageBreakdown)>,
    delays: HashMap<String, Duration>,
    language_errors: HashMap<String, fn() -> Error>,
    language_calls: Arc<Mutex<Vec<String>>>,
    language_owners: Arc<Mutex<Vec<String>>>,
    user_calls: Arc<AtomicUsize>,
}

impl FakeGateway {
    pub(crate) fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            repos: Vec::new(),
            delays: HashMap::new(),
            language_errors: HashMap::new(),
            language_calls: Arc::new(Mutex::new(Vec::new())),
            language_owners: Arc::new(Mutex::new(Vec::new())),
            user_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_repo(mut self, repo: Repository, languages: LanguageBreakdown) -> Self {
        self.repos.push((repo, languages));
        self
    }

    pub(crate) fn with_delay(mut self, repo: &str, delay: Duration) -> Self {
        self.delays.insert(repo.to_string(), delay);
        self
    }

    pub(crate) fn with_language_error(mut self, repo: &str, error: fn() -> Error) -> Self {
        self.language_errors.insert(repo.to_string(), error);
        self
    }

    /// Repository names in the order their languages were requested.
    pub(crate) fn language_calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.language_calls.clone()
    }

    /// `owner/repo` pairs in request order.
    pub(crate) fn language_owners(&self) -> Arc<Mutex<Vec<String>>> {
        self.language_owners.clone()
    }

    /// Number of profile fetches, one per analysis run.
    pub(crate) fn user_calls(&self) -> Arc<AtomicUsize> {
        self.user_calls.clone()
    }

    fn check_user(&self, username: &str) -> Result<()> {
        if username.eq_ignore_ascii_case(&self.login) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("user {username}")))
        }
    }
}

#[async_trait]
impl SourceGateway for FakeGateway {
    async fn fetch_user(&self, username: &str) -> Result<GitHubUser> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.check_user(username)?;
        Ok(GitHubUser {
            login: self.login.clone(),
            name: Some("The Octocat".to_string()),
            avatar_url: None,
            html_url: Some(format!("https://github.com/{}", self.login)),
            bio: None,
            blog: Some(String::new()),
            location: None,
            public_repos: self.repos.len() as u32,
            followers: 0,
            following: 0,
        })
    }

    async fn fetch_repositories(&self, username: &str, max_count: usize) -> Result<Vec<Repository>> {
        self.check_user(username)?;
        Ok(self
            .repos
            .iter()
            .take(max_count)
            .map(|(repo, _)| repo.clone())
            .collect())
    }

    async fn fetch_languages(&self, owner: &str, repo: &str) -> Result<LanguageBreakdown> {
        self.language_calls
            .lock()
            .unwrap()
            .push(repo.to_string());
        self.language_owners
            .lock()
            .unwrap()
            .push(format!("{owner}/{repo}"));

        if let Some(delay) = self.delays.get(repo) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.language_errors.get(repo) {
            return Err(error());
        }

        Ok(self
            .repos
            .iter()
            .find(|(r, _)| r.name == repo)
            .map(|(_, langs)| langs.clone())
            .unwrap_or_default())
    }
}
