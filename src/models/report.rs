use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{GitHubUser, LanguageBreakdown};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComplexityTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplexityTier::Beginner => write!(f, "Beginner"),
            ComplexityTier::Intermediate => write!(f, "Intermediate"),
            ComplexityTier::Advanced => write!(f, "Advanced"),
        }
    }
}

/// One language's share of a byte total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguageShare {
    pub name: String,
    pub bytes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryReport {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub homepage: Option<String>,
    pub topics: Vec<String>,
    pub stars: u32,
    pub forks: u32,
    pub open_issues: u32,
    pub is_fork: bool,
    pub license: Option<String>,
    pub created_at: Option<String>,
    pub last_pushed: Option<String>,
    pub days_since_update: i64,
    pub primary_languages: Vec<LanguageShare>,
    pub all_languages: LanguageBreakdown,
    pub estimated_loc: u64,
    pub complexity_level: ComplexityTier,
    pub code_quality_score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileInfo {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub github_url: Option<String>,
}

impl From<GitHubUser> for ProfileInfo {
    fn from(user: GitHubUser) -> Self {
        Self {
            name: user.name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            public_repos: user.public_repos,
            followers: user.followers,
            following: user.following,
            location: user.location,
            blog: user.blog.filter(|b| !b.is_empty()),
            github_url: user.html_url,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplexityDistribution {
    #[serde(rename = "Beginner")]
    pub beginner: usize,
    #[serde(rename = "Intermediate")]
    pub intermediate: usize,
    #[serde(rename = "Advanced")]
    pub advanced: usize,
}

impl ComplexityDistribution {
    pub fn record(&mut self, tier: ComplexityTier) {
        match tier {
            ComplexityTier::Beginner => self.beginner += 1,
            ComplexityTier::Intermediate => self.intermediate += 1,
            ComplexityTier::Advanced => self.advanced += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.beginner + self.intermediate + self.advanced
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub total_repos_analyzed: usize,
    pub original_repos: usize,
    pub forked_repos: usize,
    pub total_estimated_loc: u64,
    pub total_stars: u64,
    pub total_forks: u64,
    pub average_quality_score: f64,
    pub complexity_distribution: ComplexityDistribution,
    pub top_languages: Vec<LanguageShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserReport {
    pub username: String,
    pub profile: ProfileInfo,
    pub summary: ReportSummary,
    pub repositories: Vec<RepositoryReport>,
    pub analyzed_at: DateTime<Utc>,
}

/// Wire shape handed to callers: the report plus whether it came from cache.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse<'a> {
    #[serde(flatten)]
    pub report: &'a UserReport,
    pub cached: bool,
}
