use chrono::{DateTime, Utc};

use crate::models::{ComplexityTier, LanguageBreakdown, LanguageShare, Repository, RepositoryReport};
use crate::taxonomy::languages::{bytes_per_line, complexity_weight, DEFAULT_COMPLEXITY_WEIGHT};

/// Days reported for a repository whose timestamps are missing or unparseable.
pub const STALE_DAYS: i64 = 9999;

/// How many languages are listed per repository.
pub const PRIMARY_LANGUAGE_COUNT: usize = 3;

/// Scores repositories against a fixed point in time, so every repository in
/// one analysis run sees the same "now".
#[derive(Debug, Clone, Copy)]
pub struct RepositoryScorer {
    now: DateTime<Utc>,
}

impl RepositoryScorer {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn score(&self, repo: &Repository, languages: LanguageBreakdown) -> RepositoryReport {
        let loc = estimate_loc(&languages);
        let days_since_update = days_since_update(repo, self.now);
        let avg_weight = average_complexity_weight(&languages);

        let complexity_level = complexity_tier(loc, avg_weight);
        let code_quality_score = quality_score(repo, loc, languages.len(), days_since_update);

        tracing::debug!(
            "Scored {}: loc={} weight={:.2} tier={} quality={}",
            repo.full_name,
            loc,
            avg_weight,
            complexity_level,
            code_quality_score
        );

        RepositoryReport {
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            description: repo.description.clone(),
            url: repo.html_url.clone(),
            homepage: repo.homepage.clone().filter(|h| !h.is_empty()),
            topics: repo.topics.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
            is_fork: repo.fork,
            license: repo.license.as_ref().and_then(|l| l.spdx_id.clone()),
            created_at: repo.created_at.clone(),
            last_pushed: repo.pushed_at.clone(),
            days_since_update,
            primary_languages: rank_languages(
                languages.iter().map(|(name, bytes)| (name.as_str(), *bytes)),
                PRIMARY_LANGUAGE_COUNT,
            ),
            all_languages: languages,
            estimated_loc: loc,
            complexity_level,
            code_quality_score,
        }
    }
}

/// Sum over languages of `bytes / bytes_per_line`, each term floored.
pub fn estimate_loc(languages: &LanguageBreakdown) -> u64 {
    languages
        .iter()
        .map(|(language, bytes)| bytes / bytes_per_line(language))
        .sum()
}

/// Mean complexity weight of the languages present; the default weight when
/// there are none.
pub fn average_complexity_weight(languages: &LanguageBreakdown) -> f64 {
    if languages.is_empty() {
        return DEFAULT_COMPLEXITY_WEIGHT as f64;
    }
    let total: u32 = languages.keys().map(|l| complexity_weight(l)).sum();
    total as f64 / languages.len() as f64
}

pub fn complexity_tier(loc: u64, avg_weight: f64) -> ComplexityTier {
    if loc < 300 && avg_weight < 4.0 {
        ComplexityTier::Beginner
    } else if loc < 2_000 && avg_weight < 6.0 {
        ComplexityTier::Intermediate
    } else {
        ComplexityTier::Advanced
    }
}

pub fn quality_score(
    repo: &Repository,
    loc: u64,
    language_count: usize,
    days_since_update: i64,
) -> u8 {
    let mut score: u64 = 0;

    if repo.has_description() {
        score += 10;
    }

    score += (repo.topics.len() as u64 * 2).min(10);

    if repo.license.is_some() {
        score += 10;
    }

    if repo.has_wiki || repo.has_pages {
        score += 5;
    }

    let popularity = repo.stargazers_count as u64 + repo.forks_count as u64 * 2;
    score += (popularity * 2).min(15);

    score += match loc {
        500..=20_000 => 20,
        100..=499 | 20_001..=50_000 => 10,
        0 => 0,
        _ => 5,
    };

    score += (language_count as u64 * 3).min(10);

    score += match days_since_update {
        d if d <= 30 => 20,
        d if d <= 90 => 14,
        d if d <= 365 => 7,
        _ => 0,
    };

    score.min(100) as u8
}

/// Whole days between the most recent of push/update time and `now`.
pub fn days_since_update(repo: &Repository, now: DateTime<Utc>) -> i64 {
    [repo.pushed_at.as_deref(), repo.updated_at.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(parse_timestamp)
        .max()
        .map(|latest| (now - latest).num_days().max(0))
        .unwrap_or(STALE_DAYS)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Top `top_n` languages by bytes, each with its share of the bytes of *all*
/// languages given. Ties rank alphabetically.
pub fn rank_languages<'a, I>(languages: I, top_n: usize) -> Vec<LanguageShare>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut ranked: Vec<(&str, u64)> = languages.into_iter().collect();
    let total: u64 = ranked.iter().map(|(_, bytes)| bytes).sum();
    let denominator = total.max(1) as f64;

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(name, bytes)| LanguageShare {
            name: name.to_string(),
            bytes,
            percentage: round_one_decimal(bytes as f64 / denominator * 100.0),
        })
        .collect()
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
