use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;

use crate::analysis::aggregator::ReportAggregator;
use crate::analysis::scorer::RepositoryScorer;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::github::SourceGateway;
use crate::models::{LanguageBreakdown, ProfileInfo, Repository, RepositoryReport, UserReport};

pub struct AnalysisPipeline {
    github: Arc<dyn SourceGateway>,
    aggregator: ReportAggregator,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(github: impl SourceGateway + 'static, config: PipelineConfig) -> Self {
        Self::with_gateway(Arc::new(github), config)
    }

    pub fn with_gateway(github: Arc<dyn SourceGateway>, config: PipelineConfig) -> Self {
        Self {
            github,
            aggregator: ReportAggregator::new(),
            config,
        }
    }

    /// Runs a full analysis. Any gateway failure aborts the run; no partial
    /// report is ever returned.
    pub async fn analyze_user(&self, username: &str) -> Result<UserReport> {
        // Step 1: Profile and repository listing in parallel
        tracing::info!("Analyzing GitHub user: {}", username);
        let (user, repos) = tokio::try_join!(
            self.github.fetch_user(username),
            self.github.fetch_repositories(username, self.config.max_repos),
        )?;

        // Step 2: Originals first, forks after
        let (originals, forks): (Vec<_>, Vec<_>) = repos.into_iter().partition(|r| !r.fork);
        let original_count = originals.len();
        let forked_count = forks.len();
        let ordered: Vec<Repository> = originals.into_iter().chain(forks).collect();
        tracing::info!(
            "Found {} repositories ({} original, {} forked)",
            ordered.len(),
            original_count,
            forked_count
        );

        // Step 3: One language request per repository
        let breakdowns = self.fetch_all_languages(username, &ordered).await?;

        // Step 4: Score each repository against a single timestamp
        let scorer = RepositoryScorer::new(Utc::now());
        let mut reports: Vec<RepositoryReport> = ordered
            .iter()
            .zip(breakdowns)
            .map(|(repo, languages)| scorer.score(repo, languages))
            .collect();

        // Step 5: Aggregate
        let summary = self
            .aggregator
            .summarize(&reports, original_count, forked_count);

        // Step 6: Highest quality first
        reports.sort_by(|a, b| b.code_quality_score.cmp(&a.code_quality_score));

        tracing::info!(
            "Finished {}: {} repositories, average quality {:.1}",
            username,
            summary.total_repos_analyzed,
            summary.average_quality_score
        );

        Ok(UserReport {
            username: username.to_string(),
            profile: ProfileInfo::from(user),
            summary,
            repositories: reports,
            analyzed_at: scorer.now(),
        })
    }

    /// Output order matches `repos`, whatever order the responses arrive in.
    async fn fetch_all_languages(
        &self,
        username: &str,
        repos: &[Repository],
    ) -> Result<Vec<LanguageBreakdown>> {
        // Zero permits would never let a request through.
        let semaphore = self
            .config
            .concurrency_limit
            .filter(|limit| *limit > 0)
            .map(|limit| Arc::new(Semaphore::new(limit.min(Semaphore::MAX_PERMITS))));

        let pb = self.progress_bar(repos.len() as u64);

        let language_futures = repos.iter().map(|repo| {
            let github = self.github.clone();
            let sem = semaphore.clone();
            let pb = pb.clone();

            async move {
                let _permit = match sem.as_ref() {
                    Some(sem) => sem.acquire().await.ok(),
                    None => None,
                };

                let owner = if repo.owner.login.is_empty() {
                    username
                } else {
                    repo.owner.login.as_str()
                };
                let languages = github.fetch_languages(owner, &repo.name).await?;
                pb.inc(1);
                Ok::<_, Error>(languages)
            }
        });

        let results = try_join_all(language_futures).await;
        match &results {
            Ok(_) => pb.finish_with_message("Fetched all languages"),
            Err(e) => pb.abandon_with_message(format!("Failed: {}", e)),
        }
        results
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} repos")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComplexityTier;
    use crate::test_support::{languages, repository, FakeGateway};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn pipeline(gateway: FakeGateway) -> AnalysisPipeline {
        AnalysisPipeline::new(gateway, PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_counts_originals_and_forks() {
        let gateway = FakeGateway::new("octocat")
            .with_repo(repository("forked", true), languages(&[("C", 90_000)]))
            .with_repo(repository("mine", false), languages(&[("Python", 3_500)]));
        let calls = gateway.language_calls();

        let report = pipeline(gateway).analyze_user("octocat").await.unwrap();

        assert_eq!(report.summary.original_repos, 1);
        assert_eq!(report.summary.forked_repos, 1);
        assert_eq!(report.summary.total_repos_analyzed, 2);
        // Languages are requested for originals before forks.
        assert_eq!(*calls.lock().unwrap(), vec!["mine".to_string(), "forked".to_string()]);
    }

    #[tokio::test]
    async fn test_repositories_sorted_by_quality_descending() {
        let mut polished = repository("polished", false);
        polished.description = Some("Documented".into());
        polished.topics = vec!["cli".into(), "rust".into()];

        let gateway = FakeGateway::new("octocat")
            .with_repo(repository("bare", false), LanguageBreakdown::new())
            .with_repo(polished, languages(&[("Rust", 84_000)]));

        let report = pipeline(gateway).analyze_user("octocat").await.unwrap();
        let names: Vec<_> = report.repositories.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["polished", "bare"]);
        assert!(report.repositories[0].code_quality_score >= report.repositories[1].code_quality_score);
    }

    #[tokio::test]
    async fn test_breakdowns_zip_positionally_despite_arrival_order() {
        // The first repository answers last.
        let gateway = FakeGateway::new("octocat")
            .with_repo(repository("slow", false), languages(&[("Rust", 42_000)]))
            .with_repo(repository("fast", false), languages(&[("HTML", 600)]))
            .with_delay("slow", Duration::from_millis(50));

        let report = pipeline(gateway).analyze_user("octocat").await.unwrap();
        let slow = report.repositories.iter().find(|r| r.name == "slow").unwrap();
        let fast = report.repositories.iter().find(|r| r.name == "fast").unwrap();

        assert_eq!(slow.estimated_loc, 1_000);
        assert_eq!(slow.complexity_level, ComplexityTier::Advanced);
        assert_eq!(fast.estimated_loc, 10);
        assert_eq!(fast.complexity_level, ComplexityTier::Beginner);
    }

    #[tokio::test]
    async fn test_user_not_found_surfaces_without_report() {
        let gateway = FakeGateway::new("octocat");
        let result = pipeline(gateway).analyze_user("ghost").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_any_language_failure_aborts_analysis() {
        let gateway = FakeGateway::new("octocat")
            .with_repo(repository("ok", false), languages(&[("Go", 3_800)]))
            .with_repo(repository("broken", false), LanguageBreakdown::new())
            .with_language_error("broken", || Error::RateLimited { reset_at: None });

        let result = pipeline(gateway).analyze_user("octocat").await;
        assert!(matches!(result, Err(Error::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_summary_aggregates_languages_across_repositories() {
        let gateway = FakeGateway::new("octocat")
            .with_repo(repository("a", false), languages(&[("Rust", 3_000), ("Shell", 1_000)]))
            .with_repo(repository("b", false), languages(&[("Rust", 1_000)]));

        let report = pipeline(gateway).analyze_user("octocat").await.unwrap();
        let top: Vec<_> = report
            .summary
            .top_languages
            .iter()
            .map(|l| (l.name.as_str(), l.percentage))
            .collect();
        assert_eq!(top, vec![("Rust", 80.0), ("Shell", 20.0)]);
        assert_eq!(report.summary.complexity_distribution.total(), 2);
    }

    #[tokio::test]
    async fn test_respects_max_repos_and_concurrency_limit() {
        let mut gateway = FakeGateway::new("octocat");
        for i in 0..5 {
            gateway = gateway.with_repo(repository(&format!("r{i}"), false), languages(&[("C", 450)]));
        }

        let config = PipelineConfig {
            max_repos: 3,
            concurrency_limit: Some(1),
            show_progress: false,
        };
        let report = AnalysisPipeline::new(gateway, config)
            .analyze_user("octocat")
            .await
            .unwrap();
        assert_eq!(report.repositories.len(), 3);
        assert_eq!(report.summary.total_estimated_loc, 30);
    }

    #[tokio::test]
    async fn test_oversized_and_zero_concurrency_limits_still_complete() {
        for limit in [usize::MAX, 0] {
            let gateway = FakeGateway::new("octocat")
                .with_repo(repository("a", false), languages(&[("C", 450)]))
                .with_repo(repository("b", false), languages(&[("C", 900)]));
            let config = PipelineConfig {
                concurrency_limit: Some(limit),
                ..PipelineConfig::default()
            };

            let report = tokio::time::timeout(
                Duration::from_secs(5),
                AnalysisPipeline::new(gateway, config).analyze_user("octocat"),
            )
            .await
            .expect("analysis stalled")
            .unwrap();
            assert_eq!(report.summary.total_estimated_loc, 30);
        }
    }

    #[tokio::test]
    async fn test_languages_requested_from_repository_owner() {
        let mut transferred = repository("moved", false);
        transferred.owner.login = "octo-org".into();
        let mut ownerless = repository("plain", false);
        ownerless.owner.login = String::new();

        let gateway = FakeGateway::new("octocat")
            .with_repo(transferred, LanguageBreakdown::new())
            .with_repo(ownerless, LanguageBreakdown::new());
        let owners = gateway.language_owners();

        pipeline(gateway).analyze_user("octocat").await.unwrap();
        assert_eq!(
            *owners.lock().unwrap(),
            vec!["octo-org/moved".to_string(), "octocat/plain".to_string()]
        );
    }

    #[tokio::test]
    async fn test_user_without_repositories() {
        let report = pipeline(FakeGateway::new("octocat"))
            .analyze_user("octocat")
            .await
            .unwrap();
        assert!(report.repositories.is_empty());
        assert_eq!(report.summary.average_quality_score, 0.0);
        assert_eq!(report.profile.public_repos, 0);
    }
}
