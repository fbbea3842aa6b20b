use std::collections::BTreeMap;

use crate::analysis::scorer::{rank_languages, round_one_decimal};
use crate::models::{ComplexityDistribution, RepositoryReport, ReportSummary};

/// Number of languages listed in a user summary.
pub const TOP_LANGUAGE_COUNT: usize = 10;

pub struct ReportAggregator;

impl ReportAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Rolls per-repository reports up into a user summary. `original_repos`
    /// and `forked_repos` come from the partition made before scoring.
    pub fn summarize(
        &self,
        reports: &[RepositoryReport],
        original_repos: usize,
        forked_repos: usize,
    ) -> ReportSummary {
        let total_estimated_loc = reports.iter().map(|r| r.estimated_loc).sum();
        let total_stars = reports.iter().map(|r| r.stars as u64).sum();
        let total_forks = reports.iter().map(|r| r.forks as u64).sum();

        let mut complexity_distribution = ComplexityDistribution::default();
        for report in reports {
            complexity_distribution.record(report.complexity_level);
        }

        ReportSummary {
            total_repos_analyzed: reports.len(),
            original_repos,
            forked_repos,
            total_estimated_loc,
            total_stars,
            total_forks,
            average_quality_score: self.average_quality(reports),
            complexity_distribution,
            top_languages: rank_languages(
                self.language_totals(reports)
                    .iter()
                    .map(|(name, bytes)| (*name, *bytes)),
                TOP_LANGUAGE_COUNT,
            ),
        }
    }

    fn language_totals<'a>(&self, reports: &'a [RepositoryReport]) -> BTreeMap<&'a str, u64> {
        let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
        for report in reports {
            for (language, bytes) in &report.all_languages {
                *totals.entry(language.as_str()).or_insert(0) += bytes;
            }
        }
        totals
    }

    fn average_quality(&self, reports: &[RepositoryReport]) -> f64 {
        if reports.is_empty() {
            return 0.0;
        }
        let total: u64 = reports.iter().map(|r| r.code_quality_score as u64).sum();
        round_one_decimal(total as f64 / reports.len() as f64)
    }
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self::new()
    }
}
