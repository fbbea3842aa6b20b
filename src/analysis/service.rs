use std::sync::Arc;
use std::time::Duration;

use crate::analysis::pipeline::AnalysisPipeline;
use crate::error::Result;
use crate::models::{AnalysisResponse, UserReport};
use crate::storage::TtlCache;

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: Arc<UserReport>,
    pub cached: bool,
}

impl AnalysisOutcome {
    pub fn response(&self) -> AnalysisResponse<'_> {
        AnalysisResponse {
            report: &self.report,
            cached: self.cached,
        }
    }
}

/// Cache-fronted entry point: answers from the cache when it can, otherwise
/// runs the pipeline and remembers the result.
///
/// Concurrent misses for the same user are not coalesced; each one runs its
/// own analysis and the last to finish wins the cache slot.
pub struct AnalysisService {
    pipeline: AnalysisPipeline,
    cache: TtlCache<String, Arc<UserReport>>,
}

impl AnalysisService {
    pub fn new(pipeline: AnalysisPipeline, cache_ttl: Duration) -> Self {
        Self {
            pipeline,
            cache: TtlCache::new(cache_ttl),
        }
    }

    pub async fn run_analysis(&self, username: &str, force_refresh: bool) -> Result<AnalysisOutcome> {
        let key = cache_key(username);

        if !force_refresh {
            if let Some(report) = self.cache.get(&key) {
                tracing::info!("Cache hit for {}", username);
                return Ok(AnalysisOutcome {
                    report,
                    cached: true,
                });
            }
            tracing::debug!("Cache miss for {}", username);
        } else {
            tracing::info!("Refresh requested for {}, bypassing cache", username);
        }

        let report = Arc::new(self.pipeline.analyze_user(username).await?);
        self.cache.set(key, report.clone());

        Ok(AnalysisOutcome {
            report,
            cached: false,
        })
    }

    pub fn invalidate(&self, username: &str) {
        self.cache.delete(&cache_key(username));
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.size()
    }
}

pub fn cache_key(username: &str) -> String {
    format!("analyze:{}", username.to_lowercase())
}
