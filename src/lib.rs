pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod taxonomy;
pub mod analysis;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, GatewayConfig, PipelineConfig};
pub use error::{Error, Result};
pub use github::{GitHubClient, SourceGateway};
pub use analysis::{AnalysisOutcome, AnalysisPipeline, AnalysisService};
pub use storage::TtlCache;
