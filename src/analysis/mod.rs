pub mod aggregator;
pub mod pipeline;
pub mod scorer;
pub mod service;

pub use aggregator::ReportAggregator;
pub use pipeline::AnalysisPipeline;
pub use scorer::RepositoryScorer;
pub use service::{AnalysisOutcome, AnalysisService};
