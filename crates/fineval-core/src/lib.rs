pub mod backend;
pub mod batch;
pub mod config;
pub mod embeddings;
pub mod engine;
pub mod errors;
pub mod metrics_api;
pub mod model;
pub mod providers;
pub mod report;

pub use engine::aggregator::ScoringAggregator;
pub use errors::EvalError;
pub use model::{EvalItem, MetricKind, ScoreRow, SummaryRow};
pub use report::table::{ScoreTable, SummaryTable};
