use std::sync::Arc;

use fineval_core::config::{EvalConfig, OverlapKind};
use fineval_core::engine::aggregator::AggregatorSettings;
use fineval_core::metrics_api::{CorrectnessScorer, OverlapScorer, SimilarityScorer};
use fineval_core::providers::Providers;
use fineval_core::ScoringAggregator;

pub mod correctness;
pub mod overlap;
pub mod similarity;

pub use correctness::LlmCorrectnessScorer;
pub use overlap::{EmbeddingOverlapScorer, TokenOverlapScorer};
pub use similarity::EmbeddingSimilarityScorer;

pub struct Scorers {
    pub overlap: Arc<dyn OverlapScorer>,
    pub similarity: Arc<dyn SimilarityScorer>,
    pub correctness: Arc<dyn CorrectnessScorer>,
}

pub fn default_scorers(cfg: &EvalConfig, providers: &Providers) -> Scorers {
    let overlap: Arc<dyn OverlapScorer> = match cfg.overlap {
        OverlapKind::Token => Arc::new(TokenOverlapScorer),
        OverlapKind::Embedding => Arc::new(EmbeddingOverlapScorer::new(providers.embedder.clone())),
    };
    Scorers {
        overlap,
        similarity: Arc::new(
            EmbeddingSimilarityScorer::new(providers.embedder.clone())
                .with_threshold(cfg.similarity_threshold),
        ),
        correctness: Arc::new(
            LlmCorrectnessScorer::new(providers.llm.clone()).with_threshold(cfg.correctness_threshold),
        ),
    }
}

/// Aggregator wired with the configured scorers and settings.
pub fn build_aggregator(cfg: &EvalConfig, providers: &Providers) -> ScoringAggregator {
    let scorers = default_scorers(cfg, providers);
    ScoringAggregator::new(scorers.overlap, scorers.similarity, scorers.correctness)
        .with_settings(AggregatorSettings::from(cfg))
}
