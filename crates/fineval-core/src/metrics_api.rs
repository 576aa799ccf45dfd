//! Scorer interfaces consumed by the aggregator.
//!
//! Each metric kind has its own trait: overlap is scored as one batch, similarity and
//! correctness are scored one item at a time so the aggregator can fan them out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Section headers shared between the correctness prompt and graders that parse it.
pub const USER_QUERY_HEADER: &str = "## User Query";
pub const REFERENCE_ANSWER_HEADER: &str = "## Reference Answer";
pub const GENERATED_ANSWER_HEADER: &str = "## Generated Answer";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlapScores {
    pub f1: Vec<f64>,
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
}

impl OverlapScores {
    pub fn len(&self) -> usize {
        self.f1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.f1.is_empty()
    }

    pub fn push(&mut self, precision: f64, recall: f64, f1: f64) {
        self.precision.push(precision);
        self.recall.push(recall);
        self.f1.push(f1);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalScore {
    pub score: f64,
    #[serde(default)]
    pub passing: Option<bool>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl EvalScore {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            passing: None,
            feedback: None,
        }
    }

    pub fn with_passing(mut self, passing: bool) -> Self {
        self.passing = Some(passing);
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

#[async_trait]
pub trait OverlapScorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scores every prediction against the reference at the same index.
    async fn batch_overlap_score(
        &self,
        predictions: &[String],
        references: &[String],
        lang: &str,
    ) -> anyhow::Result<OverlapScores>;
}

#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    fn name(&self) -> &'static str;
    async fn similarity_score(&self, response: &str, reference: &str) -> anyhow::Result<EvalScore>;
}

#[async_trait]
pub trait CorrectnessScorer: Send + Sync {
    fn name(&self) -> &'static str;
    async fn correctness_score(
        &self,
        query: &str,
        response: &str,
        reference: &str,
    ) -> anyhow::Result<EvalScore>;
}
