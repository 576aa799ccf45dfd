use std::sync::Arc;

use async_trait::async_trait;
use fineval_core::config::DEFAULT_SIMILARITY_THRESHOLD;
use fineval_core::embeddings::cosine_similarity;
use fineval_core::metrics_api::{EvalScore, SimilarityScorer};
use fineval_core::providers::embedder::Embedder;

pub struct EmbeddingSimilarityScorer {
    embedder: Arc<dyn Embedder>,
    threshold: f64,
}

impl EmbeddingSimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

#[async_trait]
impl SimilarityScorer for EmbeddingSimilarityScorer {
    fn name(&self) -> &'static str {
        "semantic_similarity"
    }

    async fn similarity_score(&self, response: &str, reference: &str) -> anyhow::Result<EvalScore> {
        let a = self.embedder.embed(response).await?;
        let b = self.embedder.embed(reference).await?;
        let score = cosine_similarity(&a, &b)?;
        Ok(EvalScore::new(score).with_passing(score >= self.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineval_core::providers::embedder::fake::FakeEmbedder;

    #[tokio::test]
    async fn identical_texts_pass() {
        let scorer = EmbeddingSimilarityScorer::new(Arc::new(FakeEmbedder::hashed("fake", 128)));
        let s = scorer
            .similarity_score("Ho Chi Minh City", "ho chi minh city")
            .await
            .unwrap();
        assert!((s.score - 1.0).abs() < 1e-6);
        assert_eq!(s.passing, Some(true));
    }

    #[tokio::test]
    async fn threshold_decides_passing() {
        let embedder = Arc::new(FakeEmbedder::new("fixed", vec![1.0, 0.0]));
        let scorer = EmbeddingSimilarityScorer::new(embedder).with_threshold(1.5);
        let s = scorer.similarity_score("a", "b").await.unwrap();
        assert!((s.score - 1.0).abs() < 1e-9);
        assert_eq!(s.passing, Some(false));
    }
}
