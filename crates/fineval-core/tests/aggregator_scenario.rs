//! End-to-end aggregation over the capital-of-Vietnam scenario with offline scorers.

use async_trait::async_trait;
use fineval_core::embeddings::cosine_similarity;
use fineval_core::metrics_api::{
    CorrectnessScorer, EvalScore, OverlapScorer, OverlapScores, SimilarityScorer,
};
use fineval_core::providers::embedder::fake::FakeEmbedder;
use fineval_core::providers::embedder::Embedder;
use fineval_core::{MetricKind, ScoringAggregator};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

struct SetOverlap;

#[async_trait]
impl OverlapScorer for SetOverlap {
    fn name(&self) -> &'static str {
        "set-overlap"
    }

    async fn batch_overlap_score(
        &self,
        predictions: &[String],
        references: &[String],
        _lang: &str,
    ) -> anyhow::Result<OverlapScores> {
        let mut out = OverlapScores::default();
        for (p, r) in predictions.iter().zip(references) {
            let p: HashSet<String> = tokens(p).into_iter().collect();
            let r: HashSet<String> = tokens(r).into_iter().collect();
            let common = p.intersection(&r).count() as f64;
            let precision = if p.is_empty() { 0.0 } else { common / p.len() as f64 };
            let recall = if r.is_empty() { 0.0 } else { common / r.len() as f64 };
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            out.push(precision, recall, f1);
        }
        Ok(out)
    }
}

struct HashedSimilarity {
    embedder: FakeEmbedder,
}

#[async_trait]
impl SimilarityScorer for HashedSimilarity {
    fn name(&self) -> &'static str {
        "hashed"
    }

    async fn similarity_score(&self, response: &str, reference: &str) -> anyhow::Result<EvalScore> {
        let a = self.embedder.embed(response).await?;
        let b = self.embedder.embed(reference).await?;
        Ok(EvalScore::new(cosine_similarity(&a, &b)?))
    }
}

/// 5.0 when the answer matches the reference, 1.0 otherwise.
struct ExactCorrectness;

#[async_trait]
impl CorrectnessScorer for ExactCorrectness {
    fn name(&self) -> &'static str {
        "exact"
    }

    async fn correctness_score(
        &self,
        _query: &str,
        response: &str,
        reference: &str,
    ) -> anyhow::Result<EvalScore> {
        let score = if tokens(response) == tokens(reference) { 5.0 } else { 1.0 };
        Ok(EvalScore::new(score))
    }
}

fn aggregator() -> ScoringAggregator {
    ScoringAggregator::new(
        Arc::new(SetOverlap),
        Arc::new(HashedSimilarity {
            embedder: FakeEmbedder::hashed("fake", 512),
        }),
        Arc::new(ExactCorrectness),
    )
}

fn owned(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn capital_of_vietnam_scenario() {
    let questions = owned(&["Capital of Vietnam?"; 3]);
    let answers = owned(&["Ho Chi Minh City"; 3]);
    let ground_truths = owned(&["Ho Chi Minh City", "Bangkok", "I had lunch at Pho Ha"]);

    let agg = aggregator();
    let table = agg
        .evaluate_each(&questions, &answers, &ground_truths)
        .await
        .unwrap();
    assert_eq!(table.len(), 3);
    assert!(table.failures.is_empty());

    let first = &table.rows[0];
    assert!((first.f1 - 1.0).abs() < 1e-9);
    assert!((first.cosine - 1.0).abs() < 1e-6);
    assert_eq!(first.correctness, 5.0);

    for row in &table.rows[1..] {
        assert!(row.f1 < 0.5, "f1 too high: {}", row.f1);
        assert!(row.cosine <= 0.5, "cosine too high: {}", row.cosine);
        assert!(row.correctness < first.correctness);
    }

    let summary = agg
        .evaluate(&questions, &answers, &ground_truths)
        .await
        .unwrap();
    assert_eq!(summary.rows.len(), 3);
    for metric in MetricKind::ALL {
        let column = table.column(metric);
        let expected = column.iter().sum::<f64>() / column.len() as f64;
        let got = summary.score(metric).unwrap();
        assert!((got - expected).abs() < 1e-9, "{metric}: {got} != {expected}");
    }
}

#[tokio::test]
async fn row_and_summary_counts_hold_for_any_length() {
    let agg = aggregator();
    for n in [0usize, 1, 2, 7, 25] {
        let qs: Vec<String> = (0..n).map(|i| format!("q{i}")).collect();
        let answers: Vec<String> = (0..n).map(|i| format!("answer {i}")).collect();
        let gts: Vec<String> = (0..n).map(|i| format!("answer {}", i % 3)).collect();
        let table = agg.evaluate_each(&qs, &answers, &gts).await.unwrap();
        assert_eq!(table.len(), n);
        let summary = agg.evaluate(&qs, &answers, &gts).await.unwrap();
        assert_eq!(summary.rows.len(), 3);
    }
}

/// Finishes items in reverse order of submission.
struct ReverseDelaySimilarity {
    total: usize,
    started: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ReverseDelaySimilarity {
    fn new(total: usize) -> Self {
        Self {
            total,
            started: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SimilarityScorer for ReverseDelaySimilarity {
    fn name(&self) -> &'static str {
        "reverse-delay"
    }

    async fn similarity_score(&self, _response: &str, reference: &str) -> anyhow::Result<EvalScore> {
        let idx: usize = reference.parse()?;
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5 * (self.total - idx) as u64)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(EvalScore::new(idx as f64))
    }
}

#[tokio::test]
async fn completion_order_does_not_change_row_order() {
    let n = 8;
    let sim = Arc::new(ReverseDelaySimilarity::new(n));
    let agg = ScoringAggregator::new(Arc::new(SetOverlap), sim.clone(), Arc::new(ExactCorrectness));
    let gts: Vec<String> = (0..n).map(|i| i.to_string()).collect();
    let table = agg
        .evaluate_each(&vec!["q".to_string(); n], &vec!["a".to_string(); n], &gts)
        .await
        .unwrap();
    let expected: Vec<f64> = (0..n).map(|i| i as f64).collect();
    assert_eq!(table.column(MetricKind::Cosine), expected);
    assert_eq!(sim.started.load(Ordering::SeqCst), n);
}

#[tokio::test]
async fn parallel_cap_bounds_in_flight_calls() {
    let n = 6;
    let sim = Arc::new(ReverseDelaySimilarity::new(n));
    let agg = ScoringAggregator::new(Arc::new(SetOverlap), sim.clone(), Arc::new(ExactCorrectness))
        .with_settings(fineval_core::engine::aggregator::AggregatorSettings {
            parallel: Some(2),
            ..Default::default()
        });
    let gts: Vec<String> = (0..n).map(|i| i.to_string()).collect();
    agg.evaluate_each(&vec!["q".to_string(); n], &vec!["a".to_string(); n], &gts)
        .await
        .unwrap();
    assert!(sim.max_in_flight.load(Ordering::SeqCst) <= 2);
}
