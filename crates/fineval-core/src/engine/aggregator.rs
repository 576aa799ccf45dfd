//! Scoring aggregator: runs the three metric adapters over index-aligned inputs.
//!
//! F1 is one batched call. Cosine and correctness fan out one task per item on a
//! `JoinSet` and are merged back by item index, so completion order never affects
//! row order. Metric kinds run one after another: F1, cosine, correctness.

use crate::config::{ErrorPolicy, EvalConfig};
use crate::errors::{EvalError, ProviderFailure, Result};
use crate::metrics_api::{CorrectnessScorer, EvalScore, OverlapScorer, SimilarityScorer};
use crate::model::{EvalItem, MetricFailure, MetricKind, ScoreRow};
use crate::report::table::{load_items_csv, ScoreTable, SummaryTable};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorSettings {
    pub lang: String,
    pub parallel: Option<usize>,
    pub on_error: ErrorPolicy,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            parallel: None,
            on_error: ErrorPolicy::Abort,
        }
    }
}

impl From<&EvalConfig> for AggregatorSettings {
    fn from(cfg: &EvalConfig) -> Self {
        Self {
            lang: cfg.lang.clone(),
            parallel: cfg.parallel,
            on_error: cfg.on_error,
        }
    }
}

#[derive(Clone)]
pub struct ScoringAggregator {
    overlap: Arc<dyn OverlapScorer>,
    similarity: Arc<dyn SimilarityScorer>,
    correctness: Arc<dyn CorrectnessScorer>,
    settings: AggregatorSettings,
}

fn split_items(items: &[EvalItem]) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut questions = Vec::with_capacity(items.len());
    let mut answers = Vec::with_capacity(items.len());
    let mut ground_truths = Vec::with_capacity(items.len());
    for item in items {
        questions.push(item.question.clone());
        answers.push(item.answer.clone());
        ground_truths.push(item.ground_truth.clone());
    }
    (questions, answers, ground_truths)
}

impl ScoringAggregator {
    pub fn new(
        overlap: Arc<dyn OverlapScorer>,
        similarity: Arc<dyn SimilarityScorer>,
        correctness: Arc<dyn CorrectnessScorer>,
    ) -> Self {
        Self {
            overlap,
            similarity,
            correctness,
            settings: AggregatorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: AggregatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Per-metric averages over all items, in `f1, cosine, correctness` order.
    pub async fn evaluate(
        &self,
        questions: &[String],
        answers: &[String],
        ground_truths: &[String],
    ) -> Result<SummaryTable> {
        Ok(self
            .evaluate_each(questions, answers, ground_truths)
            .await?
            .summarize())
    }

    /// One row per item, in input order.
    pub async fn evaluate_each(
        &self,
        questions: &[String],
        answers: &[String],
        ground_truths: &[String],
    ) -> Result<ScoreTable> {
        if questions.len() != answers.len() || answers.len() != ground_truths.len() {
            return Err(EvalError::mismatched_lengths(
                questions.len(),
                answers.len(),
                ground_truths.len(),
            ));
        }
        let n = questions.len();
        let started = Instant::now();
        info!(items = n, on_error = ?self.settings.on_error, "evaluation started");

        let mut failures = Vec::new();
        let f1 = self.settle(
            MetricKind::F1,
            self.f1_scores(answers, ground_truths).await,
            n,
            &mut failures,
        )?;
        let cosine = self.settle(
            MetricKind::Cosine,
            self.cosine_scores(answers, ground_truths).await,
            n,
            &mut failures,
        )?;
        let correctness = self.settle(
            MetricKind::Correctness,
            self.correctness_scores(questions, answers, ground_truths)
                .await,
            n,
            &mut failures,
        )?;

        let rows = (0..n)
            .map(|i| ScoreRow {
                question: questions[i].clone(),
                answer: answers[i].clone(),
                ground_truth: ground_truths[i].clone(),
                f1: f1[i],
                cosine: cosine[i],
                correctness: correctness[i],
            })
            .collect();

        info!(
            items = n,
            failed_metrics = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "evaluation finished"
        );
        Ok(ScoreTable { rows, failures })
    }

    pub async fn evaluate_items(&self, items: &[EvalItem]) -> Result<SummaryTable> {
        let (q, a, g) = split_items(items);
        self.evaluate(&q, &a, &g).await
    }

    pub async fn evaluate_each_items(&self, items: &[EvalItem]) -> Result<ScoreTable> {
        let (q, a, g) = split_items(items);
        self.evaluate_each(&q, &a, &g).await
    }

    /// Reads a CSV with `question,answer,ground_truth` columns and summarizes it.
    pub async fn evaluate_from_csv(&self, path: &Path) -> Result<SummaryTable> {
        let items = load_items_csv(path)?;
        self.evaluate_items(&items).await
    }

    pub async fn evaluate_each_from_csv(&self, path: &Path) -> Result<ScoreTable> {
        let items = load_items_csv(path)?;
        self.evaluate_each_items(&items).await
    }

    /// Batched overlap F1 over all items.
    pub async fn f1_scores(&self, answers: &[String], ground_truths: &[String]) -> Result<Vec<f64>> {
        if answers.is_empty() {
            return Ok(Vec::new());
        }
        debug!(scorer = self.overlap.name(), items = answers.len(), "scoring f1");
        let scores = self
            .overlap
            .batch_overlap_score(answers, ground_truths, &self.settings.lang)
            .await
            .map_err(|e| EvalError::external(MetricKind::F1, &e))?;
        if scores.f1.len() != answers.len() {
            return Err(EvalError::ExternalService {
                metric: MetricKind::F1,
                cause: ProviderFailure::MalformedResponse,
                message: format!(
                    "overlap scorer returned {} scores for {} items",
                    scores.f1.len(),
                    answers.len()
                ),
            });
        }
        Ok(scores.f1)
    }

    pub async fn cosine_scores(
        &self,
        answers: &[String],
        ground_truths: &[String],
    ) -> Result<Vec<f64>> {
        debug!(scorer = self.similarity.name(), items = answers.len(), "scoring cosine");
        self.fan_out(MetricKind::Cosine, answers.len(), |i| {
            let scorer = self.similarity.clone();
            let answer = answers[i].clone();
            let reference = ground_truths[i].clone();
            async move { scorer.similarity_score(&answer, &reference).await }
        })
        .await
    }

    pub async fn correctness_scores(
        &self,
        questions: &[String],
        answers: &[String],
        ground_truths: &[String],
    ) -> Result<Vec<f64>> {
        debug!(scorer = self.correctness.name(), items = answers.len(), "scoring correctness");
        self.fan_out(MetricKind::Correctness, answers.len(), |i| {
            let scorer = self.correctness.clone();
            let query = questions[i].clone();
            let answer = answers[i].clone();
            let reference = ground_truths[i].clone();
            async move { scorer.correctness_score(&query, &answer, &reference).await }
        })
        .await
    }

    /// Spawns one task per item and collects scores into their original slots.
    /// Returning early drops the `JoinSet`, which aborts the calls still in flight.
    async fn fan_out<F, Fut>(&self, metric: MetricKind, n: usize, make: F) -> Result<Vec<f64>>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = anyhow::Result<EvalScore>> + Send + 'static,
    {
        let sem = self.settings.parallel.map(|p| Arc::new(Semaphore::new(p.max(1))));
        let mut join_set = JoinSet::new();

        for idx in 0..n {
            let call = make(idx);
            let sem = sem.clone();
            join_set.spawn(async move {
                let _permit = match sem {
                    Some(s) => s.acquire_owned().await.ok(),
                    None => None,
                };
                (idx, call.await)
            });
        }

        let mut slots: Vec<Option<f64>> = vec![None; n];
        while let Some(joined) = join_set.join_next().await {
            let (idx, res) = joined.map_err(|e| EvalError::ExternalService {
                metric,
                cause: ProviderFailure::Other,
                message: format!("scorer task failed: {}", e),
            })?;
            let score = res.map_err(|e| EvalError::external(metric, &e))?;
            slots[idx] = Some(score.score);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, s)| {
                s.ok_or_else(|| EvalError::ExternalService {
                    metric,
                    cause: ProviderFailure::Other,
                    message: format!("no score produced for item {}", idx),
                })
            })
            .collect()
    }

    /// Applies the error policy to one metric's outcome.
    fn settle(
        &self,
        metric: MetricKind,
        outcome: Result<Vec<f64>>,
        n: usize,
        failures: &mut Vec<MetricFailure>,
    ) -> Result<Vec<f64>> {
        match outcome {
            Ok(scores) => Ok(scores),
            Err(err @ EvalError::ExternalService { .. })
                if self.settings.on_error == ErrorPolicy::Isolate =>
            {
                warn!(%metric, error = %err, "metric failed; filling column with NaN");
                failures.push(MetricFailure {
                    metric,
                    message: err.to_string(),
                });
                Ok(vec![f64::NAN; n])
            }
            Err(err) => Err(err),
        }
    }
}
