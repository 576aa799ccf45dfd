use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use fineval_core::embeddings::cosine_similarity;
use fineval_core::metrics_api::{OverlapScorer, OverlapScores};
use fineval_core::providers::embedder::Embedder;
use tracing::debug;

const EN_ARTICLES: [&str; 3] = ["a", "an", "the"];

/// Lowercases, strips punctuation, drops English articles and splits on whitespace.
pub fn normalize_tokens(text: &str, lang: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    cleaned
        .split_whitespace()
        .filter(|t| lang != "en" || !EN_ARTICLES.contains(t))
        .map(str::to_string)
        .collect()
}

/// (precision, recall, f1) when either side has no tokens.
fn empty_case(prediction: &[String], reference: &[String]) -> Option<(f64, f64, f64)> {
    match (prediction.is_empty(), reference.is_empty()) {
        (true, true) => Some((1.0, 1.0, 1.0)),
        (true, false) | (false, true) => Some((0.0, 0.0, 0.0)),
        (false, false) => None,
    }
}

fn harmonic(precision: f64, recall: f64) -> f64 {
    if precision + recall <= 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Token-multiset precision, recall and F1 between two texts.
pub fn token_f1(prediction: &str, reference: &str, lang: &str) -> (f64, f64, f64) {
    let pred = normalize_tokens(prediction, lang);
    let gold = normalize_tokens(reference, lang);
    if let Some(scores) = empty_case(&pred, &gold) {
        return scores;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in &gold {
        *counts.entry(t.as_str()).or_default() += 1;
    }
    let mut common = 0usize;
    for t in &pred {
        if let Some(c) = counts.get_mut(t.as_str()) {
            if *c > 0 {
                *c -= 1;
                common += 1;
            }
        }
    }
    if common == 0 {
        return (0.0, 0.0, 0.0);
    }
    let precision = common as f64 / pred.len() as f64;
    let recall = common as f64 / gold.len() as f64;
    (precision, recall, harmonic(precision, recall))
}

/// Lexical overlap, scored locally.
pub struct TokenOverlapScorer;

#[async_trait]
impl OverlapScorer for TokenOverlapScorer {
    fn name(&self) -> &'static str {
        "token_f1"
    }

    async fn batch_overlap_score(
        &self,
        predictions: &[String],
        references: &[String],
        lang: &str,
    ) -> anyhow::Result<OverlapScores> {
        if predictions.len() != references.len() {
            anyhow::bail!(
                "batch length mismatch: {} predictions, {} references",
                predictions.len(),
                references.len()
            );
        }
        let mut out = OverlapScores::default();
        for (p, r) in predictions.iter().zip(references) {
            let (precision, recall, f1) = token_f1(p, r, lang);
            out.push(precision, recall, f1);
        }
        Ok(out)
    }
}

/// Greedy soft token matching over embeddings, in the manner of BERTScore.
pub struct EmbeddingOverlapScorer {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingOverlapScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

fn greedy_mean(
    from: &[String],
    to: &[String],
    vectors: &HashMap<String, Vec<f32>>,
) -> anyhow::Result<f64> {
    let mut total = 0.0;
    for a in from {
        let va = lookup(vectors, a)?;
        let mut best = f64::NEG_INFINITY;
        for b in to {
            best = best.max(cosine_similarity(va, lookup(vectors, b)?)?);
        }
        total += best;
    }
    Ok(total / from.len() as f64)
}

fn lookup<'a>(vectors: &'a HashMap<String, Vec<f32>>, token: &str) -> anyhow::Result<&'a [f32]> {
    vectors
        .get(token)
        .map(Vec::as_slice)
        .ok_or_else(|| anyhow::anyhow!("no embedding for token '{}'", token))
}

#[async_trait]
impl OverlapScorer for EmbeddingOverlapScorer {
    fn name(&self) -> &'static str {
        "embedding_f1"
    }

    async fn batch_overlap_score(
        &self,
        predictions: &[String],
        references: &[String],
        lang: &str,
    ) -> anyhow::Result<OverlapScores> {
        if predictions.len() != references.len() {
            anyhow::bail!(
                "batch length mismatch: {} predictions, {} references",
                predictions.len(),
                references.len()
            );
        }
        let pairs: Vec<(Vec<String>, Vec<String>)> = predictions
            .iter()
            .zip(references)
            .map(|(p, r)| (normalize_tokens(p, lang), normalize_tokens(r, lang)))
            .collect();

        let mut vocab: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for token in pairs.iter().flat_map(|(p, r)| p.iter().chain(r)) {
            if seen.insert(token.as_str()) {
                vocab.push(token.clone());
            }
        }
        let embedded = self.embedder.embed_batch(&vocab).await?;
        if embedded.len() != vocab.len() {
            anyhow::bail!(
                "embedder returned {} vectors for {} tokens",
                embedded.len(),
                vocab.len()
            );
        }
        let vectors: HashMap<String, Vec<f32>> = vocab.into_iter().zip(embedded).collect();
        debug!(
            model = %self.embedder.model_id(),
            unique_tokens = vectors.len(),
            pairs = pairs.len(),
            "embedded overlap vocabulary"
        );

        let mut out = OverlapScores::default();
        for (pred, gold) in &pairs {
            let (precision, recall, f1) = match empty_case(pred, gold) {
                Some(scores) => scores,
                None => {
                    let precision = greedy_mean(pred, gold, &vectors)?;
                    let recall = greedy_mean(gold, pred, &vectors)?;
                    (precision, recall, harmonic(precision, recall))
                }
            };
            out.push(precision, recall, f1);
        }
        Ok(out)
    }
}
