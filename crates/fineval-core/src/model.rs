use serde::{Deserialize, Serialize};
use std::fmt;

/// One benchmark unit: the question, the generated answer and the reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalItem {
    pub question: String,
    pub answer: String,
    pub ground_truth: String,
}

impl EvalItem {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        ground_truth: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ground_truth: ground_truth.into(),
        }
    }
}

/// Per-item scores alongside the original triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub question: String,
    pub answer: String,
    pub ground_truth: String,
    pub f1: f64,
    pub cosine: f64,
    pub correctness: f64,
}

impl ScoreRow {
    pub fn score(&self, metric: MetricKind) -> f64 {
        match metric {
            MetricKind::F1 => self.f1,
            MetricKind::Cosine => self.cosine,
            MetricKind::Correctness => self.correctness,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub metric: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    F1,
    Cosine,
    Correctness,
}

impl MetricKind {
    /// Report order. Summary tables always list metrics in this order.
    pub const ALL: [MetricKind; 3] = [MetricKind::F1, MetricKind::Cosine, MetricKind::Correctness];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::F1 => "f1",
            MetricKind::Cosine => "cosine",
            MetricKind::Correctness => "correctness",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric whose computation failed under the `isolate` error policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFailure {
    pub metric: MetricKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_are_stable() {
        let names: Vec<&str> = MetricKind::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, vec!["f1", "cosine", "correctness"]);
        assert_eq!(MetricKind::parse("cosine"), Some(MetricKind::Cosine));
        assert_eq!(MetricKind::parse("bleu"), None);
    }

    #[test]
    fn score_row_lookup_by_metric() {
        let row = ScoreRow {
            question: "q".into(),
            answer: "a".into(),
            ground_truth: "g".into(),
            f1: 0.5,
            cosine: 0.9,
            correctness: 4.0,
        };
        assert_eq!(row.score(MetricKind::F1), 0.5);
        assert_eq!(row.score(MetricKind::Cosine), 0.9);
        assert_eq!(row.score(MetricKind::Correctness), 4.0);
    }
}
