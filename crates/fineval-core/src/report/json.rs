use crate::report::table::{ScoreTable, SummaryTable};
use serde_json::{json, Value};

fn score_value(v: f64) -> Value {
    // JSON has no NaN; missing scores are null.
    if v.is_finite() {
        json!(v)
    } else {
        Value::Null
    }
}

pub fn scores_to_json(table: &ScoreTable) -> Value {
    json!({
        "rows": table.rows.iter().map(|r| json!({
            "question": r.question,
            "answer": r.answer,
            "ground_truth": r.ground_truth,
            "f1": score_value(r.f1),
            "cosine": score_value(r.cosine),
            "correctness": score_value(r.correctness),
        })).collect::<Vec<_>>(),
        "failures": table.failures,
    })
}

pub fn summary_to_json(summary: &SummaryTable) -> Value {
    json!({
        "rows": summary.rows.iter().map(|r| json!({
            "metric": r.metric,
            "score": score_value(r.score),
        })).collect::<Vec<_>>(),
        "failures": summary.failures,
    })
}
