use crate::report::table::{ScoreTable, SummaryTable};

const TEXT_CELL_WIDTH: usize = 32;

/// Shortens `text` to at most `width` characters, marking the cut with an ellipsis.
#[must_use]
pub fn truncate_cell(text: &str, width: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= width {
        return flat;
    }
    let keep: String = flat.chars().take(width.saturating_sub(1)).collect();
    format!("{keep}…")
}

fn fmt_score(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.4}")
    }
}

#[must_use]
pub fn render_summary(summary: &SummaryTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<12} {:>10}\n", "metric", "score"));
    for row in &summary.rows {
        out.push_str(&format!("{:<12} {:>10}\n", row.metric, fmt_score(row.score)));
    }
    for failure in &summary.failures {
        out.push_str(&format!("! {} failed: {}\n", failure.metric, failure.message));
    }
    out
}

#[must_use]
pub fn render_scores(table: &ScoreTable) -> String {
    let w = TEXT_CELL_WIDTH;
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4}  {:<w$}  {:<w$}  {:<w$}  {:>8}  {:>8}  {:>11}\n",
        "#", "question", "answer", "ground_truth", "f1", "cosine", "correctness"
    ));
    for (i, row) in table.rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<w$}  {:<w$}  {:<w$}  {:>8}  {:>8}  {:>11}\n",
            i,
            truncate_cell(&row.question, w),
            truncate_cell(&row.answer, w),
            truncate_cell(&row.ground_truth, w),
            fmt_score(row.f1),
            fmt_score(row.cosine),
            fmt_score(row.correctness),
        ));
    }
    for failure in &table.failures {
        out.push_str(&format!("! {} failed: {}\n", failure.metric, failure.message));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetricFailure, MetricKind, ScoreRow};

    #[test]
    fn truncates_long_cells() {
        assert_eq!(truncate_cell("short", 10), "short");
        assert_eq!(truncate_cell("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_cell("line\nbreak", 20), "line break");
    }

    #[test]
    fn summary_lists_metrics_and_failures() {
        let mut table = ScoreTable::new(vec![ScoreRow {
            question: "q".into(),
            answer: "a".into(),
            ground_truth: "g".into(),
            f1: 1.0,
            cosine: f64::NAN,
            correctness: 5.0,
        }]);
        table.failures.push(MetricFailure {
            metric: MetricKind::Cosine,
            message: "timeout".into(),
        });
        let text = render_summary(&table.summarize());
        assert!(text.contains("f1"));
        assert!(text.contains("1.0000"));
        assert!(text.contains("NaN"));
        assert!(text.contains("! cosine failed: timeout"));
    }

    #[test]
    fn score_table_has_one_line_per_row_plus_header() {
        let row = ScoreRow {
            question: "What is the capital of Vietnam?".into(),
            answer: "Ho Chi Minh City".into(),
            ground_truth: "Bangkok".into(),
            f1: 0.0,
            cosine: 0.1,
            correctness: 1.0,
        };
        let table = ScoreTable::new(vec![row.clone(), row]);
        let text = render_scores(&table);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().contains("correctness"));
    }
}
