//! Flat CSV tables for per-item scores and per-metric summaries.

use crate::errors::{EvalError, Result};
use crate::model::{EvalItem, MetricFailure, MetricKind, ScoreRow, SummaryRow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const SCORE_HEADER: [&str; 6] = ["question", "answer", "ground_truth", "f1", "cosine", "correctness"];
pub const SUMMARY_HEADER: [&str; 2] = ["metric", "score"];
pub const ITEM_COLUMNS: [&str; 3] = ["question", "answer", "ground_truth"];

/// Arithmetic mean. Empty input and any NaN both yield NaN.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn check_header(found: &csv::StringRecord, expected: &[&str]) -> Result<()> {
    if found.iter().eq(expected.iter().copied()) {
        return Ok(());
    }
    Err(EvalError::Table(format!(
        "unexpected header: expected '{}', found '{}'",
        expected.join(","),
        found.iter().collect::<Vec<_>>().join(",")
    )))
}

fn write_rows<W: Write, T: Serialize>(w: W, header: &[&str], rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(w);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_rows<R: Read, T: for<'de> Deserialize<'de>>(r: R, header: &[&str]) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(r);
    check_header(rdr.headers()?, header)?;
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub rows: Vec<ScoreRow>,
    /// Metrics that failed under the `isolate` policy. Their columns hold NaN.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<MetricFailure>,
}

impl ScoreTable {
    pub fn new(rows: Vec<ScoreRow>) -> Self {
        Self {
            rows,
            failures: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, metric: MetricKind) -> Vec<f64> {
        self.rows.iter().map(|r| r.score(metric)).collect()
    }

    pub fn mean(&self, metric: MetricKind) -> f64 {
        mean(&self.column(metric))
    }

    pub fn summarize(&self) -> SummaryTable {
        SummaryTable {
            rows: MetricKind::ALL
                .iter()
                .map(|m| SummaryRow {
                    metric: m.as_str().to_string(),
                    score: self.mean(*m),
                })
                .collect(),
            failures: self.failures.clone(),
        }
    }

    pub fn write_csv<W: Write>(&self, w: W) -> Result<()> {
        write_rows(w, &SCORE_HEADER, &self.rows)
    }

    pub fn read_csv<R: Read>(r: R) -> Result<Self> {
        Ok(Self::new(read_rows(r, &SCORE_HEADER)?))
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| EvalError::Table(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.write_csv(File::create(path)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::read_csv(File::open(path)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<MetricFailure>,
}

impl SummaryTable {
    pub fn score(&self, metric: MetricKind) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.metric == metric.as_str())
            .map(|r| r.score)
    }

    pub fn write_csv<W: Write>(&self, w: W) -> Result<()> {
        write_rows(w, &SUMMARY_HEADER, &self.rows)
    }

    pub fn read_csv<R: Read>(r: R) -> Result<Self> {
        Ok(Self {
            rows: read_rows(r, &SUMMARY_HEADER)?,
            failures: Vec::new(),
        })
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| EvalError::Table(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.write_csv(File::create(path)?)
    }
}

/// Reads evaluation inputs. Columns beyond `question,answer,ground_truth` are ignored.
pub fn read_items_csv<R: Read>(r: R) -> Result<Vec<EvalItem>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(r);
    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = ITEM_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .collect();
    if !missing.is_empty() {
        return Err(EvalError::Table(format!(
            "input is missing required column(s): {}",
            missing.join(", ")
        )));
    }
    let mut items = Vec::new();
    for item in rdr.deserialize() {
        items.push(item?);
    }
    Ok(items)
}

pub fn load_items_csv(path: &Path) -> Result<Vec<EvalItem>> {
    read_items_csv(File::open(path)?)
}

pub fn write_items_csv<W: Write>(w: W, items: &[EvalItem]) -> Result<()> {
    write_rows(w, &ITEM_COLUMNS, items)
}
