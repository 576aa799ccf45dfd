use crate::batch::benchmark::{Benchmark, BenchmarkItem, ID_COLUMN};
use crate::errors::{EvalError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Metadata columns copied from the benchmark into every output table.
pub const OUTPUT_BASE_COLUMNS: [&str; 6] = [
    ID_COLUMN,
    "doc_name",
    "question",
    "evidence_text",
    "page_number",
    "answer",
];

pub trait ResultSink: Send {
    fn record(&mut self, item: &BenchmarkItem, answer: &str) -> Result<()>;
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn record(&mut self, item: &BenchmarkItem, answer: &str) -> Result<()> {
        (**self).record(item, answer)
    }
}

/// Collects answers in memory, in record order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<(String, String)>,
}

impl ResultSink for MemorySink {
    fn record(&mut self, item: &BenchmarkItem, answer: &str) -> Result<()> {
        self.records
            .push((item.financebench_id.clone(), answer.to_string()));
        Ok(())
    }
}

/// Keeps `<dir>/<output_name>_output.csv` up to date, rewriting it after every answer.
///
/// A fresh file is seeded from the full benchmark with an empty answer column, so the
/// table always has one row per benchmark item regardless of how many were answered.
pub struct CsvResultSink {
    path: PathBuf,
    output_name: String,
    seed: Vec<BenchmarkItem>,
}

impl CsvResultSink {
    pub fn new(output_dir: &Path, output_name: &str, benchmark: &Benchmark) -> Self {
        Self {
            path: output_dir.join(format!("{}_output.csv", output_name)),
            output_name: output_name.to_string(),
            seed: benchmark.items().to_vec(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seeded_table(&self) -> OutputTable {
        let mut headers: Vec<String> = OUTPUT_BASE_COLUMNS.iter().map(|s| s.to_string()).collect();
        headers.push(self.output_name.clone());
        let rows = self.seed.iter().map(|item| seed_row(item, String::new())).collect();
        OutputTable { headers, rows }
    }
}

fn seed_row(item: &BenchmarkItem, answer: String) -> Vec<String> {
    vec![
        item.financebench_id.clone(),
        item.doc_name.clone(),
        item.question.clone(),
        item.evidence_text.clone(),
        item.page_number.clone(),
        item.answer.clone(),
        answer,
    ]
}

impl ResultSink for CsvResultSink {
    fn record(&mut self, item: &BenchmarkItem, answer: &str) -> Result<()> {
        let mut table = if self.path.is_file() {
            OutputTable::load(&self.path)?
        } else {
            self.seeded_table()
        };
        table.set(item, &self.output_name, answer)?;
        table.save(&self.path)?;
        debug!(path = %self.path.display(), id = %item.financebench_id, "output table updated");
        Ok(())
    }
}

/// A string table keyed by the id column; the answer column name is only known at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn load(path: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if !headers.iter().any(|h| h == ID_COLUMN) {
            return Err(EvalError::Table(format!(
                "{} has no '{}' column",
                path.display(),
                ID_COLUMN
            )));
        }
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn get(&self, id: &str, column: &str) -> Option<&str> {
        let id_col = self.column(ID_COLUMN)?;
        let col = self.column(column)?;
        self.rows
            .iter()
            .find(|r| r.get(id_col).map(String::as_str) == Some(id))
            .and_then(|r| r.get(col))
            .map(String::as_str)
    }

    /// Writes `value` into `column` for the item's row, adding the column or row if absent.
    pub fn set(&mut self, item: &BenchmarkItem, column: &str, value: &str) -> Result<()> {
        let id_col = self
            .column(ID_COLUMN)
            .ok_or_else(|| EvalError::Table(format!("output table has no '{}' column", ID_COLUMN)))?;
        let col = match self.column(column) {
            Some(c) => c,
            None => {
                self.headers.push(column.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };

        let width = self.headers.len();
        let pos = self
            .rows
            .iter()
            .position(|r| r.get(id_col).map(String::as_str) == Some(item.financebench_id.as_str()));
        let row = match pos {
            Some(p) => &mut self.rows[p],
            None => {
                let mut row = vec![String::new(); width];
                for (i, h) in self.headers.iter().enumerate() {
                    if let Some(v) = base_value(item, h) {
                        row[i] = v.to_string();
                    }
                }
                self.rows.push(row);
                let last = self.rows.len() - 1;
                &mut self.rows[last]
            }
        };
        row.resize(width, String::new());
        row[col] = value.to_string();
        Ok(())
    }
}

fn base_value<'a>(item: &'a BenchmarkItem, column: &str) -> Option<&'a str> {
    match column {
        ID_COLUMN => Some(item.financebench_id.as_str()),
        "doc_name" => Some(item.doc_name.as_str()),
        "question" => Some(item.question.as_str()),
        "evidence_text" => Some(item.evidence_text.as_str()),
        "page_number" => Some(item.page_number.as_str()),
        "answer" => Some(item.answer.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench() -> Benchmark {
        let items = ["a", "b", "c"]
            .iter()
            .map(|id| BenchmarkItem {
                financebench_id: format!("financebench_id_{id}"),
                doc_name: format!("DOC_{id}"),
                question: format!("question {id}?"),
                evidence_text: "evidence, with comma".into(),
                page_number: "7".into(),
                answer: format!("gold {id}"),
            })
            .collect();
        Benchmark::new(items).unwrap()
    }

    #[test]
    fn first_record_seeds_every_benchmark_row() {
        let dir = tempfile::tempdir().unwrap();
        let b = bench();
        let mut sink = CsvResultSink::new(dir.path(), "generic", &b);
        sink.record(&b.items()[1], "answer b").unwrap();

        assert!(sink.path().ends_with("generic_output.csv"));
        let table = OutputTable::load(sink.path()).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.headers.last().map(String::as_str), Some("generic"));
        assert_eq!(table.get("financebench_id_b", "generic"), Some("answer b"));
        assert_eq!(table.get("financebench_id_a", "generic"), Some(""));
        assert_eq!(
            table.get("financebench_id_a", "evidence_text"),
            Some("evidence, with comma")
        );
    }

    #[test]
    fn later_records_update_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let b = bench();
        let mut sink = CsvResultSink::new(dir.path(), "generic", &b);
        sink.record(&b.items()[0], "first").unwrap();
        sink.record(&b.items()[2], "third").unwrap();
        sink.record(&b.items()[0], "first, revised").unwrap();

        let table = OutputTable::load(sink.path()).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.get("financebench_id_a", "generic"), Some("first, revised"));
        assert_eq!(table.get("financebench_id_c", "generic"), Some("third"));
    }

    #[test]
    fn unknown_rows_and_columns_are_appended() {
        let b = bench();
        let mut table = OutputTable {
            headers: vec![ID_COLUMN.to_string(), "question".to_string()],
            rows: vec![vec!["financebench_id_a".into(), "question a?".into()]],
        };
        table.set(&b.items()[1], "generic", "x").unwrap();
        assert_eq!(table.headers, vec![ID_COLUMN, "question", "generic"]);
        assert_eq!(table.rows[0], vec!["financebench_id_a", "question a?", ""]);
        assert_eq!(table.rows[1], vec!["financebench_id_b", "question b?", "x"]);
    }

    #[test]
    fn memory_sink_keeps_order() {
        let b = bench();
        let mut sink = MemorySink::default();
        sink.record(&b.items()[2], "z").unwrap();
        sink.record(&b.items()[0], "x").unwrap();
        assert_eq!(
            sink.records,
            vec![
                ("financebench_id_c".to_string(), "z".to_string()),
                ("financebench_id_a".to_string(), "x".to_string())
            ]
        );
    }
}
