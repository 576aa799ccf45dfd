use crate::errors::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const ID_COLUMN: &str = "financebench_id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkItem {
    pub financebench_id: String,
    pub doc_name: String,
    pub question: String,
    #[serde(default)]
    pub evidence_text: String,
    #[serde(default)]
    pub page_number: String,
    #[serde(default)]
    pub answer: String,
}

/// The benchmark metadata table, in file order, indexed by item id.
#[derive(Debug, Clone, Default)]
pub struct Benchmark {
    items: Vec<BenchmarkItem>,
    index: HashMap<String, usize>,
}

impl Benchmark {
    pub fn new(items: Vec<BenchmarkItem>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if index.insert(item.financebench_id.clone(), i).is_some() {
                return Err(EvalError::Table(format!(
                    "duplicate {} '{}'",
                    ID_COLUMN, item.financebench_id
                )));
            }
        }
        Ok(Self { items, index })
    }

    pub fn read_csv<R: Read>(r: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(r);
        let headers = rdr.headers()?.clone();
        for required in [ID_COLUMN, "doc_name", "question"] {
            if !headers.iter().any(|h| h == required) {
                return Err(EvalError::Table(format!(
                    "benchmark is missing required column '{}'",
                    required
                )));
            }
        }
        let mut items = Vec::new();
        for item in rdr.deserialize() {
            items.push(item?);
        }
        Self::new(items)
    }

    pub fn load_csv(path: &Path) -> Result<Self> {
        Self::read_csv(File::open(path)?)
    }

    pub fn get(&self, id: &str) -> Option<&BenchmarkItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.financebench_id.as_str())
    }

    pub fn items(&self) -> &[BenchmarkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `"3"` becomes `"financebench_id_3"`; already-prefixed ids are kept.
pub fn normalize_item_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with(ID_COLUMN) {
        raw.to_string()
    } else {
        format!("{}_{}", ID_COLUMN, raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchPolicy {
    Single(String),
    /// Every benchmark item, sequentially, in benchmark order.
    All,
}

impl BatchPolicy {
    /// Any selector containing "all" (case-insensitive) selects every item.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(EvalError::InvalidArgs("item id must not be empty".into()));
        }
        let id = normalize_item_id(raw);
        if id.to_lowercase().contains("all") {
            Ok(BatchPolicy::All)
        } else {
            Ok(BatchPolicy::Single(id))
        }
    }

    pub fn select<'a>(&self, benchmark: &'a Benchmark) -> Result<Vec<&'a BenchmarkItem>> {
        match self {
            BatchPolicy::All => Ok(benchmark.items().iter().collect()),
            BatchPolicy::Single(id) => benchmark
                .get(id)
                .map(|item| vec![item])
                .ok_or_else(|| EvalError::InvalidArgs(format!("unknown benchmark item '{}'", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
financebench_id,company,doc_name,question,answer,evidence_text,page_number
financebench_id_03029,3M,3M_2018_10K,What is the FY2018 capex for 3M?,$1577.00,\"Purchases of PP&E (1,577)\",60
financebench_id_00499,AES,AES_2022_10K,Is AES a capital-intensive business?,Yes,,
";

    #[test]
    fn loads_rows_in_order_with_optional_columns() {
        let bench = Benchmark::read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(bench.len(), 2);
        assert_eq!(
            bench.ids().collect::<Vec<_>>(),
            vec!["financebench_id_03029", "financebench_id_00499"]
        );
        let item = bench.get("financebench_id_03029").unwrap();
        assert_eq!(item.doc_name, "3M_2018_10K");
        assert_eq!(item.evidence_text, "Purchases of PP&E (1,577)");
        assert_eq!(item.page_number, "60");
        assert_eq!(bench.get("financebench_id_00499").unwrap().page_number, "");
    }

    #[test]
    fn rejects_missing_columns_and_duplicates() {
        let err = Benchmark::read_csv("financebench_id,question\nx,y\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("doc_name"));

        let dup = "financebench_id,doc_name,question\na,d,q\na,d,q\n";
        let err = Benchmark::read_csv(dup.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn ids_are_normalized() {
        assert_eq!(normalize_item_id("03029"), "financebench_id_03029");
        assert_eq!(normalize_item_id("financebench_id_03029"), "financebench_id_03029");
    }

    #[test]
    fn all_selector_is_case_insensitive() {
        assert_eq!(BatchPolicy::parse("all").unwrap(), BatchPolicy::All);
        assert_eq!(BatchPolicy::parse("ALL").unwrap(), BatchPolicy::All);
        assert_eq!(BatchPolicy::parse("financebench_id_all").unwrap(), BatchPolicy::All);
        assert_eq!(
            BatchPolicy::parse("00499").unwrap(),
            BatchPolicy::Single("financebench_id_00499".into())
        );
        assert!(BatchPolicy::parse("  ").is_err());
    }

    #[test]
    fn select_unknown_id_is_invalid_args() {
        let bench = Benchmark::read_csv(SAMPLE.as_bytes()).unwrap();
        let err = BatchPolicy::Single("financebench_id_1".into())
            .select(&bench)
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgs(_)));
        assert_eq!(BatchPolicy::All.select(&bench).unwrap().len(), 2);
    }
}
