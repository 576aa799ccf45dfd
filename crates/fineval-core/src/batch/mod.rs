//! Batch answering over the FinanceBench metadata table.
//!
//! `BatchPolicy` selects items, an `AnswerFn` produces answers and a `ResultSink`
//! persists them. `BatchRunner` composes the three.

pub mod answer;
pub mod benchmark;
pub mod runner;
pub mod sink;

pub use answer::{AnswerFn, DocumentAnswerer, MISSING_DOCUMENT_PREFIX};
pub use benchmark::{normalize_item_id, BatchPolicy, Benchmark, BenchmarkItem, ID_COLUMN};
pub use runner::{AnsweredItem, BatchRunner};
pub use sink::{CsvResultSink, MemorySink, ResultSink};
