use crate::batch::benchmark::BenchmarkItem;
use crate::errors::EvalError;
use crate::providers::llm::LlmClient;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Answers returned in place of an error when an item's document is missing.
pub const MISSING_DOCUMENT_PREFIX: &str = "ERROR: document not found:";

const DOCUMENT_EXTENSIONS: [&str; 3] = ["txt", "md", "text"];

const ANSWER_INSTRUCTIONS: &str = "You are a financial analyst answering questions about a \
company filing. Answer using only the document provided. Be concise and include figures \
with their units.";

#[async_trait]
pub trait AnswerFn: Send + Sync {
    /// Column name the answers are stored under, e.g. `llm-document-context`.
    fn output_name(&self) -> &str;
    async fn answer(&self, item: &BenchmarkItem) -> anyhow::Result<String>;
}

/// Answers from the item's document, passed whole (up to a character budget) as context.
pub struct DocumentAnswerer {
    llm: Arc<dyn LlmClient>,
    docs_dir: PathBuf,
    max_context_chars: usize,
    output_name: String,
}

impl DocumentAnswerer {
    pub fn new(llm: Arc<dyn LlmClient>, docs_dir: impl Into<PathBuf>, max_context_chars: usize) -> Self {
        Self {
            llm,
            docs_dir: docs_dir.into(),
            max_context_chars,
            output_name: "llm-document-context".to_string(),
        }
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Files backing `doc_name`: the exact path, a known extension, or every text file in a directory.
    pub fn locate_document(&self, doc_name: &str) -> Vec<PathBuf> {
        let base = self.docs_dir.join(doc_name);
        if base.is_file() {
            return vec![base];
        }
        if base.is_dir() {
            return text_files_in(&base);
        }
        DOCUMENT_EXTENSIONS
            .iter()
            .map(|ext| self.docs_dir.join(format!("{}.{}", doc_name, ext)))
            .find(|p| p.is_file())
            .into_iter()
            .collect()
    }

    /// Like `locate_document`, but an absent document is a `MissingResource` error.
    pub fn resolve_document(&self, doc_name: &str) -> crate::errors::Result<Vec<PathBuf>> {
        let files = self.locate_document(doc_name);
        if files.is_empty() {
            return Err(EvalError::MissingResource(doc_name.to_string()));
        }
        Ok(files)
    }
}

fn text_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e))
        })
        .collect();
    files.sort();
    files
}

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl AnswerFn for DocumentAnswerer {
    fn output_name(&self) -> &str {
        &self.output_name
    }

    async fn answer(&self, item: &BenchmarkItem) -> anyhow::Result<String> {
        let files = match self.resolve_document(&item.doc_name) {
            Ok(files) => files,
            Err(e @ EvalError::MissingResource(_)) => {
                warn!(doc = %item.doc_name, id = %item.financebench_id, "document not found");
                return Ok(format!("ERROR: {}", e));
            }
            Err(e) => return Err(e.into()),
        };

        let mut document = String::new();
        for file in &files {
            let bytes = tokio::fs::read(file).await?;
            document.push_str(&String::from_utf8_lossy(&bytes));
            document.push('\n');
        }
        let document = truncate_chars(&document, self.max_context_chars);
        debug!(
            doc = %item.doc_name,
            files = files.len(),
            context_chars = document.chars().count(),
            "answering from document"
        );

        let context = vec![
            ANSWER_INSTRUCTIONS.to_string(),
            format!("Document: {}\n\n{}", item.doc_name, document),
        ];
        let resp = self.llm.complete(&item.question, Some(&context)).await?;
        Ok(resp.text.trim().to_string())
    }
}
