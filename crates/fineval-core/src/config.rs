use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_CORRECTNESS_THRESHOLD: f64 = 4.0;
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 24_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Openai,
    /// Deterministic offline providers (hash embeddings, canned completions).
    Fake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapKind {
    #[default]
    Token,
    Embedding,
}

/// What the aggregator does when a metric adapter fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// First failure aborts the whole evaluation.
    #[default]
    Abort,
    /// Failed metric columns become NaN; the other metrics are still returned.
    Isolate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub version: u32,
    pub provider: ProviderKind,
    pub embedding_model: String,
    pub judge_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub overlap: OverlapKind,
    pub lang: String,
    pub similarity_threshold: f64,
    pub correctness_threshold: f64,
    /// Cap on in-flight per-item scorer calls. `None` dispatches every item at once.
    pub parallel: Option<usize>,
    pub on_error: ErrorPolicy,
    pub max_context_chars: usize,
    /// Canned reply for the `fake` chat client in place of its built-in grader.
    pub fake_reply: Option<String>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            provider: ProviderKind::default(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            judge_model: DEFAULT_JUDGE_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: 512,
            overlap: OverlapKind::default(),
            lang: "en".to_string(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            correctness_threshold: DEFAULT_CORRECTNESS_THRESHOLD,
            parallel: None,
            on_error: ErrorPolicy::default(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            fake_reply: None,
        }
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }
        if self.parallel == Some(0) {
            return Err(ConfigError("parallel must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if !(1.0..=5.0).contains(&self.correctness_threshold) {
            return Err(ConfigError(format!(
                "correctness_threshold must be within [1, 5], got {}",
                self.correctness_threshold
            )));
        }
        if self.fake_reply.is_some() && self.provider != ProviderKind::Fake {
            return Err(ConfigError("fake_reply only applies to provider 'fake'".into()));
        }
        if self.lang.trim().is_empty() {
            return Err(ConfigError("lang must not be empty".into()));
        }
        Ok(())
    }
}

pub fn parse_config(raw: &str) -> Result<EvalConfig, ConfigError> {
    let cfg: EvalConfig = serde_yaml::from_str(raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<EvalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw)
}

/// Loads `path` when given, otherwise falls back to defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<EvalConfig, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => Ok(EvalConfig::default()),
    }
}
