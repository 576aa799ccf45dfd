use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fineval",
    version,
    about = "Score question-answering output against reference answers (F1, cosine, LLM-judged correctness)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score a CSV of question,answer,ground_truth rows
    Evaluate(EvaluateArgs),
    /// Answer benchmark questions from their source documents
    Answer(AnswerArgs),
    Version,
}

#[derive(ValueEnum, Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args, Clone)]
pub struct ProviderArgs {
    /// YAML config file; built-in defaults apply when omitted
    #[arg(long, env = "FINEVAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// API key for the openai provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(clap::Args, Clone)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub input: PathBuf,

    /// Emit one row per item instead of the three-row summary
    #[arg(long)]
    pub each: bool,

    /// Also write the resulting table as CSV
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

#[derive(clap::Args, Clone)]
pub struct AnswerArgs {
    /// Benchmark id (with or without the financebench_id_ prefix), or "all"
    pub item: String,

    #[arg(long)]
    pub benchmark: PathBuf,

    /// Directory holding the source documents, named after each item's doc_name
    #[arg(long)]
    pub docs_dir: PathBuf,

    /// Answer column name; output goes to <output-dir>/<output-name>_output.csv
    #[arg(long, default_value = "llm-document-context")]
    pub output_name: String,

    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub provider: ProviderArgs,
}
