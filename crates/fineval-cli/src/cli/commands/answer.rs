use super::super::args::AnswerArgs;
use super::setup_providers;
use crate::exit_codes::EXIT_SUCCESS;
use fineval_core::batch::{BatchPolicy, BatchRunner, Benchmark, CsvResultSink, DocumentAnswerer};
use fineval_core::EvalError;
use std::sync::Arc;
use tracing::info;

pub async fn run(args: AnswerArgs) -> anyhow::Result<i32> {
    let policy = BatchPolicy::parse(&args.item)?;
    if !args.benchmark.is_file() {
        return Err(EvalError::InvalidArgs(format!(
            "benchmark file not found: {}",
            args.benchmark.display()
        ))
        .into());
    }
    let benchmark = Benchmark::load_csv(&args.benchmark)?;
    // Fail on unknown ids before any provider is built.
    policy.select(&benchmark)?;

    let (cfg, providers) = setup_providers(&args.provider)?;
    let answerer = DocumentAnswerer::new(providers.llm, &args.docs_dir, cfg.max_context_chars)
        .with_output_name(args.output_name.as_str());
    std::fs::create_dir_all(&args.output_dir).map_err(EvalError::from)?;
    let sink = CsvResultSink::new(&args.output_dir, &args.output_name, &benchmark);
    let output_path = sink.path().to_path_buf();

    let answered = BatchRunner::new(&benchmark, Arc::new(answerer), Box::new(sink))
        .run(&policy)
        .await?;

    info!(items = answered.len(), path = %output_path.display(), "answers saved");
    for item in &answered {
        println!("{}\t{}", item.financebench_id, item.answer.replace('\n', " "));
    }
    Ok(EXIT_SUCCESS)
}
