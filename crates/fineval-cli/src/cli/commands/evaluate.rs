use super::super::args::{EvaluateArgs, OutputFormat};
use super::setup_providers;
use crate::exit_codes::{EXIT_METRIC_FAILURES, EXIT_SUCCESS};
use fineval_core::model::MetricFailure;
use fineval_core::report::{console, json};
use fineval_core::EvalError;
use fineval_metrics::build_aggregator;
use tracing::{info, warn};

pub async fn run(args: EvaluateArgs) -> anyhow::Result<i32> {
    if !args.input.is_file() {
        return Err(EvalError::InvalidArgs(format!(
            "input file not found: {}",
            args.input.display()
        ))
        .into());
    }
    let (cfg, providers) = setup_providers(&args.provider)?;
    let agg = build_aggregator(&cfg, &providers);

    let failures: Vec<MetricFailure> = if args.each {
        let table = agg.evaluate_each_from_csv(&args.input).await?;
        if let Some(out) = &args.output {
            table.save(out)?;
            info!(path = %out.display(), rows = table.len(), "scores written");
        }
        match args.format {
            OutputFormat::Text => print!("{}", console::render_scores(&table)),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&json::scores_to_json(&table))?)
            }
        }
        table.failures
    } else {
        let summary = agg.evaluate_from_csv(&args.input).await?;
        if let Some(out) = &args.output {
            summary.save(out)?;
            info!(path = %out.display(), "summary written");
        }
        match args.format {
            OutputFormat::Text => print!("{}", console::render_summary(&summary)),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&json::summary_to_json(&summary))?
            ),
        }
        summary.failures
    };

    if failures.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        for f in &failures {
            warn!(metric = %f.metric, error = %f.message, "metric failed; column reported as NaN");
        }
        Ok(EXIT_METRIC_FAILURES)
    }
}
