use crate::batch::answer::AnswerFn;
use crate::batch::benchmark::{BatchPolicy, Benchmark};
use crate::batch::sink::ResultSink;
use crate::errors::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredItem {
    pub financebench_id: String,
    pub answer: String,
}

pub struct BatchRunner<'a> {
    benchmark: &'a Benchmark,
    answer_fn: Arc<dyn AnswerFn>,
    sink: Box<dyn ResultSink + 'a>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        benchmark: &'a Benchmark,
        answer_fn: Arc<dyn AnswerFn>,
        sink: Box<dyn ResultSink + 'a>,
    ) -> Self {
        Self {
            benchmark,
            answer_fn,
            sink,
        }
    }

    /// Answers the selected items one after another, persisting each answer as it arrives.
    pub async fn run(&mut self, policy: &BatchPolicy) -> Result<Vec<AnsweredItem>> {
        let items = policy.select(self.benchmark)?;
        let output_name = self.answer_fn.output_name().to_string();
        info!(items = items.len(), output = %output_name, "batch started");

        let mut answered = Vec::with_capacity(items.len());
        for (done, item) in items.into_iter().enumerate() {
            let answer = self
                .answer_fn
                .answer(item)
                .await
                .map_err(|e| EvalError::AnswerFailed {
                    id: item.financebench_id.clone(),
                    message: format!("{:#}", e),
                })?;
            info!(
                progress = done + 1,
                id = %item.financebench_id,
                doc = %item.doc_name,
                question = %item.question,
                output = %output_name,
                answer = %answer,
                "answered"
            );
            self.sink.record(item, &answer)?;
            answered.push(AnsweredItem {
                financebench_id: item.financebench_id.clone(),
                answer,
            });
        }
        Ok(answered)
    }
}
