use std::sync::Arc;

use async_trait::async_trait;
use fineval_core::config::DEFAULT_CORRECTNESS_THRESHOLD;
use fineval_core::metrics_api::{
    CorrectnessScorer, EvalScore, GENERATED_ANSWER_HEADER, REFERENCE_ANSWER_HEADER,
    USER_QUERY_HEADER,
};
use fineval_core::providers::llm::LlmClient;
use tracing::debug;

const JUDGE_INSTRUCTIONS: &str = "\
You are an expert evaluation system for a question answering chatbot.

You are given a user query, a reference answer and a generated answer. \
Judge the relevance and correctness of the generated answer and output a single \
score between 1 and 5, where 1 is the worst and 5 is the best.

Output the score alone on the first line. On the following lines, give the \
reasoning for the score.

- If the generated answer is not relevant to the user query, give a score of 1.
- If the generated answer is relevant but contains mistakes, give a score between 2 and 3.
- If the generated answer is relevant and fully correct, give a score between 4 and 5.";

pub fn build_prompt(query: &str, response: &str, reference: &str) -> String {
    format!(
        "{USER_QUERY_HEADER}\n{query}\n\n{REFERENCE_ANSWER_HEADER}\n{reference}\n\n{GENERATED_ANSWER_HEADER}\n{response}\n"
    )
}

/// First line is the score, the remainder is free-text reasoning.
pub fn parse_judgement(text: &str) -> anyhow::Result<(f64, String)> {
    let text = text.trim();
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    let score: f64 = first
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("unparseable correctness score: {:?}", first.trim()))?;
    if !score.is_finite() {
        anyhow::bail!("unparseable correctness score: {:?}", first.trim());
    }
    Ok((score, rest.trim().to_string()))
}

/// LLM-as-judge correctness on a 1 to 5 scale.
pub struct LlmCorrectnessScorer {
    llm: Arc<dyn LlmClient>,
    threshold: f64,
}

impl LlmCorrectnessScorer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            threshold: DEFAULT_CORRECTNESS_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

#[async_trait]
impl CorrectnessScorer for LlmCorrectnessScorer {
    fn name(&self) -> &'static str {
        "correctness"
    }

    async fn correctness_score(
        &self,
        query: &str,
        response: &str,
        reference: &str,
    ) -> anyhow::Result<EvalScore> {
        let prompt = build_prompt(query, response, reference);
        let context = [JUDGE_INSTRUCTIONS.to_string()];
        let resp = self.llm.complete(&prompt, Some(&context)).await?;
        let (score, reasoning) = parse_judgement(&resp.text)?;
        debug!(model = %resp.model, score, "correctness judged");
        Ok(EvalScore::new(score)
            .with_passing(score >= self.threshold)
            .with_feedback(reasoning))
    }
}
