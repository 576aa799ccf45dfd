use super::LlmClient;
use crate::metrics_api::{GENERATED_ANSWER_HEADER, REFERENCE_ANSWER_HEADER};
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::collections::BTreeSet;

#[derive(Debug)]
pub struct FakeClient {
    model: String,
    fixed_response: Option<String>,
}

impl FakeClient {
    pub fn new(model: String) -> Self {
        Self {
            model,
            fixed_response: None,
        }
    }

    pub fn with_response(mut self, response: String) -> Self {
        self.fixed_response = Some(response);
        self
    }
}

fn section<'a>(prompt: &'a str, header: &str) -> Option<&'a str> {
    let start = prompt.find(header)? + header.len();
    let rest = &prompt[start..];
    let end = rest.find("\n## ").unwrap_or(rest.len());
    Some(rest[..end].trim())
}

fn words(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Grades a correctness prompt by word overlap: 1.0 for disjoint answers, 5.0 for identical ones.
fn grade(prompt: &str) -> Option<String> {
    let reference = words(section(prompt, REFERENCE_ANSWER_HEADER)?);
    let generated = words(section(prompt, GENERATED_ANSWER_HEADER)?);
    let union = reference.union(&generated).count();
    let jaccard = if union == 0 {
        1.0
    } else {
        reference.intersection(&generated).count() as f64 / union as f64
    };
    Some(format!(
        "{:.1}\nWord overlap with the reference answer is {:.2}.",
        1.0 + 4.0 * jaccard,
        jaccard
    ))
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(
        &self,
        prompt: &str,
        _context: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        let text = self
            .fixed_response
            .clone()
            .or_else(|| grade(prompt))
            .unwrap_or_else(|| format!("fake answer: {}", prompt.lines().next().unwrap_or("")));

        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
            meta: serde_json::json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_id(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grading_prompt(reference: &str, generated: &str) -> String {
        format!(
            "## User Query\nCapital?\n{}\n{}\n{}\n{}\n",
            REFERENCE_ANSWER_HEADER, reference, GENERATED_ANSWER_HEADER, generated
        )
    }

    #[tokio::test]
    async fn grades_identical_answers_at_maximum() {
        let client = FakeClient::new("fake".into());
        let resp = client
            .complete(&grading_prompt("Ho Chi Minh City", "Ho Chi Minh City"), None)
            .await
            .unwrap();
        assert!(resp.text.starts_with("5.0\n"));
    }

    #[tokio::test]
    async fn grades_disjoint_answers_at_minimum() {
        let client = FakeClient::new("fake".into());
        let resp = client
            .complete(&grading_prompt("Bangkok", "Ho Chi Minh City"), None)
            .await
            .unwrap();
        assert!(resp.text.starts_with("1.0\n"));
    }

    #[tokio::test]
    async fn fixed_response_wins() {
        let client = FakeClient::new("fake".into()).with_response("3.5\nmeh".into());
        let resp = client.complete("anything", None).await.unwrap();
        assert_eq!(resp.text, "3.5\nmeh");
        assert_eq!(resp.provider, "fake");
    }

    #[tokio::test]
    async fn non_grading_prompt_echoes_first_line() {
        let client = FakeClient::new("fake".into());
        let resp = client.complete("What was revenue?\nmore", None).await.unwrap();
        assert_eq!(resp.text, "fake answer: What was revenue?");
    }
}
