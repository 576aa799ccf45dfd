use crate::model::LlmResponse;
use async_trait::async_trait;

pub mod fake;
pub mod openai;
pub mod tracing;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// `context` entries are sent ahead of the prompt as system-level material.
    async fn complete(
        &self,
        prompt: &str,
        context: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse>;

    fn provider_name(&self) -> &'static str;

    fn model_id(&self) -> Option<String> {
        None
    }
}
