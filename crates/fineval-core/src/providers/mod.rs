pub mod embedder;
pub mod llm;

use crate::config::{EvalConfig, ProviderKind};
use crate::errors::ConfigError;
use std::sync::Arc;

/// Explicit credentials for live providers. Never read from or written to the process environment here.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub struct Providers {
    pub embedder: Arc<dyn embedder::Embedder>,
    pub llm: Arc<dyn llm::LlmClient>,
}

pub fn build_providers(
    cfg: &EvalConfig,
    creds: &ProviderCredentials,
) -> Result<Providers, ConfigError> {
    match cfg.provider {
        ProviderKind::Fake => {
            let mut client = llm::fake::FakeClient::new(cfg.judge_model.clone());
            if let Some(reply) = &cfg.fake_reply {
                client = client.with_response(reply.clone());
            }
            Ok(Providers {
                embedder: Arc::new(embedder::fake::FakeEmbedder::hashed(&cfg.embedding_model, 256)),
                llm: Arc::new(llm::tracing::TracingLlmClient::new(Arc::new(client))),
            })
        }
        ProviderKind::Openai => {
            let api_key = creds
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    ConfigError(
                        "provider 'openai' requires an API key (set OPENAI_API_KEY or pass --api-key)"
                            .into(),
                    )
                })?;
            let embedder =
                embedder::openai::OpenAIEmbedder::new(cfg.embedding_model.clone(), api_key.clone());
            let client = llm::openai::OpenAIClient::new(
                cfg.judge_model.clone(),
                api_key,
                cfg.temperature,
                cfg.max_tokens,
            );
            Ok(Providers {
                embedder: Arc::new(embedder),
                llm: Arc::new(llm::tracing::TracingLlmClient::new(Arc::new(client))),
            })
        }
    }
}
