pub mod answer;
pub mod dispatch;
pub mod evaluate;

pub use dispatch::dispatch;

use super::args::ProviderArgs;
use fineval_core::config::{load_config_or_default, EvalConfig};
use fineval_core::providers::{build_providers, ProviderCredentials, Providers};

/// Loads the config and constructs providers with explicitly passed credentials.
pub(crate) fn setup_providers(args: &ProviderArgs) -> anyhow::Result<(EvalConfig, Providers)> {
    let cfg = load_config_or_default(args.config.as_deref())?;
    let creds = ProviderCredentials {
        api_key: args.api_key.clone(),
    };
    let providers = build_providers(&cfg, &creds)?;
    tracing::debug!(
        provider = ?cfg.provider,
        embedding_model = %providers.embedder.model_id(),
        judge = providers.llm.provider_name(),
        "providers ready"
    );
    Ok((cfg, providers))
}
