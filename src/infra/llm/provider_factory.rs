use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::{AppConfig, LlmError, ProviderConfig, ProviderKind};

use super::{LlmProvider, OllamaProvider, OpenAiCompatibleProvider};

/// Resolves a provider identifier, falling back to the local-generation backend
/// when the identifier is not recognized.
pub fn resolve_provider_kind(provider_id: &str) -> ProviderKind {
    ProviderKind::parse(provider_id).unwrap_or_else(|| {
        warn!(
            provider_id,
            fallback = ProviderKind::Ollama.id(),
            "unknown AI provider; falling back to local generation"
        );
        ProviderKind::Ollama
    })
}

/// Builds the provider selected by `config.ai_provider`.
pub fn create_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let kind = resolve_provider_kind(&config.ai_provider);
    create_provider_for(&config.provider_config(kind), config.llm_timeout())
}

pub fn create_provider_for(
    provider_config: &ProviderConfig,
    timeout: Duration,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let kind = provider_config.provider;
    info!(
        provider = kind.id(),
        endpoint = %provider_config.endpoint_url,
        model = %provider_config.model_name,
        has_api_key = provider_config.api_key.is_some(),
        timeout_secs = timeout.as_secs(),
        "creating AI provider"
    );

    let provider: Arc<dyn LlmProvider> = match kind {
        ProviderKind::Ollama => Arc::new(OllamaProvider::with_config(
            provider_config.endpoint_url.clone(),
            provider_config.model_name.clone(),
            timeout,
        )?),
        ProviderKind::Qianwen | ProviderKind::OpenAi | ProviderKind::DeepSeek => Arc::new(
            OpenAiCompatibleProvider::from_provider_config(provider_config, timeout)?,
        ),
    };
    Ok(provider)
}
