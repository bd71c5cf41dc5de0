//! LLM Provider implementations for actloop.
//!
//! All providers implement the `actloop_core::Provider` trait. The agent loop
//! only ever talks to the trait; [`build_from_config`] picks the concrete
//! backend from configuration.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;

use actloop_config::AppConfig;
use actloop_core::{Provider, ProviderError};

/// Build the configured provider.
///
/// Fails with [`ProviderError::NotConfigured`] when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::NotConfigured(
                "no API key; set ACTLOOP_API_KEY or api_key in config.toml".into(),
            )
        })?;

    let name = provider_name(&config.api_base_url);
    let provider = OpenAiCompatProvider::new(name, &config.api_base_url, api_key)?;
    tracing::debug!(provider = name, base_url = %provider.base_url(), "Built provider");
    Ok(Arc::new(provider))
}

/// A display name inferred from the endpoint host.
fn provider_name(base_url: &str) -> &'static str {
    if base_url.contains("bigmodel.cn") {
        "zhipu"
    } else if base_url.contains("openai.com") {
        "openai"
    } else if base_url.contains("openrouter.ai") {
        "openrouter"
    } else if base_url.contains("localhost") || base_url.contains("127.0.0.1") {
        "local"
    } else {
        "openai-compatible"
    }
}
