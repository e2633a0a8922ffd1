//! LLM provider implementations for Coscribe.
//!
//! All providers implement the `coscribe_core::Provider` trait. The dispatch
//! loop talks to exactly one provider per session, built here from config.

use std::sync::Arc;

use coscribe_core::provider::Provider;

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

/// Build the configured provider.
///
/// The endpoint is whatever OpenAI-compatible URL the config names; the
/// provider name is inferred from it so logs read well.
pub fn build_from_config(config: &coscribe_config::AppConfig) -> Arc<dyn Provider> {
    let api_key = config.provider.api_key.clone().unwrap_or_default();
    let name = provider_name_for(&config.provider.base_url);

    Arc::new(
        OpenAiCompatProvider::new(name, &config.provider.base_url, api_key)
            .with_timeout(config.provider.timeout_secs),
    )
}

fn provider_name_for(base_url: &str) -> &'static str {
    if base_url.contains("openrouter.ai") {
        "openrouter"
    } else if base_url.contains("api.openai.com") {
        "openai"
    } else {
        "custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_openrouter() {
        let config = coscribe_config::AppConfig::default();
        let provider = build_from_config(&config);
        assert_eq!(provider.name(), "openrouter");
    }

    #[test]
    fn custom_endpoint_is_named_custom() {
        let mut config = coscribe_config::AppConfig::default();
        config.provider.base_url = "https://llm.internal.example/v1".into();
        let provider = build_from_config(&config);
        assert_eq!(provider.name(), "custom");
    }
}
