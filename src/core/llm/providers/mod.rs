//! LLM Provider Implementations
//!
//! Concrete implementations of the `LLMProvider` trait.
//!
//! Adding a new provider requires:
//! 1. A new enum variant in `ProviderConfig`
//! 2. The provider implementation file

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;
use std::time::Duration;

use super::provider::LLMProvider;

/// Default per-request timeout for backend HTTP clients.
///
/// A hanging backend surfaces as a provider-level timeout, which the
/// pipeline treats as a failed attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for creating providers
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum ProviderConfig {
    Ollama {
        host: String,
        model: String,
    },
    OpenAi {
        api_key: String,
        model: String,
        base_url: Option<String>,
    },
}

impl ProviderConfig {
    /// Stable ID of the provider this configuration creates.
    pub fn provider_id(&self) -> &'static str {
        match self {
            ProviderConfig::Ollama { .. } => "ollama",
            ProviderConfig::OpenAi { .. } => "openai",
        }
    }

    /// Instantiate the provider with the default request timeout.
    pub fn create_provider(&self) -> Arc<dyn LLMProvider> {
        self.create_provider_with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Instantiate the provider with an explicit request timeout.
    pub fn create_provider_with_timeout(&self, timeout: Duration) -> Arc<dyn LLMProvider> {
        match self {
            ProviderConfig::Ollama { host, model } => {
                Arc::new(OllamaProvider::new(host.clone(), model.clone(), timeout))
            }
            ProviderConfig::OpenAi {
                api_key,
                model,
                base_url,
            } => Arc::new(OpenAiProvider::new(
                api_key.clone(),
                model.clone(),
                base_url.clone(),
                timeout,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_ids() {
        let config = ProviderConfig::Ollama {
            host: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        };
        assert_eq!(config.provider_id(), "ollama");
        assert_eq!(config.create_provider().id(), "ollama");

        let config = ProviderConfig::OpenAi {
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
            base_url: None,
        };
        assert_eq!(config.provider_id(), "openai");
        assert_eq!(config.create_provider().id(), "openai");
    }
}
