use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::generation::retry::RetryPolicy;
use crate::core::llm::providers::ProviderConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationSettings,
    pub llm: LlmSettings,
}

/// Retry and backoff settings for the generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Maximum attempts per generation request.
    pub max_attempts: u32,
    /// Backoff unit in milliseconds; the delay before attempt N+1 is
    /// `backoff_ms * N`.
    pub backoff_ms: u64,
    /// Per-request timeout for backend calls, in seconds.
    pub request_timeout_secs: u64,
}

/// Backend provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider ID: "ollama" or "openai".
    pub provider: String,
    /// Model name passed to the provider.
    pub model: String,
    /// Host URL for local providers (Ollama).
    pub host: String,
    /// API key for hosted providers.
    pub api_key: Option<String>,
    /// Override base URL for OpenAI-compatible endpoints.
    pub base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 1000,
            request_timeout_secs: 120,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            host: "http://localhost:11434".to_string(),
            api_key: None,
            base_url: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/skillforge/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} — using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {} — using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Retry policy derived from the generation settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.generation.max_attempts,
            Duration::from_millis(self.generation.backoff_ms),
        )
    }

    /// Request timeout for backend HTTP clients.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.request_timeout_secs)
    }

    /// Provider configuration derived from the LLM settings.
    pub fn provider_config(&self) -> ProviderConfig {
        match self.llm.provider.as_str() {
            "openai" => ProviderConfig::OpenAi {
                api_key: self.llm.api_key.clone().unwrap_or_default(),
                model: self.llm.model.clone(),
                base_url: self.llm.base_url.clone(),
            },
            _ => ProviderConfig::Ollama {
                host: self.llm.host.clone(),
                model: self.llm.model.clone(),
            },
        }
    }

    fn config_path() -> std::path::PathBuf {
        dirs::config_dir()
            .map(|d| d.join("skillforge").join("config.toml"))
            .unwrap_or_else(|| std::path::PathBuf::from("config.toml"))
    }
}
