//! LLM Provider Trait
//!
//! The `LLMProvider` trait is the seam between the generation pipeline and
//! any concrete backend. Implementations must be safe for concurrent use;
//! the pipeline may have several invocations in flight against one provider.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{ChatRequest, ChatResponse};

// ============================================================================
// Error Types
// ============================================================================

/// Provider-level errors: the backend failed to produce any usable response.
///
/// These are distinct from contract violations — a provider error means the
/// backend did not respond usefully, not that it responded with bad content.
#[derive(Error, Debug)]
pub enum LLMError {
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid response envelope: {0}")]
    InvalidResponse(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Authentication failed: {0}")]
    AuthError(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

// ============================================================================
// Provider Trait
// ============================================================================

/// A generative text backend.
///
/// No implementation guarantees schema conformance; every response must
/// pass through contract validation before use.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Stable provider ID (e.g. "ollama", "openai")
    fn id(&self) -> &str;

    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Model this provider instance targets
    fn model(&self) -> &str;

    /// Cheap liveness/configuration check
    async fn health_check(&self) -> bool;

    /// Send a chat completion request
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_the_failure() {
        let err = LLMError::ApiError {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));

        let err = LLMError::Timeout;
        assert!(err.to_string().contains("timed out"));
    }
}
