//! LLM Client Module
//!
//! Provides a unified interface for generative text backends:
//! - `provider`: the `LLMProvider` trait and provider-level errors
//! - `types`: chat messages, requests, and responses
//! - `providers`: individual provider implementations
//!
//! Providers are schema-agnostic: nothing they return is trusted until it
//! has passed through the generation pipeline's contract validation.

pub mod provider;
pub mod providers;
pub mod types;

// Re-export commonly used types
pub use provider::{LLMError, LLMProvider, Result};
pub use types::{ChatMessage, ChatRequest, ChatResponse, MessageRole, TokenUsage};

pub use providers::{OllamaProvider, OpenAiProvider, ProviderConfig};
