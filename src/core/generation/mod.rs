//! Validated Generation Pipeline
//!
//! Turns schema-agnostic backend output into contract-guaranteed game
//! content. Every generation flow follows the same shape:
//!
//! ```text
//! request → generate → validate → retry-or-return
//! ```
//!
//! # Module Structure
//!
//! - `pipeline`: the orchestrator and the `GenerationContract` trait
//! - `retry`: bounded-retry combinator with increasing backoff
//! - `validate`: named-rule validation framework
//! - `skill_tree`: skill-tree data model and contract
//! - `character`: character-description contract
//!
//! # Error Classes
//!
//! Provider, structural, and semantic failures are recovered locally by
//! retrying; only [`GenerationError::ExhaustedRetries`] and
//! [`GenerationError::Canceled`] cross the pipeline boundary.

pub mod character;
pub mod pipeline;
pub mod retry;
pub mod skill_tree;
pub mod validate;


pub use character::CharacterDescription;
pub use pipeline::{GenerationContract, GenerationPipeline};
pub use retry::RetryPolicy;
pub use skill_tree::{Skill, SkillTree, Stage};
pub use validate::Violation;

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by the generation pipeline.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The backend failed to produce any response (transport, timeout,
    /// malformed envelope). Retryable.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The response is missing required fields, has wrong collection
    /// lengths, or is not parseable JSON. Retryable.
    #[error("Structural violation [{rule}]: {message}")]
    Structural { rule: &'static str, message: String },

    /// The response is structurally present but violates domain rules.
    /// Retryable.
    #[error("Semantic violation [{rule}]: {message}")]
    Semantic { rule: &'static str, message: String },

    /// Terminal: the attempt budget was spent with no accepted candidate.
    #[error("Generation for '{subject}' failed after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        subject: String,
        attempts: u32,
        last_error: String,
    },

    /// Terminal: the cancellation signal fired mid-invocation.
    #[error("Generation canceled")]
    Canceled,
}

impl GenerationError {
    /// Whether the pipeline may recover from this error by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Provider(_)
                | GenerationError::Structural { .. }
                | GenerationError::Semantic { .. }
        )
    }
}

impl From<crate::core::llm::LLMError> for GenerationError {
    fn from(e: crate::core::llm::LLMError) -> Self {
        GenerationError::Provider(e.to_string())
    }
}

impl From<Violation> for GenerationError {
    fn from(v: Violation) -> Self {
        match v {
            Violation::Structural { rule, message } => {
                GenerationError::Structural { rule, message }
            }
            Violation::Semantic { rule, message } => GenerationError::Semantic { rule, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
