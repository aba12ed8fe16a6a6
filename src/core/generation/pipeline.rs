//! Generation Pipeline Orchestrator
//!
//! Binds a backend provider and a contract's validation rules into one
//! exposed operation per entity type. Each invocation is self-contained:
//! no caching across calls, no shared mutable state, so concurrent
//! invocations need no coordination.
//!
//! Per attempt the pipeline invokes the provider, extracts a JSON
//! candidate from the response content, and runs the contract's rules.
//! Provider failures and contract violations are both failed attempts;
//! only a candidate that passes every rule is returned.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use super::character::{CharacterContract, CharacterDescription};
use super::retry::{retry_with_policy, RetryPolicy};
use super::skill_tree::{SkillTree, SkillTreeContract};
use super::validate::Violation;
use super::{GenerationError, Result};
use crate::core::llm::types::ChatRequest;
use crate::core::llm::LLMProvider;

// ============================================================================
// Contract Trait
// ============================================================================

/// One generation flow: how to ask the backend for an entity, and how to
/// judge what came back. Parsing must be pure and deterministic.
pub trait GenerationContract {
    /// The accepted, fully validated artifact.
    type Output;

    /// Entity label used in logs.
    const ENTITY: &'static str;

    /// Build the backend request for a subject.
    fn request(subject: &str) -> ChatRequest;

    /// Validate a raw candidate and produce the typed artifact.
    fn parse(candidate: &Value) -> std::result::Result<Self::Output, Violation>;
}

// ============================================================================
// Pipeline
// ============================================================================

/// The validated generation pipeline.
pub struct GenerationPipeline {
    provider: Arc<dyn LLMProvider>,
    policy: RetryPolicy,
}

impl GenerationPipeline {
    /// Create a pipeline with the default retry policy (3 attempts,
    /// 1-second backoff unit).
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Generate and validate one entity for `subject`.
    pub async fn generate<C: GenerationContract>(&self, subject: &str) -> Result<C::Output> {
        self.generate_inner::<C>(subject, None).await
    }

    /// Like [`generate`](Self::generate), but aborts with
    /// [`GenerationError::Canceled`] when the signal fires — whether the
    /// pipeline is waiting on the backend or on a backoff delay.
    pub async fn generate_with_cancel<C: GenerationContract>(
        &self,
        subject: &str,
        cancel: watch::Receiver<bool>,
    ) -> Result<C::Output> {
        self.generate_inner::<C>(subject, Some(cancel)).await
    }

    /// Generate a skill tree for a character class.
    pub async fn generate_skill_tree(&self, class_name: &str) -> Result<SkillTree> {
        self.generate::<SkillTreeContract>(class_name).await
    }

    /// Generate a character description.
    pub async fn generate_character_description(
        &self,
        character_name: &str,
    ) -> Result<CharacterDescription> {
        self.generate::<CharacterContract>(character_name).await
    }

    async fn generate_inner<C: GenerationContract>(
        &self,
        subject: &str,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<C::Output> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(GenerationError::Structural {
                rule: "subject",
                message: "subject name must be non-empty".to_string(),
            });
        }

        let request_id = uuid::Uuid::new_v4();
        log::info!(
            "Generating {} for '{subject}' (request {request_id})",
            C::ENTITY
        );

        let provider = Arc::clone(&self.provider);
        retry_with_policy(&self.policy, subject, cancel, move |attempt| {
            let provider = Arc::clone(&provider);
            async move {
                log::debug!(
                    "Request {request_id}: attempt {attempt} via provider '{}'",
                    provider.id()
                );

                let response = provider.chat(C::request(subject)).await?;
                let candidate = extract_json(&response.content)?;
                Ok(C::parse(&candidate)?)
            }
        })
        .await
    }
}

// ============================================================================
// Candidate Extraction
// ============================================================================

/// Pull a JSON candidate out of raw response content.
///
/// Models frequently wrap JSON in markdown fences or surround it with
/// prose; tolerate both. Content with no parseable JSON object is a
/// structural failure — the backend responded, but not with a candidate.
fn extract_json(content: &str) -> Result<Value> {
    let trimmed = content.trim();

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.strip_suffix("```").unwrap_or(s).trim())
        .unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str(unfenced) {
        return Ok(value);
    }

    // Fall back to the outermost braced span.
    if let (Some(start), Some(end)) = (unfenced.find('{'), unfenced.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&unfenced[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(GenerationError::Structural {
        rule: "candidate-json",
        message: "response content is not parseable JSON".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_json() {
        let value = extract_json("{\"className\": \"Mage\"}").unwrap();
        assert_eq!(value["className"], "Mage");
    }

    #[test]
    fn test_extract_fenced_json() {
        let content = "```json\n{\"className\": \"Mage\"}\n```";
        let value = extract_json(content).unwrap();
        assert_eq!(value["className"], "Mage");
    }

    #[test]
    fn test_extract_json_surrounded_by_prose() {
        let content = "Here is your skill tree:\n{\"className\": \"Mage\"}\nEnjoy!";
        let value = extract_json(content).unwrap();
        assert_eq!(value["className"], "Mage");
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Structural {
                rule: "candidate-json",
                ..
            }
        ));
    }
}
