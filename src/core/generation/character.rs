//! Character Description Contract
//!
//! Minimal second contract instance: the same request → generate →
//! validate → retry shape the skill-tree flow uses, applied to free-form
//! character descriptions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::pipeline::GenerationContract;
use super::validate::{check_all, non_empty_str, Rule, Violation};
use crate::core::llm::types::{ChatMessage, ChatRequest};

/// A validated character description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDescription {
    pub name: String,
    pub description: String,
}

const CHARACTER_RULES: &[Rule] = &[
    Rule {
        name: "character-name",
        check: rule_name,
    },
    Rule {
        name: "character-description",
        check: rule_description,
    },
];

fn rule_name(candidate: &Value) -> Result<(), Violation> {
    non_empty_str(candidate, "name").ok_or_else(|| {
        Violation::structural("character-name", "candidate is missing a non-empty name")
    })?;
    Ok(())
}

fn rule_description(candidate: &Value) -> Result<(), Violation> {
    non_empty_str(candidate, "description").ok_or_else(|| {
        Violation::structural(
            "character-description",
            "candidate is missing a non-empty description",
        )
    })?;
    Ok(())
}

/// Pipeline contract for character-description generation.
pub struct CharacterContract;

impl GenerationContract for CharacterContract {
    type Output = CharacterDescription;

    const ENTITY: &'static str = "character description";

    fn request(subject: &str) -> ChatRequest {
        ChatRequest::new(vec![ChatMessage::user(format!(
            "Write a short, evocative description for the character \"{subject}\"."
        ))])
        .with_system(
            "You describe fantasy game characters. Respond with a single JSON \
             object and nothing else, shaped as: {\"name\": string, \
             \"description\": string}. The description is two to four \
             sentences of prose.",
        )
        .with_temperature(0.9)
    }

    fn parse(candidate: &Value) -> Result<CharacterDescription, Violation> {
        check_all(CHARACTER_RULES, candidate)?;
        serde_json::from_value(candidate.clone())
            .map_err(|e| Violation::structural("deserialize", e.to_string()))
    }
}
