//! Skill Tree Contract
//!
//! Data model and validation rules for character-class skill trees: five
//! progression stages (stage 0 is the unspecialized tier), one to three
//! skills per later stage, optional numeric mana/stamina costs.
//!
//! The rules run in declared order against the raw candidate; only a
//! candidate that passes them all is deserialized into a [`SkillTree`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::pipeline::GenerationContract;
use super::validate::{check_all, non_empty_str, Rule, Violation};
use crate::core::llm::types::{ChatMessage, ChatRequest};

/// Number of progression stages in every tree.
pub const STAGE_COUNT: usize = 5;

/// Skill count bounds for stages above 0.
pub const MIN_SKILLS_PER_STAGE: usize = 1;
pub const MAX_SKILLS_PER_STAGE: usize = 3;

// ============================================================================
// Types
// ============================================================================

/// A fully validated skill tree. Immutable once accepted; a new request
/// produces an independent instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTree {
    pub class_name: String,
    /// Exactly five stages, sorted ascending by stage number.
    pub stages: Vec<Stage>,
}

/// One progression tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage: u8,
    pub stage_name: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// An unlockable ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamina_cost: Option<f64>,
}

// ============================================================================
// Validation Rules
// ============================================================================

/// Ordered rule set for skill-tree candidates.
pub const SKILL_TREE_RULES: &[Rule] = &[
    Rule {
        name: "class-name",
        check: rule_class_name,
    },
    Rule {
        name: "stage-count",
        check: rule_stage_count,
    },
    Rule {
        name: "stage-fields",
        check: rule_stage_fields,
    },
    Rule {
        name: "stage-zero-skills",
        check: rule_stage_zero_skills,
    },
    Rule {
        name: "stage-skill-count",
        check: rule_stage_skill_counts,
    },
    Rule {
        name: "skill-fields",
        check: rule_skill_fields,
    },
    Rule {
        name: "stage-zero-guard",
        check: rule_stage_zero_guard,
    },
];

fn stages_of(candidate: &Value) -> Result<&Vec<Value>, Violation> {
    candidate
        .get("stages")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Violation::structural("stage-count", "stages is missing or not an array"))
}

fn stage_number(stage: &Value) -> Option<i64> {
    stage.get("stage").and_then(|v| v.as_i64())
}

fn rule_class_name(candidate: &Value) -> Result<(), Violation> {
    non_empty_str(candidate, "className").ok_or_else(|| {
        Violation::structural("class-name", "candidate is missing a non-empty className")
    })?;
    Ok(())
}

fn rule_stage_count(candidate: &Value) -> Result<(), Violation> {
    let stages = stages_of(candidate)?;
    if stages.len() != STAGE_COUNT {
        return Err(Violation::structural(
            "stage-count",
            format!(
                "expected exactly {STAGE_COUNT} stages, found {}",
                stages.len()
            ),
        ));
    }
    Ok(())
}

fn rule_stage_fields(candidate: &Value) -> Result<(), Violation> {
    for (idx, stage) in stages_of(candidate)?.iter().enumerate() {
        let number = stage_number(stage).ok_or_else(|| {
            Violation::structural(
                "stage-fields",
                format!("stage at index {idx} is missing an integer stage number"),
            )
        })?;

        if !(0..STAGE_COUNT as i64).contains(&number) {
            return Err(Violation::semantic(
                "stage-fields",
                format!(
                    "stage at index {idx} has stage number {number}, expected 0..={}",
                    STAGE_COUNT - 1
                ),
            ));
        }

        non_empty_str(stage, "stageName").ok_or_else(|| {
            Violation::structural(
                "stage-fields",
                format!("stage {number} is missing a non-empty stageName"),
            )
        })?;
    }
    Ok(())
}

fn rule_stage_zero_skills(candidate: &Value) -> Result<(), Violation> {
    for stage in stages_of(candidate)? {
        if stage_number(stage) != Some(0) {
            continue;
        }

        let skills = stage.get("skills").and_then(|v| v.as_array()).ok_or_else(
            || Violation::structural("stage-zero-skills", "stage 0 is missing its skills array"),
        )?;

        if !skills.is_empty() {
            return Err(Violation::semantic(
                "stage-zero-skills",
                format!("stage 0 must have no skills, found {}", skills.len()),
            ));
        }
    }
    Ok(())
}

fn rule_stage_skill_counts(candidate: &Value) -> Result<(), Violation> {
    for stage in stages_of(candidate)? {
        let number = match stage_number(stage) {
            Some(n) if n > 0 => n,
            _ => continue,
        };

        let skills = stage
            .get("skills")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                Violation::structural(
                    "stage-skill-count",
                    format!("stage {number} is missing its skills array"),
                )
            })?;

        if !(MIN_SKILLS_PER_STAGE..=MAX_SKILLS_PER_STAGE).contains(&skills.len()) {
            return Err(Violation::semantic(
                "stage-skill-count",
                format!(
                    "stage {number} must have between {MIN_SKILLS_PER_STAGE} and \
                     {MAX_SKILLS_PER_STAGE} skills, found {}",
                    skills.len()
                ),
            ));
        }
    }
    Ok(())
}

fn rule_skill_fields(candidate: &Value) -> Result<(), Violation> {
    for stage in stages_of(candidate)? {
        let number = match stage_number(stage) {
            Some(n) if n > 0 => n,
            _ => continue,
        };

        let skills = match stage.get("skills").and_then(|v| v.as_array()) {
            Some(skills) => skills,
            None => continue, // reported by stage-skill-count
        };

        let mut seen_names: HashSet<&str> = HashSet::new();

        for (idx, skill) in skills.iter().enumerate() {
            let name = non_empty_str(skill, "name").ok_or_else(|| {
                Violation::structural(
                    "skill-fields",
                    format!("skill at index {idx} in stage {number} is missing a non-empty name"),
                )
            })?;

            non_empty_str(skill, "description").ok_or_else(|| {
                Violation::structural(
                    "skill-fields",
                    format!("skill '{name}' in stage {number} is missing a non-empty description"),
                )
            })?;

            if !seen_names.insert(name) {
                return Err(Violation::semantic(
                    "skill-fields",
                    format!("stage {number} has a duplicate skill name '{name}'"),
                ));
            }

            for cost_field in ["manaCost", "staminaCost"] {
                let cost = match skill.get(cost_field) {
                    Some(v) if !v.is_null() => v,
                    _ => continue,
                };

                let cost = cost.as_f64().ok_or_else(|| {
                    Violation::semantic(
                        "skill-fields",
                        format!("skill '{name}' in stage {number} has a non-numeric {cost_field}"),
                    )
                })?;

                if cost < 0.0 {
                    return Err(Violation::semantic(
                        "skill-fields",
                        format!("skill '{name}' in stage {number} has a negative {cost_field}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Final structural guard against reordering and duplicate-stage anomalies
/// that per-item checks cannot see.
fn rule_stage_zero_guard(candidate: &Value) -> Result<(), Violation> {
    let stages = stages_of(candidate)?;

    let mut seen_numbers: HashSet<i64> = HashSet::new();
    for stage in stages {
        if let Some(number) = stage_number(stage) {
            if !seen_numbers.insert(number) {
                return Err(Violation::semantic(
                    "stage-zero-guard",
                    format!("duplicate stage number {number}"),
                ));
            }
        }
    }

    let stage_zero = stages
        .iter()
        .find(|s| stage_number(s) == Some(0))
        .ok_or_else(|| Violation::semantic("stage-zero-guard", "no stage numbered 0 present"))?;

    if non_empty_str(stage_zero, "stageName").is_none() {
        return Err(Violation::semantic(
            "stage-zero-guard",
            "stage 0 has an empty stageName",
        ));
    }

    let empty = stage_zero
        .get("skills")
        .and_then(|v| v.as_array())
        .map(|s| s.is_empty())
        .unwrap_or(false);
    if !empty {
        return Err(Violation::semantic(
            "stage-zero-guard",
            "stage 0 must exist with an empty skill list",
        ));
    }

    Ok(())
}

// ============================================================================
// Parsing
// ============================================================================

/// Validate a raw candidate and, on acceptance, deserialize it into a
/// [`SkillTree`] with stages sorted ascending. Pure and deterministic:
/// re-validating an accepted candidate yields acceptance again.
pub fn parse_skill_tree(candidate: &Value) -> Result<SkillTree, Violation> {
    check_all(SKILL_TREE_RULES, candidate)?;

    let mut tree: SkillTree = serde_json::from_value(candidate.clone())
        .map_err(|e| Violation::structural("deserialize", e.to_string()))?;
    tree.stages.sort_by_key(|s| s.stage);
    Ok(tree)
}

// ============================================================================
// Contract
// ============================================================================

/// Pipeline contract for skill-tree generation.
pub struct SkillTreeContract;

impl GenerationContract for SkillTreeContract {
    type Output = SkillTree;

    const ENTITY: &'static str = "skill tree";

    fn request(subject: &str) -> ChatRequest {
        let system = format!(
            "You design skill trees for a fantasy role-playing game. \
             Respond with a single JSON object and nothing else, shaped as: \
             {{\"className\": string, \"stages\": [{{\"stage\": integer, \
             \"stageName\": string, \"skills\": [{{\"name\": string, \
             \"description\": string, \"manaCost\": number?, \
             \"staminaCost\": number?}}]}}]}}. \
             There must be exactly {STAGE_COUNT} stages numbered 0 through {}. \
             Stage 0 is the unspecialized tier and must have an empty skills \
             array; every other stage has {MIN_SKILLS_PER_STAGE} to \
             {MAX_SKILLS_PER_STAGE} skills with unique names.",
            STAGE_COUNT - 1
        );

        ChatRequest::new(vec![ChatMessage::user(format!(
            "Generate the full skill tree for the character class \"{subject}\"."
        ))])
        .with_system(system)
        .with_temperature(0.8)
    }

    fn parse(candidate: &Value) -> Result<SkillTree, Violation> {
        parse_skill_tree(candidate)
    }
}

// ============================================================================
// Tests
// ============================================================================
