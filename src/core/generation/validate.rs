//! Named-Rule Validation Framework
//!
//! Contract validation is a small ordered list of named predicate rules
//! evaluated in sequence with short-circuit on the first failure. Each
//! failure produces a typed violation naming the rule broken and, where
//! applicable, the offending stage or skill. Rules are pure: no I/O, and
//! the same candidate always yields the same verdict.

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Violations
// ============================================================================

/// A single failed contract check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Required fields are missing or collection lengths are wrong.
    #[error("structural rule '{rule}' violated: {message}")]
    Structural { rule: &'static str, message: String },

    /// Fields are present but break a domain rule.
    #[error("semantic rule '{rule}' violated: {message}")]
    Semantic { rule: &'static str, message: String },
}

impl Violation {
    pub fn structural(rule: &'static str, message: impl Into<String>) -> Self {
        Violation::Structural {
            rule,
            message: message.into(),
        }
    }

    pub fn semantic(rule: &'static str, message: impl Into<String>) -> Self {
        Violation::Semantic {
            rule,
            message: message.into(),
        }
    }

    /// Name of the rule that produced this violation.
    pub fn rule(&self) -> &'static str {
        match self {
            Violation::Structural { rule, .. } | Violation::Semantic { rule, .. } => rule,
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// A named predicate over a raw candidate.
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&Value) -> Result<(), Violation>,
}

/// Evaluate rules in declared order, stopping at the first violation.
pub fn check_all(rules: &[Rule], candidate: &Value) -> Result<(), Violation> {
    for rule in rules {
        (rule.check)(candidate)?;
    }
    Ok(())
}

// ============================================================================
// Field Helpers
// ============================================================================

/// Fetch a non-empty string field, or `None` if absent/blank/not a string.
pub fn non_empty_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
