//! Declarative risk rules.
//!
//! A rule set is plain ordered data: literal phrases checked first, then
//! named regular expressions. The order decides which rule is reported
//! when several match. The built-in set can be replaced at startup by a
//! JSON file of the same shape:
//!
//! ```json
//! {
//!   "phrases": ["kill myself", "end my life"],
//!   "patterns": [{ "name": "wanna_die", "pattern": "i wanna die" }]
//! }
//! ```

use crate::error::TriageError;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_PHRASES: &[&str] = &[
    "kill myself",
    "kill me",
    "i want to die",
    "i'm going to kill myself",
    "suicide",
    "suicidal",
    "hang myself",
    "end my life",
    "i cant go on",
    "cant go on",
    "want to die",
    "harm myself",
    "self harm",
    "cut myself",
    "hurt myself",
    "jump off",
    "i'll end it",
    "i will kill myself",
    "i'm going to hurt myself",
    "i want to hurt myself",
    "overdose",
    "no reason to live",
    "better off dead",
    "can't take it anymore",
    "everyone would be better without me",
];

const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("not_wanting_to_live", r"(?:don'?t|do not) want to (?:live|be here|exist)"),
    ("intent_to_end", r"(?:ready|want|going) to (?:end|give up)"),
    ("no_point_living", r"no (?:point|reason) (?:in|to) (?:living|going on)"),
    ("will_act_on_self", r"i will .* myself"),
    ("going_to_act_on_self", r"i'm going to .* myself"),
    ("wanna_die", r"i wanna die"),
    ("thinking_about_killing_self", r"thinking about killing myself"),
    ("has_plan_or_means", r"i have a (?:plan|means) to"),
];

/// A named regular-expression rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Rule name, reported when the pattern matches.
    pub name: String,
    /// Regular expression source, matched case-insensitively.
    pub pattern: String,
}

impl PatternRule {
    /// Creates a new pattern rule.
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// An ordered set of risk phrases and patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRules {
    /// Literal phrases, matched as case-insensitive substrings.
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Named patterns, matched case-insensitively anywhere in the text.
    #[serde(default)]
    pub patterns: Vec<PatternRule>,
}

impl RiskRules {
    /// Returns the built-in rule set.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            phrases: BUILTIN_PHRASES.iter().map(|p| (*p).to_string()).collect(),
            patterns: BUILTIN_PATTERNS
                .iter()
                .map(|(name, pattern)| PatternRule::new(*name, *pattern))
                .collect(),
        }
    }

    /// Parses a rule set from JSON.
    ///
    /// # Errors
    ///
    /// Returns `RulesMalformed` if the JSON does not describe a rule set.
    pub fn from_json(json: &str) -> Result<Self, Report<TriageError>> {
        let rules = serde_json::from_str(json).map_err(|e| TriageError::RulesMalformed {
            reason: e.to_string(),
        })?;
        Ok(rules)
    }

    /// Loads a rule set from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `RulesUnreadable` if the file cannot be read, or
    /// `RulesMalformed` if its content is not a rule set.
    pub fn load(path: &Path) -> Result<Self, Report<TriageError>> {
        let json = std::fs::read_to_string(path).map_err(|e| TriageError::RulesUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let rules = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            phrases = rules.phrases.len(),
            patterns = rules.patterns.len(),
            "Loaded risk rules"
        );
        Ok(rules)
    }

    /// Returns the phrase rules in order.
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Returns the pattern rules in order.
    #[must_use]
    pub fn patterns(&self) -> &[PatternRule] {
        &self.patterns
    }

    /// Returns the total number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len() + self.patterns.len()
    }

    /// Returns true if the set has no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
