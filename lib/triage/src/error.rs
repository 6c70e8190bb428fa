//! Error types for the triage crate.
//!
//! Classification itself cannot fail. Every error here is raised while a
//! rule set is being loaded or compiled, before any message is seen.

use std::fmt;

/// Errors from loading or compiling risk rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageError {
    /// A phrase rule is empty or whitespace-only.
    EmptyPhrase { index: usize },
    /// A pattern rule failed to compile.
    InvalidPattern { name: String, reason: String },
    /// The rule file could not be read.
    RulesUnreadable { path: String, reason: String },
    /// The rule file is not valid rule JSON.
    RulesMalformed { reason: String },
}

impl fmt::Display for TriageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPhrase { index } => write!(f, "risk phrase #{index} is empty"),
            Self::InvalidPattern { name, reason } => {
                write!(f, "risk pattern '{name}' is invalid: {reason}")
            }
            Self::RulesUnreadable { path, reason } => {
                write!(f, "failed to read risk rules from {path}: {reason}")
            }
            Self::RulesMalformed { reason } => {
                write!(f, "malformed risk rules: {reason}")
            }
        }
    }
}

impl std::error::Error for TriageError {}
