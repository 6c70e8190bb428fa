//! Crisis-language triage for the solace support service.
//!
//! This crate provides:
//!
//! - **Risk Rules**: Declarative, ordered phrase and pattern data
//! - **Crisis Classifier**: A pure predicate flagging self-harm or
//!   suicide-risk language before anything reaches a model
//!
//! Classification is deliberately conservative: any single matching rule
//! flags the message, and negations are not interpreted.

pub mod classifier;
pub mod error;
pub mod rules;

pub use classifier::{ClassificationResult, CrisisClassifier};
pub use error::TriageError;
pub use rules::{PatternRule, RiskRules};
