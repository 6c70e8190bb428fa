//! Crisis classifier.
//!
//! A pure predicate over raw message text. A message is a crisis if it
//! contains any risk phrase or matches any risk pattern. There is no
//! scoring and no negation handling: "I don't want to hurt myself" is
//! flagged. False positives are preferred to missed risk.

use crate::error::TriageError;
use crate::rules::RiskRules;
use regex::{Regex, RegexBuilder};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};

/// The outcome of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// Whether the message should take the crisis path.
    pub is_crisis: bool,
    /// The first rule that matched, e.g. `phrase:end my life`.
    pub matched_rule: Option<String>,
}

impl ClassificationResult {
    /// A non-crisis result.
    #[must_use]
    pub fn clear() -> Self {
        Self {
            is_crisis: false,
            matched_rule: None,
        }
    }

    fn matched(rule: String) -> Self {
        Self {
            is_crisis: true,
            matched_rule: Some(rule),
        }
    }
}

#[derive(Debug)]
struct CompiledPattern {
    name: String,
    regex: Regex,
}

/// Classifies messages against a compiled rule set.
///
/// Construction compiles every pattern once; classification never fails.
#[derive(Debug)]
pub struct CrisisClassifier {
    phrases: Vec<String>,
    patterns: Vec<CompiledPattern>,
}

impl CrisisClassifier {
    /// Compiles a classifier from a rule set.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPhrase` for a blank phrase (it would match every
    /// message) and `InvalidPattern` for a pattern that does not compile.
    pub fn new(rules: &RiskRules) -> Result<Self, Report<TriageError>> {
        let phrases = rules
            .phrases()
            .iter()
            .enumerate()
            .map(|(index, phrase)| {
                if phrase.trim().is_empty() {
                    Err(TriageError::EmptyPhrase { index })
                } else {
                    Ok(normalize(phrase))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let patterns = rules
            .patterns()
            .iter()
            .map(|rule| {
                RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| CompiledPattern {
                        name: rule.name.clone(),
                        regex,
                    })
                    .map_err(|e| TriageError::InvalidPattern {
                        name: rule.name.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            phrases = phrases.len(),
            patterns = patterns.len(),
            "Compiled crisis classifier"
        );

        Ok(Self { phrases, patterns })
    }

    /// Compiles the built-in rule set.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in rules themselves are invalid.
    pub fn builtin() -> Result<Self, Report<TriageError>> {
        Self::new(&RiskRules::builtin())
    }

    /// Classifies a message.
    #[must_use]
    pub fn classify(&self, text: &str) -> ClassificationResult {
        if text.is_empty() {
            return ClassificationResult::clear();
        }

        let normalized = normalize(text);

        if let Some(phrase) = self.phrases.iter().find(|p| normalized.contains(p.as_str())) {
            return ClassificationResult::matched(format!("phrase:{phrase}"));
        }

        if let Some(pattern) = self.patterns.iter().find(|p| p.regex.is_match(&normalized)) {
            return ClassificationResult::matched(format!("pattern:{}", pattern.name));
        }

        ClassificationResult::clear()
    }

    /// Returns true if the message should take the crisis path.
    #[must_use]
    pub fn is_crisis(&self, text: &str) -> bool {
        self.classify(text).is_crisis
    }
}

/// Lowercases and folds typographic apostrophes to ASCII.
fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}
