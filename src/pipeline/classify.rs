//! Title classification into round and document type.
//!
//! Each dimension is a prioritized rule table: rules are tried in order and
//! the first match wins, falling back to a sentinel tag.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{AppError, Result};
use crate::models::{Classification, ClassifierConfig, DocTag, RoundTag, RuleConfig};

#[derive(Debug, Clone)]
struct Rule<T> {
    pattern: Regex,
    tag: T,
}

/// Ordered `(pattern, tag)` rules with a fallback tag.
#[derive(Debug, Clone)]
pub struct RuleTable<T> {
    rules: Vec<Rule<T>>,
    fallback: T,
}

impl<T: Copy + fmt::Display> RuleTable<T> {
    /// Compile rules in the given order.
    ///
    /// Each rule's fragments become one case-insensitive, whole-word
    /// alternation.
    pub fn compile(rules: &[RuleConfig<T>], fallback: T) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                if rule.patterns.is_empty() {
                    return Err(AppError::config(format!(
                        "rule '{}' has no patterns",
                        rule.tag
                    )));
                }
                let source = format!(r"\b(?:{})\b", rule.patterns.join("|"));
                let pattern = RegexBuilder::new(&source).case_insensitive(true).build()?;
                Ok(Rule {
                    pattern,
                    tag: rule.tag,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules, fallback })
    }

    /// Tag of the first matching rule.
    pub fn first_match(&self, text: &str) -> T {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(text))
            .map(|rule| rule.tag)
            .unwrap_or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Maps titles to `{round, type}`.
#[derive(Debug, Clone)]
pub struct Classifier {
    rounds: RuleTable<RoundTag>,
    types: RuleTable<DocTag>,
}

impl Classifier {
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            rounds: RuleTable::compile(&config.rounds, RoundTag::General)?,
            types: RuleTable::compile(&config.types, DocTag::Other)?,
        })
    }

    /// Classify a title. Round and type are detected independently.
    pub fn classify(&self, title: &str) -> Classification {
        Classification {
            round: self.rounds.first_match(title),
            doc_type: self.types.first_match(title),
        }
    }

    pub fn round_rules(&self) -> &RuleTable<RoundTag> {
        &self.rounds
    }

    pub fn type_rules(&self) -> &RuleTable<DocTag> {
        &self.types
    }
}
