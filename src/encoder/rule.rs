//! File name match rules.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Invalid match rule pattern.
#[derive(Debug, Error)]
#[error("invalid pattern `{pattern}`")]
pub struct RuleError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A case-insensitive regex tested against a file name.
///
/// Serialized as its source pattern.
#[derive(Clone)]
pub struct MatchRule(Regex);

impl MatchRule {
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self)
            .map_err(|source| RuleError {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Test a file name (`logo.PNG`), or the last component of a path.
    pub fn is_match(&self, name: &str) -> bool {
        self.0.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for MatchRule {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for MatchRule {}

impl fmt::Debug for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchRule({:?})", self.as_str())
    }
}

impl Serialize for MatchRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MatchRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Self::new(&pattern).map_err(serde::de::Error::custom)
    }
}
