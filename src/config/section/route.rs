//! `encode_to` routing overrides.
//!
//! Force an encoder for file names matching a pattern, bypassing
//! auto-matching. The first matching rule wins.
//!
//! ```toml
//! encode_to = [
//!     { from = "\\.png$", to = "webp" },
//!     { from = "^hero-", to = "avif" },
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::encoder::{EncoderId, MatchRule, RuleError};

const FIELD: FieldPath = FieldPath::new("encode_to");

/// Routing rule as written in the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// File name pattern.
    pub from: String,
    /// Target encoder.
    pub to: EncoderId,
}

/// Compiled routing rule.
#[derive(Debug, Clone)]
pub struct Route {
    pub rule: MatchRule,
    pub target: EncoderId,
}

impl RouteRule {
    /// Parse a CLI value: `PATTERN=ENCODER`.
    pub fn parse(value: &str) -> Result<Self, String> {
        let (from, to) = value
            .rsplit_once('=')
            .ok_or_else(|| format!("expected PATTERN=ENCODER, got `{value}`"))?;
        let to = EncoderId::parse(to).ok_or_else(|| format!("unknown encoder `{to}`"))?;
        Ok(Self {
            from: from.to_string(),
            to,
        })
    }

    pub fn compile(&self) -> Result<Route, RuleError> {
        Ok(Route {
            rule: MatchRule::new(&self.from)?,
            target: self.to,
        })
    }

    pub fn compile_all(rules: &[Self]) -> Result<Vec<Route>, RuleError> {
        rules.iter().map(Self::compile).collect()
    }

    pub fn validate_all(rules: &[Self], diag: &mut ConfigDiagnostics) {
        for (idx, rule) in rules.iter().enumerate() {
            if let Err(e) = MatchRule::new(&rule.from) {
                diag.error(FIELD, format!("[{idx}] {}", e.source));
            }
        }
    }
}

/// First route whose pattern matches `name`.
pub fn route_for(routes: &[Route], name: &str) -> Option<EncoderId> {
    routes
        .iter()
        .find(|route| route.rule.is_match(name))
        .map(|route| route.target)
}
