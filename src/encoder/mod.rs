//! Encoder identities, match rules and the per-run registry.
//!
//! ```text
//! encoder/
//! ├── rule.rs       # MatchRule (case-insensitive file name regex)
//! ├── defaults.rs   # default parameter tables
//! └── registry.rs   # EncoderSpec + Registry (defaults ⊕ overrides)
//! ```

mod defaults;
mod registry;
mod rule;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use registry::{EncoderSpec, Registry};
pub use rule::{MatchRule, RuleError};

/// Tunable encoder parameters (`name -> value`).
///
/// Equality is key-order independent, which is what snapshot comparison needs.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// One of the supported codecs.
///
/// Declaration order is registration order: auto-matching scans identities
/// in this order and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderId {
    Mozjpeg,
    Webp,
    Avif,
    Jxl,
    Wp2,
    Oxipng,
}

impl EncoderId {
    /// All identities in registration order.
    pub const ALL: [Self; 6] = [
        Self::Mozjpeg,
        Self::Webp,
        Self::Avif,
        Self::Jxl,
        Self::Wp2,
        Self::Oxipng,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mozjpeg => "mozjpeg",
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Jxl => "jxl",
            Self::Wp2 => "wp2",
            Self::Oxipng => "oxipng",
        }
    }

    /// Parse an identity name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for EncoderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
