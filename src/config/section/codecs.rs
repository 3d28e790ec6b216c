//! `[codecs.<encoder>]` parameter overrides.
//!
//! Each table is shallow-merged onto the encoder's defaults. The special
//! `extension` key replaces the encoder's file name pattern.
//!
//! ```toml
//! [codecs.mozjpeg]
//! quality = 82
//!
//! [codecs.oxipng]
//! level = 4
//! extension = "\\.(png|apng)$"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::encoder::{EncoderId, MatchRule, Params};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecsConfig {
    pub mozjpeg: Option<Params>,
    pub webp: Option<Params>,
    pub avif: Option<Params>,
    pub jxl: Option<Params>,
    pub wp2: Option<Params>,
    pub oxipng: Option<Params>,
}

impl CodecsConfig {
    const FIELD: FieldPath = FieldPath::new("codecs");

    pub fn get(&self, id: EncoderId) -> Option<&Params> {
        match id {
            EncoderId::Mozjpeg => self.mozjpeg.as_ref(),
            EncoderId::Webp => self.webp.as_ref(),
            EncoderId::Avif => self.avif.as_ref(),
            EncoderId::Jxl => self.jxl.as_ref(),
            EncoderId::Wp2 => self.wp2.as_ref(),
            EncoderId::Oxipng => self.oxipng.as_ref(),
        }
    }

    /// Configured overrides in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (EncoderId, &Params)> {
        EncoderId::ALL
            .into_iter()
            .filter_map(|id| self.get(id).map(|params| (id, params)))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (id, params) in self.iter() {
            let Some(extension) = params.get("extension") else {
                continue;
            };
            match extension.as_str() {
                Some(pattern) => {
                    if let Err(e) = MatchRule::new(pattern) {
                        diag.error(Self::FIELD, format!("{id}.extension: {}", e.source));
                    }
                }
                None => diag.error_with_hint(
                    Self::FIELD,
                    format!("{id}.extension must be a string"),
                    r#"e.g. extension = "\\.png$""#,
                ),
            }
        }
    }
}
