//! `include_dirs` configuration.
//!
//! Extra directories whose images are processed too. Two forms:
//! - **in place**: files are replaced where they are
//! - **remap**: encoded files land in `to/{basename}`
//!
//! # Example
//!
//! ```toml
//! include_dirs = [
//!     "static/img",                              # replaced in place
//!     { from = "./public", to = "./compressed" }, # public/logo.png → compressed/logo.png
//! ]
//! ```
//!
//! In-place entries overwrite the original files.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

const FIELD: FieldPath = FieldPath::new("include_dirs");

// ============================================================================
// Include Entry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncludeEntry {
    /// Directory processed in place.
    Simple(PathBuf),
    /// Directory whose outputs go to another root.
    Remap {
        /// Source directory (relative to project root).
        from: PathBuf,
        /// Destination root; files keep only their base name.
        to: PathBuf,
    },
}

impl IncludeEntry {
    /// Get source directory path.
    pub fn source(&self) -> &Path {
        match self {
            Self::Simple(p) => p,
            Self::Remap { from, .. } => from,
        }
    }

    /// Destination root, `None` for in-place entries.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::Simple(_) => None,
            Self::Remap { to, .. } => Some(to),
        }
    }

    /// Parse a CLI value: `DIR` or `FROM=TO`.
    pub fn parse(value: &str) -> Self {
        match value.split_once('=') {
            Some((from, to)) if !from.is_empty() && !to.is_empty() => Self::Remap {
                from: from.into(),
                to: to.into(),
            },
            _ => Self::Simple(value.into()),
        }
    }

    /// Normalize paths relative to root directory.
    pub fn normalize(&mut self, root: &Path) {
        use crate::utils::path::resolve_path;

        match self {
            Self::Simple(p) => *p = resolve_path(p, root),
            Self::Remap { from, to } => {
                *from = resolve_path(from, root);
                *to = resolve_path(to, root);
            }
        }
    }

    // ========================================================================
    // Validation (Post-normalization)
    // ========================================================================

    /// Validate all include entries.
    ///
    /// Checks:
    /// - sources are directories when they exist
    /// - the same source is not listed twice
    pub fn validate_all(entries: &[Self], diag: &mut ConfigDiagnostics) {
        let mut seen: FxHashMap<&Path, usize> = FxHashMap::default();

        for (idx, entry) in entries.iter().enumerate() {
            let source = entry.source();

            if source.exists() && !source.is_dir() {
                diag.error(
                    FIELD,
                    format!("[{idx}] '{}' must be a directory", source.display()),
                );
            }

            if let Some(prev) = seen.insert(source, idx) {
                diag.warn(
                    FIELD,
                    format!(
                        "[{idx}] '{}' already listed at [{prev}], its files are processed twice",
                        source.display()
                    ),
                );
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        include_dirs: Vec<IncludeEntry>,
    }

    #[test]
    fn test_both_forms_deserialize() {
        let toml = r#"include_dirs = ["extra", { from = "./public", to = "./compressed" }]"#;
        let wrapper: Wrapper = toml::from_str(toml).unwrap();

        assert_eq!(wrapper.include_dirs[0], IncludeEntry::Simple("extra".into()));
        assert_eq!(wrapper.include_dirs[1].source(), Path::new("./public"));
        assert_eq!(
            wrapper.include_dirs[1].destination(),
            Some(Path::new("./compressed"))
        );
    }

    #[test]
    fn test_parse_cli_value() {
        assert_eq!(IncludeEntry::parse("extra"), IncludeEntry::Simple("extra".into()));
        assert_eq!(
            IncludeEntry::parse("public=compressed"),
            IncludeEntry::Remap {
                from: "public".into(),
                to: "compressed".into()
            }
        );
        // Missing side falls back to in-place
        assert_eq!(IncludeEntry::parse("public="), IncludeEntry::Simple("public=".into()));
    }

    #[test]
    fn test_normalize_remap() {
        let mut entry = IncludeEntry::parse("./public=./compressed");
        entry.normalize(Path::new("/site"));
        assert_eq!(entry.source(), Path::new("/site/public"));
        assert_eq!(entry.destination(), Some(Path::new("/site/compressed")));
    }

    #[test]
    fn test_duplicate_source_warns() {
        let entries = vec![
            IncludeEntry::Simple("/site/img".into()),
            IncludeEntry::Remap {
                from: "/site/img".into(),
                to: "/site/out".into(),
            },
        ];
        let mut diag = ConfigDiagnostics::new();
        IncludeEntry::validate_all(&entries, &mut diag);

        assert!(!diag.has_errors());
        assert_eq!(diag.warnings().count(), 1);
    }
}
