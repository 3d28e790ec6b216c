//! `[build]` section configuration.
//!
//! Paths handed over by the host build and how many encode workers to use.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "dist"             # Build output directory (relative to project root)
//! static_dir = "public"       # Static assets mirrored into `output`
//! workers = 0                 # Encode workers, 0 = available cores
//! scan_output = false         # Treat every file under `output` as emitted
//! ```
//!
//! Extra roots live at the top level, see [`assets`].

pub mod assets;

pub use assets::IncludeEntry;

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Build output directory.
    pub output: PathBuf,

    /// Static assets directory, mirrored into `output` with structure preserved.
    pub static_dir: Option<PathBuf>,

    /// Maximum concurrent encode jobs. `0` uses the available core count.
    pub workers: usize,

    /// Walk `output` instead of relying on the emitted file list.
    pub scan_output: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: "dist".into(),
            static_dir: Some("public".into()),
            workers: 0,
            scan_output: false,
        }
    }
}

impl BuildSectionConfig {
    const OUTPUT: FieldPath = FieldPath::new("build.output");
    const STATIC_DIR: FieldPath = FieldPath::new("build.static_dir");

    /// Resolved worker pool size (never zero).
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }

    /// Normalize all paths relative to root directory.
    pub fn normalize(&mut self, root: &Path) {
        self.output = crate::utils::path::resolve_path(&self.output, root);
        if let Some(dir) = &mut self.static_dir {
            *dir = crate::utils::path::resolve_path(dir, root);
        }
    }

    /// Validate after normalization.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.output.exists() && !self.output.is_dir() {
            diag.error(
                Self::OUTPUT,
                format!("'{}' must be a directory", self.output.display()),
            );
        }

        if let Some(dir) = &self.static_dir {
            if dir.exists() && !dir.is_dir() {
                diag.error(
                    Self::STATIC_DIR,
                    format!("'{}' must be a directory", dir.display()),
                );
            }
            if dir == &self.output {
                diag.error_with_hint(
                    Self::STATIC_DIR,
                    "static directory is the output directory",
                    "assets in the output directory are already processed in place",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: BuildSectionConfig = toml::from_str("").unwrap();
        assert_eq!(config.output, PathBuf::from("dist"));
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_explicit_workers() {
        let config: BuildSectionConfig = toml::from_str("workers = 3").unwrap();
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_normalize() {
        let mut config = BuildSectionConfig::default();
        config.normalize(Path::new("/site"));
        assert_eq!(config.output, PathBuf::from("/site/dist"));
        assert_eq!(config.static_dir, Some(PathBuf::from("/site/public")));
    }

    #[test]
    fn test_static_dir_equal_to_output() {
        let mut config = BuildSectionConfig {
            static_dir: Some("dist".into()),
            ..Default::default()
        };
        config.normalize(Path::new("/site"));

        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
