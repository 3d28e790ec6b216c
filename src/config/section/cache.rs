//! `[cache]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [cache]
//! level = "persistent"          # none | session | persistent
//! path = ".squash/cache.json"   # snapshot file (persistent only)
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};

/// How long encoded outputs are remembered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheLevel {
    /// Every run encodes from scratch.
    #[default]
    None,
    /// Kept in memory for the lifetime of one pipeline.
    Session,
    /// Written to the snapshot file at the end of every run.
    Persistent,
}

impl CacheLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "false" => Some(Self::None),
            "session" => Some(Self::Session),
            "persistent" | "on" | "true" => Some(Self::Persistent),
            _ => None,
        }
    }

    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub level: CacheLevel,
    /// Snapshot file location.
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            level: CacheLevel::None,
            path: ".squash/cache.json".into(),
        }
    }
}

impl CacheConfig {
    const PATH: FieldPath = FieldPath::new("cache.path");

    pub fn normalize(&mut self, root: &Path) {
        if !self.path.as_os_str().is_empty() {
            self.path = crate::utils::path::resolve_path(&self.path, root);
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.level != CacheLevel::Persistent {
            return;
        }
        if self.path.as_os_str().is_empty() {
            diag.error(Self::PATH, "persistent cache needs a snapshot path");
        } else if self.path.is_dir() {
            diag.error(
                Self::PATH,
                format!("'{}' is a directory", self.path.display()),
            );
        }
    }
}
