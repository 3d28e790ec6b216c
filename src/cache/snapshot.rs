//! Cache snapshot persistence.
//!
//! ```json
//! {
//!   "options": { "oxipng": { "extension": "\\.png$", "level": 2 } },
//!   "assets": {
//!     "oxipng": [
//!       { "fingerprint": "9f2c…", "paths": { "from": "/site/public/a.png", "to": "/site/dist/a.png" } }
//!     ]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::asset::AssetPath;
use crate::encoder::{EncoderId, EncoderSpec};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot write cache snapshot `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("cannot serialize cache snapshot")]
    Json(#[from] serde_json::Error),
}

/// Lifecycle of an entry within one run. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryState {
    /// Carried over from a previous run.
    #[default]
    Stored,
    /// Recorded this run, waiting for its encode to write the destination.
    Pending,
    /// Destination written this run.
    Written,
}

/// One remembered encode result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheItem {
    /// blake3 hex of the source bytes at encode time.
    pub fingerprint: String,
    pub paths: AssetPath,
    #[serde(skip)]
    pub state: EntryState,
}

impl CacheItem {
    pub fn pending(fingerprint: String, paths: AssetPath) -> Self {
        Self {
            fingerprint,
            paths,
            state: EntryState::Pending,
        }
    }
}

/// Whole-file cache document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSnapshot {
    /// Effective encoder specs of the run that wrote this snapshot.
    pub options: BTreeMap<EncoderId, EncoderSpec>,
    pub assets: BTreeMap<EncoderId, Vec<CacheItem>>,
}

impl CacheSnapshot {
    /// Load a snapshot. Missing or unreadable files give an empty snapshot.
    ///
    /// Entries whose source no longer exists are pruned.
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                crate::debug!("cache"; "no snapshot at {}", path.display());
                return Self::default();
            }
            Err(e) => {
                crate::log!("cache"; "cannot read {}: {}, starting fresh", path.display(), e);
                return Self::default();
            }
        };

        let mut snapshot: Self = match serde_json::from_str(&json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                crate::log!("cache"; "malformed snapshot {}: {}, starting fresh", path.display(), e);
                return Self::default();
            }
        };

        let pruned = snapshot.prune_missing_sources();
        crate::debug!(
            "cache";
            "restored {} entries, pruned {}",
            snapshot.entry_count(),
            pruned
        );
        snapshot
    }

    /// Write the snapshot, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::Io(parent.to_path_buf(), e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| CacheError::Io(path.to_path_buf(), e))?;
        crate::debug!("cache"; "saved {} entries to {}", self.entry_count(), path.display());
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.assets.values().map(Vec::len).sum()
    }

    /// Drop entries whose source file is gone. Returns how many were dropped.
    fn prune_missing_sources(&mut self) -> usize {
        let before = self.entry_count();
        for items in self.assets.values_mut() {
            items.retain(|item| item.paths.from.exists());
        }
        self.assets.retain(|_, items| !items.is_empty());
        before - self.entry_count()
    }
}
