//! Source/destination path pair.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where an asset is read from and where its result is written.
///
/// Both paths are absolute and lexically normalized. `to == from` means the
/// asset is replaced in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetPath {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl AssetPath {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Asset replaced where it is.
    pub fn in_place(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            from: path.clone(),
            to: path,
        }
    }

    pub fn is_in_place(&self) -> bool {
        self.from == self.to
    }

    /// File name of the source, used for rule matching.
    pub fn file_name(&self) -> &str {
        file_name(&self.from)
    }
}

/// UTF-8 file name of `path`, empty when it has none.
pub fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
}
