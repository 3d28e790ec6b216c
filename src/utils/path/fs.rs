//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - absolute, lexically cleaned paths
//! - `resolve_path` - expand `~` and resolve against a base directory
//! - `relative_label` - short display form relative to a root

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Joins relative paths with the current directory and removes `.` and `..`
/// components lexically. Symlinks are not resolved, so a destination that
/// does not exist yet normalizes the same way as an existing source.
///
/// # Example
/// ```ignore
/// let abs = normalize_path(Path::new("./dist/assets/../logo.png"));
/// // -> /cwd/dist/logo.png
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut out = PathBuf::new();
    for comp in absolute.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a configured path against a base directory.
///
/// Expands a leading `~`, keeps absolute paths, joins relative ones with
/// `base`, and normalizes the result.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::tilde(&raw);
    let expanded = Path::new(expanded.as_ref());

    if expanded.is_absolute() {
        normalize_path(expanded)
    } else {
        normalize_path(&base.join(expanded))
    }
}

/// Display form of `path` relative to `root`, falling back to the full path.
pub fn relative_label(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
