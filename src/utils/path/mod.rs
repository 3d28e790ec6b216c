//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `resolve_path`, `relative_label`)

pub mod fs;

pub use fs::{normalize_path, relative_label, resolve_path};
