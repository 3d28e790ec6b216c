//! Shared helpers: path normalization, pluralization, size formatting.

pub mod path;
pub mod plural;
pub mod size;

pub use plural::plural_count;
pub use size::{format_bytes, format_ratio};
