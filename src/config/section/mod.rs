//! Configuration section definitions.
//!
//! Each module corresponds to a part of `squash.toml`:
//!
//! | Module   | TOML                         | Purpose                               |
//! |----------|------------------------------|---------------------------------------|
//! | `build`  | `[build]`, `include_dirs`    | Output/static dirs, include roots     |
//! | `cache`  | `[cache]`                    | Reuse cache level and snapshot path   |
//! | `codecs` | `[codecs.<encoder>]`         | Per-encoder parameter overrides       |
//! | `route`  | `encode_to`, `exclude`       | Routing overrides and exclusion rule  |

pub mod build;
mod cache;
mod codecs;
mod route;

pub use build::{BuildSectionConfig, IncludeEntry};
pub use cache::{CacheConfig, CacheLevel};
pub use codecs::CodecsConfig;
pub use route::{Route, RouteRule, route_for};
