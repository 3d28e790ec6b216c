//! Asset discovery and target resolution.
//!
//! ```text
//! asset/
//! ├── path.rs     # AssetPath {from, to}
//! ├── scan.rs     # Roots -> ordered AssetPath list
//! └── target.rs   # AssetPath -> EncodeTarget (encoder, cache decision)
//! ```

mod path;
mod scan;
mod target;

pub use path::AssetPath;
pub use scan::{AssetFilter, DiscoveryRoots, discover};
pub use target::{Action, EncodeTarget, resolve_targets};
