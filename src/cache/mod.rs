//! Content-addressable reuse cache.
//!
//! Remembers, per encoder, which source content produced which output so
//! later runs can reuse the output instead of encoding again.
//!
//! # Lifecycle
//!
//! ```text
//! CacheSnapshot::load ─► AssetCache::begin ─► lookup (per asset)
//!                                         ─► fulfill (per written encode)
//!                                         ─► finish ─► CacheSnapshot::save
//! ```
//!
//! An encoder whose effective spec differs from the snapshot's recorded
//! options is *unstable*: all its entries are dropped for the run.

mod fingerprint;
mod snapshot;

pub use fingerprint::{Fingerprint, fingerprint_file};
pub use snapshot::CacheSnapshot;

use snapshot::{CacheItem, EntryState};

use rustc_hash::{FxHashMap, FxHashSet};
use std::fs;
use std::path::PathBuf;

use crate::asset::AssetPath;
use crate::encoder::{EncoderId, Registry};

/// Handle to an entry awaiting its encode result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEntry {
    id: EncoderId,
    index: usize,
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Reuse this previously written output.
    Hit(PathBuf),
    /// Encode; report the result through [`AssetCache::fulfill`].
    Miss(PendingEntry),
}

/// Cache state for one run.
#[derive(Debug)]
pub struct AssetCache {
    assets: FxHashMap<EncoderId, Vec<CacheItem>>,
    stable: FxHashSet<EncoderId>,
}

impl AssetCache {
    /// Start a run: compare recorded options with the effective registry and
    /// drop every entry of an encoder whose options changed.
    pub fn begin(snapshot: CacheSnapshot, registry: &Registry) -> Self {
        let stable: FxHashSet<_> = registry
            .iter()
            .filter(|(id, spec)| snapshot.options.get(id) == Some(*spec))
            .map(|(id, _)| id)
            .collect();

        let mut assets = FxHashMap::default();
        for (id, items) in snapshot.assets {
            if stable.contains(&id) {
                assets.insert(id, items);
            } else if !items.is_empty() {
                crate::debug!("cache"; "{} options changed, dropping {} entries", id, items.len());
            }
        }

        Self { assets, stable }
    }

    pub fn is_stable(&self, id: EncoderId) -> bool {
        self.stable.contains(&id)
    }

    /// Decide between reusing a prior output and encoding.
    ///
    /// A hit needs a stable encoder, an entry keyed by the same fingerprint
    /// and source path, an existing output, and that output strictly smaller
    /// than `source_size`. On a miss the matching entry is rewritten (or a new
    /// one appended) as pending.
    pub fn lookup(
        &mut self,
        id: EncoderId,
        fingerprint: Fingerprint,
        asset: &AssetPath,
        source_size: u64,
    ) -> Lookup {
        let fingerprint = fingerprint.to_hex();
        let stable = self.is_stable(id);
        let items = self.assets.entry(id).or_default();

        let found = items
            .iter()
            .position(|item| item.fingerprint == fingerprint && item.paths.from == asset.from);

        if let Some(index) = found
            && stable
        {
            let output = &items[index].paths.to;
            let smaller = fs::metadata(output).is_ok_and(|meta| meta.len() < source_size);
            if smaller {
                return Lookup::Hit(output.clone());
            }
        }

        let item = CacheItem::pending(fingerprint, asset.clone());
        let index = match found {
            Some(index) => {
                items[index] = item;
                index
            }
            None => {
                items.push(item);
                items.len() - 1
            }
        };
        Lookup::Miss(PendingEntry { id, index })
    }

    /// Mark a pending entry as written.
    pub fn fulfill(&mut self, entry: PendingEntry) {
        if let Some(item) = self
            .assets
            .get_mut(&entry.id)
            .and_then(|items| items.get_mut(entry.index))
        {
            item.state = EntryState::Written;
        }
    }

    /// End the run and produce the snapshot to keep.
    ///
    /// Pending entries (encode failed or was not smaller) are dropped, as are
    /// older entries whose output was overwritten by an encode this run.
    pub fn finish(self, registry: &Registry) -> CacheSnapshot {
        let written: FxHashSet<PathBuf> = self
            .assets
            .values()
            .flatten()
            .filter(|item| item.state == EntryState::Written)
            .map(|item| item.paths.to.clone())
            .collect();

        let mut assets = std::collections::BTreeMap::new();
        for (id, items) in self.assets {
            let kept: Vec<_> = items
                .into_iter()
                .filter(|item| match item.state {
                    EntryState::Written => true,
                    EntryState::Pending => false,
                    EntryState::Stored => !written.contains(&item.paths.to),
                })
                .map(|item| CacheItem {
                    state: EntryState::Stored,
                    ..item
                })
                .collect();
            if !kept.is_empty() {
                assets.insert(id, kept);
            }
        }

        let options = registry
            .iter()
            .map(|(id, spec)| (id, spec.clone()))
            .collect();

        CacheSnapshot { options, assets }
    }
}
