//! Target resolution: pick an encoder (or none) for each discovered asset.
//!
//! Precedence:
//! 1. first routing override matching the file name
//! 2. first registry rule matching the file name (registration order)
//! 3. verbatim copy
//!
//! With the cache enabled an `Encode` may then be downgraded to `Reuse`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::AssetPath;
use crate::cache::{AssetCache, Lookup, PendingEntry, fingerprint_file};
use crate::config::{Route, route_for};
use crate::encoder::{EncoderId, Registry};
use crate::utils::path::relative_label;

/// What happens to an asset this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Encode with this encoder.
    Encode(EncoderId),
    /// Cache hit: copy the prior output of this encoder.
    Reuse(EncoderId),
    /// No encoder matched.
    Copy,
}

/// A resolved unit of work.
#[derive(Debug, Clone)]
pub struct EncodeTarget {
    /// For `Reuse`, `from` points at the cached output.
    pub asset: AssetPath,
    /// Display label relative to the project root.
    pub label: String,
    pub action: Action,
    /// Size of the original source when resolved.
    pub size: u64,
    /// Cache entry to fulfil once the encode writes `asset.to`.
    pub pending: Option<PendingEntry>,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot read size of `{}`", .0.display())]
    Size(PathBuf, #[source] io::Error),

    #[error("cannot fingerprint `{}`", .0.display())]
    Fingerprint(PathBuf, #[source] io::Error),
}

/// Resolution output: targets in discovery order, plus assets dropped on error.
#[derive(Debug, Default)]
pub struct Resolved {
    pub targets: Vec<EncodeTarget>,
    pub failures: Vec<(String, ResolveError)>,
}

/// Encoder for `name`: routing overrides first, then auto-matching.
pub fn select_encoder(name: &str, routes: &[Route], registry: &Registry) -> Option<EncoderId> {
    route_for(routes, name).or_else(|| registry.auto_match(name))
}

pub fn resolve_targets(
    assets: Vec<AssetPath>,
    routes: &[Route],
    registry: &Registry,
    root: &Path,
    mut cache: Option<&mut AssetCache>,
) -> Resolved {
    let mut resolved = Resolved::default();

    for asset in assets {
        let label = relative_label(&asset.from, root);
        match resolve_one(asset, label.clone(), routes, registry, cache.as_deref_mut()) {
            Ok(target) => resolved.targets.push(target),
            Err(e) => resolved.failures.push((label, e)),
        }
    }

    resolved
}

fn resolve_one(
    mut asset: AssetPath,
    label: String,
    routes: &[Route],
    registry: &Registry,
    cache: Option<&mut AssetCache>,
) -> Result<EncodeTarget, ResolveError> {
    let size = fs::metadata(&asset.from)
        .map_err(|e| ResolveError::Size(asset.from.clone(), e))?
        .len();

    let Some(id) = select_encoder(asset.file_name(), routes, registry) else {
        return Ok(EncodeTarget {
            asset,
            label,
            action: Action::Copy,
            size,
            pending: None,
        });
    };

    let Some(cache) = cache else {
        return Ok(EncodeTarget {
            asset,
            label,
            action: Action::Encode(id),
            size,
            pending: None,
        });
    };

    let fingerprint = fingerprint_file(&asset.from)
        .map_err(|e| ResolveError::Fingerprint(asset.from.clone(), e))?;

    let (action, pending) = match cache.lookup(id, fingerprint, &asset, size) {
        Lookup::Hit(output) => {
            crate::debug!("cache"; "reuse {} ({})", label, fingerprint);
            asset.from = output;
            (Action::Reuse(id), None)
        }
        Lookup::Miss(entry) => (Action::Encode(id), Some(entry)),
    };

    Ok(EncodeTarget {
        asset,
        label,
        action,
        size,
        pending,
    })
}
