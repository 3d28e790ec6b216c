//! Asset post-processing pipeline.
//!
//! The host build drives the pipeline through three hooks:
//!
//! ```text
//! config_resolved(output_dir)   the build knows where it writes
//! bundle_generated(names)       files emitted by the build (may repeat)
//! close_bundle()                discover → resolve → cache → encode → write
//! ```
//!
//! Only `close_bundle` touches the filesystem. The CLI plays the host.

mod orchestrate;
mod report;

pub use report::{Outcome, RunReport};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::asset::{AssetFilter, DiscoveryRoots, discover, resolve_targets};
use crate::cache::{AssetCache, CacheSnapshot};
use crate::codec::CodecEngine;
use crate::config::{CacheLevel, SquashConfig};
use crate::encoder::Registry;

pub struct Pipeline<E: CodecEngine> {
    config: SquashConfig,
    engine: E,
    output_dir: PathBuf,
    emitted: Vec<String>,
    /// Cache carried between runs at `CacheLevel::Session`.
    session: Option<CacheSnapshot>,
}

impl<E: CodecEngine> Pipeline<E> {
    pub fn new(config: SquashConfig, engine: E) -> Self {
        let output_dir = config.build.output.clone();
        Self {
            config,
            engine,
            output_dir,
            emitted: Vec::new(),
            session: None,
        }
    }

    /// The host resolved its output directory.
    pub fn config_resolved(&mut self, output_dir: &Path) {
        self.output_dir = crate::utils::path::resolve_path(output_dir, &self.config.root);
    }

    /// The host emitted these files, relative to the output directory.
    pub fn bundle_generated<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emitted.extend(names.into_iter().map(Into::into));
    }

    /// Process everything and write results.
    ///
    /// Fails only when the run cannot start: invalid rules, a worker pool that
    /// cannot be built or an engine that cannot open. Per-asset problems end
    /// up in [`RunReport::failures`].
    pub fn close_bundle(&mut self) -> Result<RunReport> {
        let config = &self.config;
        let registry = config.registry().context("invalid codec override")?;
        let routes = config.routes().context("invalid encode_to rule")?;
        let exclude = config.exclude_rule().context("invalid exclude rule")?;

        let filter = AssetFilter::new(&registry, exclude.as_ref());
        let roots = DiscoveryRoots {
            output_dir: &self.output_dir,
            emitted: &self.emitted,
            scan_output: config.build.scan_output,
            static_dir: config.build.static_dir.as_deref(),
            include_dirs: &config.include_dirs,
        };
        let assets = discover(&roots, &filter);

        // an aborted run leaves the session cache as it found it
        let prior = self.session.take();
        let mut cache = begin_cache(config, prior.clone(), &registry);
        let resolved = resolve_targets(assets, &routes, &registry, &config.root, cache.as_mut());

        let run = orchestrate::run(
            &self.engine,
            &registry,
            resolved.targets,
            config.build.worker_count(),
            cache.as_mut(),
        );
        let mut report = match run {
            Ok(report) => report,
            Err(e) => {
                self.session = prior;
                return Err(e);
            }
        };
        report.failures.splice(
            0..0,
            resolved
                .failures
                .into_iter()
                .map(|(label, e)| (label, e.into())),
        );

        if let Some(cache) = cache {
            let snapshot = cache.finish(&registry);
            match config.cache.level {
                CacheLevel::Session => self.session = Some(snapshot),
                CacheLevel::Persistent => {
                    if let Err(e) = snapshot.save(&config.cache.path) {
                        crate::log!("error"; "{:#}", anyhow::Error::new(e));
                    }
                }
                CacheLevel::None => {}
            }
        }

        self.emitted.clear();
        Ok(report)
    }
}

/// Cache for this run, `None` when caching is off.
fn begin_cache(
    config: &SquashConfig,
    session: Option<CacheSnapshot>,
    registry: &Registry,
) -> Option<AssetCache> {
    let snapshot = match config.cache.level {
        CacheLevel::None => return None,
        CacheLevel::Session => session.unwrap_or_default(),
        CacheLevel::Persistent => CacheSnapshot::load(&config.cache.path),
    };
    Some(AssetCache::begin(snapshot, registry))
}
