//! Encode orchestration.
//!
//! ```text
//! targets ─┬─ Encode ─► rayon pool (N workers) ─► JobOutcome ─► channel ─┐
//!          │                                                             ▼
//!          │                                              aggregator (counters, cache)
//!          └─ Reuse / Copy ─► sequential copy ───────────────────────────┘
//! ```
//!
//! Job failures are isolated: the asset is reported and its source left
//! untouched. Only an engine that cannot open, or a worker pool that cannot
//! be built, aborts the run.

use anyhow::{Context, Result};
use crossbeam::channel;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::report::{AssetReport, Outcome, RunReport};
use crate::asset::{Action, EncodeTarget};
use crate::cache::AssetCache;
use crate::codec::{CodecEngine, CodecError, CodecPool};
use crate::encoder::{EncoderId, Registry};
use crate::logger::{ProgressLine, is_silent};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("cannot read `{}`", .0.display())]
    Read(PathBuf, #[source] io::Error),

    #[error("{id} failed on `{}`", .path.display())]
    Codec {
        id: EncoderId,
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("cannot write `{}`", .0.display())]
    Write(PathBuf, #[source] io::Error),
}

/// Result of one encode job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoded {
    Written { old_size: u64, new_size: u64 },
    NotSmaller { old_size: u64, new_size: u64 },
}

/// Tagged message sent from a worker to the aggregator.
struct JobOutcome {
    /// Index into the job list.
    index: usize,
    elapsed: Duration,
    result: Result<Encoded, JobError>,
}

struct EncodeJob {
    id: EncoderId,
    target: EncodeTarget,
}

/// Run every target to completion and aggregate the statistics.
pub fn run<E: CodecEngine>(
    engine: &E,
    registry: &Registry,
    targets: Vec<EncodeTarget>,
    workers: usize,
    mut cache: Option<&mut AssetCache>,
) -> Result<RunReport> {
    let started = Instant::now();
    let mut report = RunReport::default();

    let (jobs, copies): (Vec<_>, Vec<_>) = targets
        .into_iter()
        .partition(|target| matches!(target.action, Action::Encode(_)));
    let jobs: Vec<EncodeJob> = jobs
        .into_iter()
        .filter_map(|target| match target.action {
            Action::Encode(id) => Some(EncodeJob { id, target }),
            _ => None,
        })
        .collect();

    if !jobs.is_empty() {
        let outcomes = encode_all(engine, registry, &jobs, workers)?;

        // single aggregation point, completion order
        for outcome in outcomes {
            let job = &jobs[outcome.index];
            let label = job.target.label.clone();
            match outcome.result {
                Ok(Encoded::Written { old_size, new_size }) => {
                    report.saved += old_size - new_size;
                    if let (Some(cache), Some(entry)) = (cache.as_deref_mut(), job.target.pending)
                    {
                        cache.fulfill(entry);
                    }
                    report.assets.push(AssetReport {
                        label,
                        old_size,
                        new_size,
                        elapsed: outcome.elapsed,
                        outcome: Outcome::Encoded(job.id),
                    });
                }
                Ok(Encoded::NotSmaller { old_size, new_size }) => {
                    report.not_handled += 1;
                    report.assets.push(AssetReport {
                        label,
                        old_size,
                        new_size,
                        elapsed: outcome.elapsed,
                        outcome: Outcome::Skipped(job.id),
                    });
                }
                Err(e) => report.failures.push((label, e.into())),
            }
        }
    }

    for target in copies {
        let copy_started = Instant::now();
        match copy_target(&target) {
            Ok(final_size) => {
                report.saved += target.size.saturating_sub(final_size);
                let outcome = match target.action {
                    Action::Reuse(id) => Outcome::Reused(id),
                    _ => Outcome::Copied,
                };
                report.assets.push(AssetReport {
                    label: target.label,
                    old_size: target.size,
                    new_size: final_size,
                    elapsed: copy_started.elapsed(),
                    outcome,
                });
            }
            Err(e) => report.failures.push((target.label, e.into())),
        }
    }

    report.elapsed = started.elapsed();
    Ok(report)
}

/// Encode all jobs concurrently and collect outcomes in completion order.
///
/// The codec pool is closed exactly once, after every job has settled.
fn encode_all<E: CodecEngine>(
    engine: &E,
    registry: &Registry,
    jobs: &[EncodeJob],
    workers: usize,
) -> Result<Vec<JobOutcome>> {
    let threads = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("squash-encode-{i}"))
        .build()
        .context("failed to build encode worker pool")?;

    let pool = engine
        .open(workers)
        .context("failed to open codec engine")?;

    crate::debug!("encode"; "{} jobs on {} workers", jobs.len(), workers);
    let progress = (!is_silent()).then(|| ProgressLine::new(&[("encode", jobs.len())]));

    let (tx, rx) = channel::unbounded();
    threads.install(|| {
        jobs.par_iter()
            .enumerate()
            .for_each_with(tx, |tx, (index, job)| {
                let job_started = Instant::now();
                let result = encode_one(&pool, registry, job);
                if let Some(progress) = &progress {
                    progress.inc("encode");
                }
                tx.send(JobOutcome {
                    index,
                    elapsed: job_started.elapsed(),
                    result,
                })
                .ok();
            });
    });

    // every sender is dropped once the parallel loop returns
    let outcomes: Vec<JobOutcome> = rx.iter().collect();
    pool.close();

    if let Some(progress) = progress {
        progress.finish();
    }
    Ok(outcomes)
}

fn encode_one<P: CodecPool>(
    pool: &P,
    registry: &Registry,
    job: &EncodeJob,
) -> Result<Encoded, JobError> {
    let source = &job.target.asset.from;
    let dest = &job.target.asset.to;
    let codec_err = |err: CodecError| JobError::Codec {
        id: job.id,
        path: source.clone(),
        source: err,
    };

    let old_size = fs::metadata(source)
        .map_err(|e| JobError::Read(source.clone(), e))?
        .len();

    let mut image = pool.ingest(source).map_err(codec_err)?;
    pool.decode(&mut image).map_err(codec_err)?;
    let encoded = pool
        .encode(&image, job.id, &registry.spec(job.id).params)
        .map_err(codec_err)?;
    let new_size = encoded.size;

    if new_size >= old_size {
        return Ok(Encoded::NotSmaller { old_size, new_size });
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| JobError::Write(dest.clone(), e))?;
    }
    fs::write(dest, &encoded.bytes).map_err(|e| JobError::Write(dest.clone(), e))?;
    Ok(Encoded::Written { old_size, new_size })
}

/// Copy a reused or unencoded asset into place. Returns the final size.
fn copy_target(target: &EncodeTarget) -> Result<u64, JobError> {
    let (from, to) = (&target.asset.from, &target.asset.to);
    if target.asset.is_in_place() {
        return fs::metadata(to)
            .map(|meta| meta.len())
            .map_err(|e| JobError::Read(to.clone(), e));
    }

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| JobError::Write(to.clone(), e))?;
    }
    fs::copy(from, to).map_err(|e| JobError::Write(to.clone(), e))
}
