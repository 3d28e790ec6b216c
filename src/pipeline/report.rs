//! Run statistics and their terminal summary.

use owo_colors::OwoColorize;
use std::time::Duration;

use crate::encoder::EncoderId;
use crate::log;
use crate::utils::{format_bytes, format_ratio, plural_count};

/// What happened to one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Encoded output was smaller and written.
    Encoded(EncoderId),
    /// Encoded output was not smaller, nothing written.
    Skipped(EncoderId),
    /// Prior output copied from the cache.
    Reused(EncoderId),
    /// No encoder, copied verbatim.
    Copied,
}

impl Outcome {
    fn tag(self) -> String {
        match self {
            Self::Encoded(id) => id.to_string(),
            Self::Skipped(id) => format!("{id}, kept original"),
            Self::Reused(id) => format!("{id}, cached"),
            Self::Copied => "copied".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetReport {
    pub label: String,
    pub old_size: u64,
    pub new_size: u64,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

/// Aggregated result of one pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Bytes saved over all written and copied assets.
    pub saved: u64,
    pub elapsed: Duration,
    /// Encodes whose result was not smaller than the source.
    pub not_handled: usize,
    /// Per-asset entries in completion order.
    pub assets: Vec<AssetReport>,
    /// Assets dropped by an isolated failure, with the reason.
    pub failures: Vec<(String, anyhow::Error)>,
}

impl RunReport {
    pub fn count(&self, pred: impl Fn(Outcome) -> bool) -> usize {
        self.assets.iter().filter(|a| pred(a.outcome)).count()
    }

    /// Print one line per asset, failures, and the summary line.
    pub fn print(&self) {
        for asset in &self.assets {
            let ratio = format_ratio(asset.old_size, asset.new_size);
            log!(
                "squash";
                "{} {} -> {} ({}) {:.0?} [{}]",
                asset.label,
                format_bytes(asset.old_size).dimmed(),
                format_bytes(asset.new_size),
                ratio.green(),
                asset.elapsed,
                asset.outcome.tag()
            );
        }

        for (label, error) in &self.failures {
            log!("error"; "{}: {:#}", label, error);
        }

        let encoded = self.count(|o| matches!(o, Outcome::Encoded(_)));
        let reused = self.count(|o| matches!(o, Outcome::Reused(_)));
        log!(
            "squash";
            "saved {} in {:.2?} ({} encoded, {} reused, {} not smaller{})",
            format_bytes(self.saved).bold(),
            self.elapsed,
            encoded,
            reused,
            self.not_handled,
            if self.failures.is_empty() {
                String::new()
            } else {
                format!(", {}", plural_count(self.failures.len(), "failure"))
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_by_outcome() {
        let entry = |outcome| AssetReport {
            label: "a.png".into(),
            old_size: 10,
            new_size: 8,
            elapsed: Duration::ZERO,
            outcome,
        };
        let report = RunReport {
            assets: vec![
                entry(Outcome::Encoded(EncoderId::Oxipng)),
                entry(Outcome::Copied),
                entry(Outcome::Encoded(EncoderId::Webp)),
            ],
            ..Default::default()
        };
        assert_eq!(report.count(|o| matches!(o, Outcome::Encoded(_))), 2);
        assert_eq!(report.count(|o| o == Outcome::Copied), 1);
    }

    #[test]
    fn test_outcome_tags() {
        assert_eq!(Outcome::Reused(EncoderId::Mozjpeg).tag(), "mozjpeg, cached");
        assert_eq!(Outcome::Copied.tag(), "copied");
    }
}
