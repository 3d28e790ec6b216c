//! `squash run`: act as the host build and process one bundle.

use anyhow::Result;

use super::common::collect_asset_names;
use crate::codec::ImageEngine;
use crate::config::SquashConfig;
use crate::log;
use crate::pipeline::Pipeline;

pub fn run_bundle(config: SquashConfig, assets: &[String]) -> Result<()> {
    let names = collect_asset_names(assets)?;
    let output_dir = config.build.output.clone();

    if names.is_empty() && !config.build.scan_output {
        crate::debug!("run"; "no emitted assets given, only static and include dirs are processed");
    }

    let mut pipeline = Pipeline::new(config, ImageEngine);
    pipeline.config_resolved(&output_dir);
    pipeline.bundle_generated(names);
    let report = pipeline.close_bundle()?;
    report.print();

    if !report.failures.is_empty() {
        log!("error"; "{} assets failed, originals kept", report.failures.len());
    }
    Ok(())
}
