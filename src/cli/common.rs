//! Shared helpers for CLI commands.

use anyhow::Result;
use std::io::{self, BufRead};

/// Expand `-` into names read from stdin, one per line.
pub fn collect_asset_names(args: &[String]) -> Result<Vec<String>> {
    if args.len() == 1 && args[0] == "-" {
        return read_lines(io::stdin().lock());
    }
    Ok(args.to_vec())
}

fn read_lines(reader: impl BufRead) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            names.push(trimmed.to_string());
        }
    }
    Ok(names)
}
