//! `squash clean`: forget every cached encode.

use anyhow::{Context, Result};
use std::fs;
use std::io;

use crate::config::SquashConfig;
use crate::log;

pub fn remove_snapshot(config: &SquashConfig) -> Result<()> {
    let path = &config.cache.path;
    match fs::remove_file(path) {
        Ok(()) => {
            log!("cache"; "removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log!("cache"; "nothing to clean");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut config = SquashConfig::default();
        config.cache.path = dir.path().join("cache.json");
        fs::write(&config.cache.path, "{}").unwrap();

        remove_snapshot(&config).unwrap();
        assert!(!config.cache.path.exists());
        // second call is a no-op
        remove_snapshot(&config).unwrap();
    }
}
