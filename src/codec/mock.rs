//! Counting engine for tests.
//!
//! Produces zero-filled outputs whose size is a percentage of the source,
//! and fails ingestion for file names containing `broken`.

use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CodecEngine, CodecError, CodecPool, EncodedImage};
use crate::encoder::{EncoderId, Params};

/// Call counters shared between the engine, its pool and the test.
#[derive(Debug, Default)]
pub struct MockStats {
    pub opens: AtomicUsize,
    pub ingests: AtomicUsize,
    pub decodes: AtomicUsize,
    pub encodes: AtomicUsize,
    pub closes: AtomicUsize,
    /// Encoder and parameter set of every encode call.
    pub calls: Mutex<Vec<(EncoderId, Params)>>,
}

impl MockStats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct MockEngine {
    pub stats: Arc<MockStats>,
    /// Output size as a percentage of the input size.
    pub percent: u64,
    pub fail_open: bool,
}

impl MockEngine {
    pub fn new(percent: u64) -> Self {
        Self {
            stats: Arc::default(),
            percent,
            fail_open: false,
        }
    }
}

impl CodecEngine for MockEngine {
    type Pool = MockPool;

    fn open(&self, _concurrency: usize) -> Result<MockPool, CodecError> {
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(CodecError::Open("mock refuses to start".into()));
        }
        Ok(MockPool {
            stats: Arc::clone(&self.stats),
            percent: self.percent,
        })
    }
}

pub struct MockPool {
    stats: Arc<MockStats>,
    percent: u64,
}

pub struct MockImage {
    path: PathBuf,
    size: u64,
    decoded: bool,
}

impl CodecPool for MockPool {
    type Image = MockImage;

    fn ingest(&self, path: &Path) -> Result<MockImage, CodecError> {
        self.stats.ingests.fetch_add(1, Ordering::SeqCst);
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.contains("broken") {
            return Err(CodecError::Io(std::io::Error::other("unreadable image")));
        }
        Ok(MockImage {
            path: path.to_path_buf(),
            size: fs::metadata(path)?.len(),
            decoded: false,
        })
    }

    fn decode(&self, image: &mut MockImage) -> Result<(), CodecError> {
        self.stats.decodes.fetch_add(1, Ordering::SeqCst);
        image.decoded = true;
        Ok(())
    }

    fn encode(
        &self,
        image: &MockImage,
        id: EncoderId,
        params: &Params,
    ) -> Result<EncodedImage, CodecError> {
        self.stats.encodes.fetch_add(1, Ordering::SeqCst);
        self.stats.calls.lock().push((id, params.clone()));
        if !image.decoded {
            return Err(CodecError::NotDecoded);
        }
        assert!(image.path.exists());
        let size = image.size * self.percent / 100;
        Ok(EncodedImage::new(vec![0u8; size as usize]))
    }

    fn close(self) {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }
}
