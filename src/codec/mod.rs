//! Codec engine boundary.
//!
//! The pipeline never touches pixels itself. It opens a pool once per run,
//! pushes every encode job through it, and closes it after all jobs settle:
//!
//! ```text
//! engine.open(n) ─► pool.ingest(path) ─► pool.decode(&mut img) ─► pool.encode(&img, id, params)
//!                                                  ... all jobs ...               ─► pool.close()
//! ```
//!
//! `close` takes the pool by value, so it can only happen once.

mod builtin;
#[cfg(test)]
pub mod mock;

pub use builtin::ImageEngine;

use std::io;
use std::path::Path;
use thiserror::Error;

use crate::encoder::{EncoderId, Params};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{0} encoding is not available in this build")]
    Unsupported(EncoderId),

    #[error("image was not decoded before encoding")]
    NotDecoded,

    #[error("codec engine failed to start: {0}")]
    Open(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("avif encoding failed")]
    Avif(#[from] ravif::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Bytes produced by one encode call.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub size: u64,
}

impl EncodedImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self { bytes, size }
    }
}

/// Factory for codec pools.
pub trait CodecEngine {
    type Pool: CodecPool;

    /// Start a pool sized for `concurrency` simultaneous jobs.
    fn open(&self, concurrency: usize) -> Result<Self::Pool, CodecError>;
}

/// A running engine, shared by all encode workers.
pub trait CodecPool: Send + Sync {
    type Image: Send;

    fn ingest(&self, path: &Path) -> Result<Self::Image, CodecError>;

    fn decode(&self, image: &mut Self::Image) -> Result<(), CodecError>;

    /// Encode with exactly one encoder's parameters.
    fn encode(
        &self,
        image: &Self::Image,
        id: EncoderId,
        params: &Params,
    ) -> Result<EncodedImage, CodecError>;

    fn close(self);
}
