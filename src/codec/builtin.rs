//! Built-in engine on top of the `image` and `ravif` crates.
//!
//! | Encoder   | Backend                                        |
//! |-----------|------------------------------------------------|
//! | `oxipng`  | PNG, `level` mapped to compression preset      |
//! | `mozjpeg` | JPEG at `quality`                              |
//! | `webp`    | lossless WebP                                  |
//! | `avif`    | ravif, `cqLevel` mapped to quality, `speed`    |
//! | `jxl`     | unsupported                                    |
//! | `wp2`     | unsupported                                    |

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use ravif::{Img, RGBA8};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::{CodecEngine, CodecError, CodecPool, EncodedImage};
use crate::encoder::{EncoderId, Params};

/// Highest `cqLevel` accepted by the AV1 quantizer.
const MAX_CQ_LEVEL: u64 = 63;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageEngine;

impl CodecEngine for ImageEngine {
    type Pool = ImagePool;

    fn open(&self, concurrency: usize) -> Result<ImagePool, CodecError> {
        if concurrency == 0 {
            return Err(CodecError::Open("pool size must be at least 1".into()));
        }
        crate::debug!("codec"; "image engine open, {} workers", concurrency);
        Ok(ImagePool { concurrency })
    }
}

#[derive(Debug)]
pub struct ImagePool {
    concurrency: usize,
}

/// Raw source bytes, decoded on demand.
pub struct SourceImage {
    path: PathBuf,
    bytes: Vec<u8>,
    decoded: Option<DynamicImage>,
}

impl CodecPool for ImagePool {
    type Image = SourceImage;

    fn ingest(&self, path: &Path) -> Result<SourceImage, CodecError> {
        Ok(SourceImage {
            path: path.to_path_buf(),
            bytes: fs::read(path)?,
            decoded: None,
        })
    }

    fn decode(&self, image: &mut SourceImage) -> Result<(), CodecError> {
        if image.decoded.is_none() {
            image.decoded = Some(image::load_from_memory(&image.bytes)?);
        }
        Ok(())
    }

    fn encode(
        &self,
        image: &SourceImage,
        id: EncoderId,
        params: &Params,
    ) -> Result<EncodedImage, CodecError> {
        let pixels = image.decoded.as_ref().ok_or(CodecError::NotDecoded)?;
        crate::debug!("codec"; "{} <- {}", id, image.path.display());

        let bytes = match id {
            EncoderId::Oxipng => encode_png(pixels, param_u64(params, "level", 2))?,
            EncoderId::Mozjpeg => encode_jpeg(pixels, param_u64(params, "quality", 75))?,
            EncoderId::Webp => encode_webp(pixels)?,
            EncoderId::Avif => encode_avif(
                pixels,
                param_u64(params, "cqLevel", 33),
                param_u64(params, "speed", 6),
            )?,
            EncoderId::Jxl | EncoderId::Wp2 => return Err(CodecError::Unsupported(id)),
        };
        Ok(EncodedImage::new(bytes))
    }

    fn close(self) {
        crate::debug!("codec"; "image engine closed ({} workers)", self.concurrency);
    }
}

/// Non-negative integer parameter, `default` when absent or mistyped.
fn param_u64(params: &Params, key: &str, default: u64) -> u64 {
    params
        .get(key)
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(default)
}

fn encode_png(pixels: &DynamicImage, level: u64) -> Result<Vec<u8>, CodecError> {
    let compression = match level {
        0..=1 => CompressionType::Fast,
        2..=4 => CompressionType::Default,
        _ => CompressionType::Best,
    };
    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive);
    pixels.write_with_encoder(encoder)?;
    Ok(out)
}

fn encode_jpeg(pixels: &DynamicImage, quality: u64) -> Result<Vec<u8>, CodecError> {
    let quality = quality.clamp(1, 100) as u8;
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(pixels.to_rgb8()).write_with_encoder(encoder)?;
    Ok(out.into_inner())
}

fn encode_webp(pixels: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut out);
    DynamicImage::ImageRgba8(pixels.to_rgba8()).write_with_encoder(encoder)?;
    Ok(out)
}

fn encode_avif(pixels: &DynamicImage, cq_level: u64, speed: u64) -> Result<Vec<u8>, CodecError> {
    let rgba = pixels.to_rgba8();
    let (width, height) = rgba.dimensions();
    let buffer: Vec<RGBA8> = rgba
        .as_raw()
        .chunks_exact(4)
        .map(|px| RGBA8::new(px[0], px[1], px[2], px[3]))
        .collect();

    let encoded = ravif::Encoder::new()
        .with_quality(avif_quality(cq_level))
        .with_speed(speed.clamp(1, 10) as u8)
        .encode_rgba(Img::new(buffer.as_slice(), width as usize, height as usize))?;
    Ok(encoded.avif_file)
}

/// Map the quantizer level (0 best .. 63 worst) to ravif's 0..100 quality.
fn avif_quality(cq_level: u64) -> f32 {
    let cq = cq_level.min(MAX_CQ_LEVEL) as f32;
    100.0 - cq * 100.0 / MAX_CQ_LEVEL as f32
}
