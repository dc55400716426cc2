//! Downscale and reduce images to 1-bit GIFs.
//!
//! # Responsibilities
//! - Fit dimensions inside the configured caps, preserving aspect ratio
//! - Dither to pure black and white (Floyd–Steinberg)
//! - Encode with a two-entry palette so the output is strictly 1-bit

use std::borrow::Cow;

use image::imageops::{self, BiLevel, ColorMap, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage};

use crate::media::types::ImageError;

/// Black then white.
const BILEVEL_PALETTE: [u8; 6] = [0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF];

/// Size an image must be scaled to so neither side exceeds its cap.
///
/// Images already inside the caps keep their size.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let ratio = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let scaled_width = ((width as f64 * ratio).round() as u32).clamp(1, max_width);
    let scaled_height = ((height as f64 * ratio).round() as u32).clamp(1, max_height);
    (scaled_width, scaled_height)
}

/// Decode `bytes`, downscale if needed, and return a 1-bit GIF.
pub fn to_bilevel_gif(bytes: &[u8], max_width: u32, max_height: u32) -> Result<Vec<u8>, ImageError> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = image.dimensions();
    let (target_width, target_height) = fit_within(width, height, max_width, max_height);

    let image = if (target_width, target_height) != (width, height) {
        image.resize_exact(target_width, target_height, FilterType::Lanczos3)
    } else {
        image
    };

    encode_gif(&dither(&image))
}

/// Convert to grayscale and dither every pixel to 0 or 255.
fn dither(image: &DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    imageops::dither(&mut gray, &BiLevel);
    gray
}

fn encode_gif(gray: &GrayImage) -> Result<Vec<u8>, ImageError> {
    let width = u16::try_from(gray.width())
        .map_err(|_| ImageError::Encode(format!("width {} too large for GIF", gray.width())))?;
    let height = u16::try_from(gray.height())
        .map_err(|_| ImageError::Encode(format!("height {} too large for GIF", gray.height())))?;

    let indices: Vec<u8> = gray
        .pixels()
        .map(|pixel| BiLevel.index_of(pixel) as u8)
        .collect();

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &BILEVEL_PALETTE)?;
        let frame = gif::Frame {
            width,
            height,
            buffer: Cow::Owned(indices),
            ..gif::Frame::default()
        };
        encoder.write_frame(&frame)?;
    }
    Ok(out)
}
