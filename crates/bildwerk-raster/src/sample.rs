// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sampling and colour reduction — grayscale conversion and nearest-pixel
// lookup for the geometric transforms.

use image::{GrayImage, ImageBuffer, Luma, Pixel};

use crate::buffer::{Pixels, RasterBuffer};

/// Luma weights in thousandths for R, G, B (ITU-R BT.601).
pub const LUMA_WEIGHTS: [u32; 3] = [299, 587, 114];

/// `round(0.299 R + 0.587 G + 0.114 B)` in integer arithmetic.
///
/// The weights sum to 1000, so the result never exceeds 255.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = LUMA_WEIGHTS[0] * r as u32
        + LUMA_WEIGHTS[1] * g as u32
        + LUMA_WEIGHTS[2] * b as u32;
    ((weighted + 500) / 1000) as u8
}

/// Grayscale copy of a buffer. Alpha is ignored; gray input is copied as-is.
pub fn to_gray(buffer: &RasterBuffer) -> GrayImage {
    match buffer.pixels() {
        Pixels::Gray8(img) => img.clone(),
        Pixels::Rgba8(img) => GrayImage::from_fn(img.width(), img.height(), |x, y| {
            let [r, g, b, _] = img.get_pixel(x, y).0;
            Luma([luma(r, g, b)])
        }),
    }
}

/// Nearest-neighbour lookup by truncation.
///
/// Returns `None` when `(x, y)` lies outside `[0, width) × [0, height)`,
/// including NaN coordinates.
#[inline]
pub fn sample_nearest<P>(image: &ImageBuffer<P, Vec<u8>>, x: f64, y: f64) -> Option<P>
where
    P: Pixel<Subpixel = u8>,
{
    let inside = x >= 0.0 && x < image.width() as f64 && y >= 0.0 && y < image.height() as f64;
    if !inside {
        return None;
    }
    Some(*image.get_pixel(x as u32, y as u32))
}
