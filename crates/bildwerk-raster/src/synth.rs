// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic test patterns — deterministic inputs for each operation, either
// in memory or written out as a JPEG test set.

use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use crate::buffer::RasterBuffer;
use crate::codec::{self, EncodeOptions};
use crate::geometry::rotate;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Checkerboard cell edge in pixels.
pub const CHECKER_BLOCK: u32 = 20;

/// Skew applied to the rules written as `skew_test.jpg`.
pub const TEST_SET_SKEW: f64 = 15.0;

/// Seed for the noise pattern in the written test set.
const TEST_SET_SEED: u64 = 0x5eed;

/// Uniform random RGB noise, reproducible for a given `seed`.
pub fn noise(width: u32, height: u32, seed: u64) -> Result<RasterBuffer> {
    let mut rng = StdRng::seed_from_u64(seed);
    let img = RgbaImage::from_fn(width, height, |_, _| {
        Rgba([
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            255,
        ])
    });
    RasterBuffer::from_rgba(img)
}

/// Horizontal tent: black at both sides, brightest in the middle column.
pub fn gradient(width: u32, height: u32) -> Result<RasterBuffer> {
    let half = (width / 2).max(1) as f64;
    let img = RgbaImage::from_fn(width, height, |x, _| {
        let distance = if x < width / 2 { x } else { width - x };
        let v = (distance as f64 / half * 255.0).min(255.0) as u8;
        Rgba([v, v, v, 255])
    });
    RasterBuffer::from_rgba(img)
}

/// Black and white squares of [`CHECKER_BLOCK`] pixels, white at the origin.
pub fn checkerboard(width: u32, height: u32) -> Result<RasterBuffer> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if (x / CHECKER_BLOCK + y / CHECKER_BLOCK) % 2 == 0 {
            WHITE
        } else {
            BLACK
        }
    });
    RasterBuffer::from_rgba(img)
}

/// Four black arrows from the centre towards each edge, on white.
pub fn arrows(width: u32, height: u32) -> Result<RasterBuffer> {
    let mut img = RgbaImage::from_pixel(width, height, WHITE);
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let (reach_x, reach_y) = (width as f32 / 4.0, height as f32 / 4.0);
    let head = (width.min(height) as f32 / 10.0).max(1.0);

    for (dx, dy) in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)] {
        let tip = (cx + dx * reach_x, cy + dy * reach_y);
        draw_line_segment_mut(&mut img, (cx, cy), tip, BLACK);
        // Barbs point back along the shaft, one on each side.
        let back = (tip.0 - dx * head, tip.1 - dy * head);
        let (side_x, side_y) = (dy * head, dx * head);
        draw_line_segment_mut(&mut img, tip, (back.0 + side_x, back.1 + side_y), BLACK);
        draw_line_segment_mut(&mut img, tip, (back.0 - side_x, back.1 - side_y), BLACK);
    }
    RasterBuffer::from_rgba(img)
}

/// Three 2-px white vertical rules on black, rotated clockwise by `angle`.
///
/// The upright rules run the full height at a quarter, half and three
/// quarters of the width, so skew detection on the result reports `angle`.
pub fn skewed_rules(width: u32, height: u32, angle: f64) -> Result<RasterBuffer> {
    let mut img = GrayImage::from_pixel(width, height, Luma([0]));
    for x in [width / 4, width / 2, 3 * width / 4] {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(x as i32, 0).of_size(2, height.max(1)),
            Luma([255]),
        );
    }
    rotate(&RasterBuffer::from_gray(img)?, angle)
}

/// Diagonal stripes 10 px wide in a colour derived from `index`, alternating
/// with white.
pub fn stripes(width: u32, height: u32, index: u32) -> Result<RasterBuffer> {
    let colour = Rgba([
        (index * 90 % 256) as u8,
        (index * 60 % 256) as u8,
        (index * 30 % 256) as u8,
        255,
    ]);
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 20 < 10 { colour } else { WHITE }
    });
    RasterBuffer::from_rgba(img)
}

/// Write the full pattern set into `dir` as JPEGs, creating it if needed.
///
/// Returns the written paths in a fixed order: noise, gradient, binary,
/// rotation, skew, then the three concatenation inputs sized W×H, W/2×H and
/// W×H/2.
#[instrument(skip_all, fields(dir = %dir.as_ref().display(), width, height))]
pub fn generate_test_set(
    dir: impl AsRef<Path>,
    width: u32,
    height: u32,
    options: &EncodeOptions,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if width == 0 || height == 0 {
        return Err(BildwerkError::invalid_parameter(
            "generatetest",
            format!("dimensions must be non-zero, got {width}x{height}"),
        ));
    }
    std::fs::create_dir_all(dir).map_err(|_| BildwerkError::InvalidOutput {
        path: dir.to_path_buf(),
    })?;
    info!("Generating test images");

    let mut patterns = vec![
        ("noise_test.jpg", noise(width, height, TEST_SET_SEED)?),
        ("gradient_test.jpg", gradient(width, height)?),
        ("binary_test.jpg", checkerboard(width, height)?),
        ("rotation_test.jpg", arrows(width, height)?),
        ("skew_test.jpg", skewed_rules(width, height, TEST_SET_SKEW)?),
    ];
    let sizes = [
        (width, height),
        ((width / 2).max(1), height),
        (width, (height / 2).max(1)),
    ];
    let concat_names = ["concat_test_1.jpg", "concat_test_2.jpg", "concat_test_3.jpg"];
    for (index, (&(w, h), name)) in sizes.iter().zip(concat_names).enumerate() {
        patterns.push((name, stripes(w, h, index as u32)?));
    }

    let mut written = Vec::with_capacity(patterns.len());
    for (name, buffer) in patterns {
        let path = dir.join(name);
        codec::save(&buffer, &path, options)?;
        debug!(path = %path.display(), "Test image written");
        written.push(path);
    }
    Ok(written)
}
