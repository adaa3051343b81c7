// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositor — joins several buffers into one after scaling them to a shared
// width (vertical stack) or height (horizontal strip).

use bildwerk_core::Axis;
use bildwerk_core::error::{BildwerkError, Result};
use image::{RgbaImage, imageops};
use tracing::{debug, info, instrument};

use crate::buffer::{Pixels, RasterBuffer};
use crate::geometry::resample;

/// Largest canvas, in pixels, the compositor will allocate (1 GiB of RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Stack buffers top-to-bottom at the widest input's width.
pub fn concatenate_vertical(buffers: &[RasterBuffer]) -> Result<RasterBuffer> {
    concatenate(buffers, Axis::Vertical)
}

/// Place buffers left-to-right at the tallest input's height.
pub fn concatenate_horizontal(buffers: &[RasterBuffer]) -> Result<RasterBuffer> {
    concatenate(buffers, Axis::Horizontal)
}

/// Join at least two buffers along `axis`, in input order.
///
/// Every input is resampled so its shared edge matches the longest one,
/// keeping its own aspect ratio. The result is always RGBA.
#[instrument(skip(buffers), fields(count = buffers.len()))]
pub fn concatenate(buffers: &[RasterBuffer], axis: Axis) -> Result<RasterBuffer> {
    if buffers.len() < 2 {
        return Err(BildwerkError::invalid_parameter(
            "concatenate",
            format!("at least two buffers are required, got {}", buffers.len()),
        ));
    }
    info!("Concatenating images");

    let shared = buffers
        .iter()
        .map(|b| match axis {
            Axis::Vertical => b.width(),
            Axis::Horizontal => b.height(),
        })
        .max()
        .unwrap_or(1);

    // Size every tile and the canvas before allocating anything.
    let sizes = buffers
        .iter()
        .map(|b| scaled_to_shared_edge(b.width(), b.height(), shared, axis))
        .collect::<Result<Vec<_>>>()?;

    let stacked: u64 = sizes
        .iter()
        .map(|&(w, h)| match axis {
            Axis::Vertical => h as u64,
            Axis::Horizontal => w as u64,
        })
        .sum();
    let stacked = u32::try_from(stacked).map_err(|_| {
        BildwerkError::invalid_parameter("concatenate", format!("combined extent {stacked} overflows"))
    })?;
    let area = shared as u64 * stacked as u64;
    if area > MAX_CANVAS_PIXELS {
        return Err(BildwerkError::invalid_parameter(
            "concatenate",
            format!("canvas of {area} pixels exceeds the {MAX_CANVAS_PIXELS} pixel limit"),
        ));
    }

    let tiles: Vec<RgbaImage> = buffers
        .iter()
        .zip(&sizes)
        .map(|(b, &(w, h))| resample(b, w, h).to_rgba())
        .collect();

    let (canvas_w, canvas_h) = match axis {
        Axis::Vertical => (shared, stacked),
        Axis::Horizontal => (stacked, shared),
    };
    let mut canvas = RgbaImage::new(canvas_w, canvas_h);

    let mut offset: i64 = 0;
    for tile in &tiles {
        match axis {
            Axis::Vertical => {
                imageops::replace(&mut canvas, tile, 0, offset);
                offset += tile.height() as i64;
            }
            Axis::Horizontal => {
                imageops::replace(&mut canvas, tile, offset, 0);
                offset += tile.width() as i64;
            }
        }
    }

    debug!(canvas_w, canvas_h, "Concatenation complete");
    Ok(RasterBuffer::from_pixels(Pixels::Rgba8(canvas)))
}

/// Size of a `width`×`height` tile whose joining edge is stretched to `shared`.
///
/// The free edge is rounded and at least 1; an edge past `u32::MAX` is an
/// `InvalidParameter`.
fn scaled_to_shared_edge(width: u32, height: u32, shared: u32, axis: Axis) -> Result<(u32, u32)> {
    let (along, across) = match axis {
        Axis::Vertical => (height, width),
        Axis::Horizontal => (width, height),
    };
    let free = (shared as f64 * along as f64 / across as f64).round().max(1.0);
    if free > u32::MAX as f64 {
        return Err(BildwerkError::invalid_parameter(
            "concatenate",
            format!("a {width}x{height} input scaled to {shared} px overflows"),
        ));
    }
    let free = free as u32;
    Ok(match axis {
        Axis::Vertical => (shared, free),
        Axis::Horizontal => (free, shared),
    })
}
