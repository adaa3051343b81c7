// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sobel gradient magnitude. The edge map is both a user-facing result and the
// input to skew detection.

use image::{GrayImage, Luma};
use tracing::{debug, info, instrument};

use crate::buffer::{Pixels, RasterBuffer};
use crate::sample::to_gray;

type Kernel3 = [[i32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Gray edge map of `buffer`.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn detect_edges(buffer: &RasterBuffer) -> RasterBuffer {
    info!("Detecting edges");
    let edges = sobel_magnitude(&to_gray(buffer));
    RasterBuffer::from_pixels(Pixels::Gray8(edges))
}

/// `sqrt(gx² + gy²)` clamped to 255 for every interior pixel.
///
/// The one-pixel border has no full neighbourhood and stays 0.
pub fn sobel_magnitude(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut edges = GrayImage::new(w, h);
    if w < 3 || h < 3 {
        return edges;
    }

    let mut strongest = 0u8;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut gx = 0i32;
            let mut gy = 0i32;
            for (ky, (row_x, row_y)) in SOBEL_KERNEL_X.iter().zip(&SOBEL_KERNEL_Y).enumerate() {
                for kx in 0..3 {
                    let value = gray.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1).0[0] as i32;
                    gx += row_x[kx] * value;
                    gy += row_y[kx] * value;
                }
            }
            let magnitude = ((gx * gx + gy * gy) as f64).sqrt().min(255.0) as u8;
            strongest = strongest.max(magnitude);
            edges.put_pixel(x, y, Luma([magnitude]));
        }
    }

    debug!(strongest, "Sobel magnitude computed");
    edges
}
