// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Otsu threshold selection and global binarization.

use image::{GrayImage, Luma};
use tracing::{debug, info, instrument};

use crate::buffer::{Pixels, RasterBuffer};
use crate::sample::to_gray;

/// 256-bin intensity histogram of a grayscale image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; 256],
    total: u64,
}

impl Histogram {
    pub fn from_gray(gray: &GrayImage) -> Self {
        let mut bins = [0u64; 256];
        for pixel in gray.pixels() {
            bins[pixel.0[0] as usize] += 1;
        }
        Self {
            bins,
            total: gray.width() as u64 * gray.height() as u64,
        }
    }

    pub fn bins(&self) -> &[u64; 256] {
        &self.bins
    }

    /// Number of pixels counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Threshold maximising the between-class variance `wB·wF·(μB − μF)²`.
    ///
    /// Levels with an empty background are skipped and the scan stops once
    /// the foreground is empty. Comparison is strict, so on ties the lowest
    /// level wins; a single-level histogram yields 0.
    pub fn otsu_threshold(&self) -> u8 {
        let sum_total: u64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(level, &count)| level as u64 * count)
            .sum();

        let mut sum_background: u64 = 0;
        let mut weight_background: u64 = 0;
        let mut max_variance: f64 = 0.0;
        let mut best_threshold: u8 = 0;

        for (t, &count) in self.bins.iter().enumerate() {
            weight_background += count;
            if weight_background == 0 {
                continue;
            }
            let weight_foreground = self.total - weight_background;
            if weight_foreground == 0 {
                break;
            }

            sum_background += t as u64 * count;
            let mean_background = sum_background as f64 / weight_background as f64;
            let mean_foreground = (sum_total - sum_background) as f64 / weight_foreground as f64;

            let between_variance = weight_background as f64
                * weight_foreground as f64
                * (mean_background - mean_foreground).powi(2);

            if between_variance > max_variance {
                max_variance = between_variance;
                best_threshold = t as u8;
            }
        }

        best_threshold
    }
}

/// Otsu threshold of the buffer's grayscale rendition.
pub fn compute_otsu_threshold(buffer: &RasterBuffer) -> u8 {
    Histogram::from_gray(&to_gray(buffer)).otsu_threshold()
}

/// Black-and-white rendition using a global Otsu threshold.
///
/// A pixel becomes white (255) only when its gray level strictly exceeds the
/// threshold; everything else is black (0).
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn binarize(buffer: &RasterBuffer) -> RasterBuffer {
    info!("Applying Otsu binarization");

    let gray = to_gray(buffer);
    let threshold = Histogram::from_gray(&gray).otsu_threshold();
    debug!(threshold, "Otsu threshold computed");

    RasterBuffer::from_pixels(Pixels::Gray8(apply_threshold(&gray, threshold)))
}

/// `255` where `gray > threshold`, `0` elsewhere.
pub fn apply_threshold(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
