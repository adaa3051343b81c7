// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-raster — Raster transforms and analyses for Bildwerk.
//
// Provides geometric transforms (arbitrary-angle rotation, aspect-preserving
// resize), neighbourhood filters (median denoise, Sobel edges), analyses
// (Otsu binarization, Hough skew detection and auto-rotation), and a
// compositor for vertical and horizontal concatenation. Every operation
// takes a `RasterBuffer` by reference and returns a new one.

pub mod analysis;
pub mod buffer;
pub mod codec;
pub mod compose;
pub mod filter;
pub mod geometry;
pub mod processor;
pub mod sample;
pub mod synth;

// Re-export the primary entry points so callers can use `bildwerk_raster::rotate` etc.
pub use analysis::{auto_rotate, binarize, compute_otsu_threshold, detect_skew_angle};
pub use buffer::{Pixels, RasterBuffer};
pub use codec::EncodeOptions;
pub use compose::{concatenate, concatenate_horizontal, concatenate_vertical};
pub use filter::{denoise, detect_edges};
pub use geometry::{resize, rotate};
pub use processor::ImageProcessor;
