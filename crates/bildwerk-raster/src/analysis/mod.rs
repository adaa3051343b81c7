// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image analysis — Otsu global thresholding and Hough-based skew detection
// with automatic rotation correction.

pub mod skew;
pub mod threshold;

pub use skew::{HoughAccumulator, HoughPeak, SkewReport, auto_rotate, deskew, detect_skew, detect_skew_angle};
pub use threshold::{Histogram, binarize, compute_otsu_threshold};
