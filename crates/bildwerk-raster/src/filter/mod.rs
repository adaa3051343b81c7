// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Radiometric filters — 3×3 median denoising and Sobel gradient magnitude.

pub mod median;
pub mod sobel;

pub use median::denoise;
pub use sobel::{detect_edges, sobel_magnitude};
