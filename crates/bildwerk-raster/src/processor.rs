// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — chainable facade over the raster operations: resize,
// rotate, auto-rotate, denoise, binarize and edge detection, plus the codec
// boundary for loading and saving.

use std::path::Path;

use bildwerk_core::OutputFormat;
use bildwerk_core::error::Result;
use image::DynamicImage;
use tracing::{debug, info, instrument};

use crate::analysis::{self, SkewReport};
use crate::buffer::RasterBuffer;
use crate::codec::{self, EncodeOptions};
use crate::{filter, geometry};

/// Image processing pipeline operating on a single in-memory raster.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed buffer, enabling method chaining.
///
/// ```ignore
/// let bytes = ImageProcessor::open("scan.jpg")?
///     .denoise()
///     .auto_rotate()?
///     .resize(800, 600)?
///     .binarize()
///     .to_png_bytes()?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    /// The current working buffer.
    buffer: RasterBuffer,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            buffer: codec::open(path)?,
        })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            buffer: codec::decode_bytes(data)?,
        })
    }

    /// Wrap an already-decoded buffer.
    pub fn from_buffer(buffer: RasterBuffer) -> Self {
        Self { buffer }
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        Ok(Self {
            buffer: RasterBuffer::from_dynamic(image)?,
        })
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn as_buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> RasterBuffer {
        self.buffer
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Fit within `max_width` x `max_height`, preserving aspect ratio.
    pub fn resize(self, max_width: u32, max_height: u32) -> Result<Self> {
        Ok(Self {
            buffer: geometry::resize(&self.buffer, max_width, max_height)?,
        })
    }

    /// Rotate clockwise by `degrees`, expanding the canvas.
    pub fn rotate(self, degrees: f64) -> Result<Self> {
        Ok(Self {
            buffer: geometry::rotate(&self.buffer, degrees)?,
        })
    }

    /// Detect the dominant skew and rotate it away.
    #[instrument(skip(self))]
    pub fn auto_rotate(self) -> Result<Self> {
        let (buffer, report) = analysis::deskew(&self.buffer)?;
        log_skew(&report);
        Ok(Self { buffer })
    }

    /// 3×3 per-channel median filter.
    pub fn denoise(self) -> Self {
        Self {
            buffer: filter::denoise(&self.buffer),
        }
    }

    /// Global Otsu binarization; the result is grayscale.
    pub fn binarize(self) -> Self {
        Self {
            buffer: analysis::binarize(&self.buffer),
        }
    }

    /// Replace the image with its Sobel edge map.
    pub fn detect_edges(self) -> Self {
        Self {
            buffer: filter::detect_edges(&self.buffer),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        codec::encode(&self.buffer, OutputFormat::Png, &EncodeOptions::default())
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        codec::encode(&self.buffer, OutputFormat::Jpeg, &EncodeOptions { quality })
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<Path>, options: &EncodeOptions) -> Result<()> {
        codec::save(&self.buffer, path, options)
    }
}

fn log_skew(report: &SkewReport) {
    info!(angle = report.angle, "Skew corrected");
    debug!(
        theta = report.peak.theta,
        votes = report.peak.votes,
        edge_pixels = report.edge_pixels,
        "Skew vote details"
    );
}
