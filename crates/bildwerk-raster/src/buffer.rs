// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster buffer — the immutable pixel grid every operation consumes and
// produces. Backed by `image::ImageBuffer`, which owns the row-major storage
// and guarantees `len == width * height * channels`.

use bildwerk_core::PixelFormat;
use bildwerk_core::error::{BildwerkError, Result};
use image::{DynamicImage, GrayImage, RgbaImage};

use crate::sample;

/// Pixel storage for a [`RasterBuffer`], one variant per supported format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pixels {
    Rgba8(RgbaImage),
    Gray8(GrayImage),
}

/// An in-memory, non-empty W×H pixel grid.
///
/// Operations never mutate a `RasterBuffer`; they borrow it and return a new
/// one. Both dimensions are always at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    pixels: Pixels,
}

impl RasterBuffer {
    // -- Construction ---------------------------------------------------------

    /// Wrap an RGBA image, rejecting zero-area input.
    pub fn from_rgba(image: RgbaImage) -> Result<Self> {
        ensure_non_empty(image.width(), image.height())?;
        Ok(Self {
            pixels: Pixels::Rgba8(image),
        })
    }

    /// Wrap a grayscale image, rejecting zero-area input.
    pub fn from_gray(image: GrayImage) -> Result<Self> {
        ensure_non_empty(image.width(), image.height())?;
        Ok(Self {
            pixels: Pixels::Gray8(image),
        })
    }

    /// Adopt a decoded image. 8/16-bit luma becomes `Gray8`; every other
    /// layout is converted to `Rgba8`.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::from_gray(gray),
            DynamicImage::ImageLuma16(_) => Self::from_gray(image.to_luma8()),
            other => Self::from_rgba(other.to_rgba8()),
        }
    }

    /// Internal constructor for operation outputs, whose dimensions are
    /// derived from an already-valid buffer and clamped to at least 1.
    pub(crate) fn from_pixels(pixels: Pixels) -> Self {
        let buffer = Self { pixels };
        debug_assert!(buffer.width() > 0 && buffer.height() > 0);
        buffer
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        match &self.pixels {
            Pixels::Rgba8(img) => img.width(),
            Pixels::Gray8(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match &self.pixels {
            Pixels::Rgba8(img) => img.height(),
            Pixels::Gray8(img) => img.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn format(&self) -> PixelFormat {
        match &self.pixels {
            Pixels::Rgba8(_) => PixelFormat::Rgba8,
            Pixels::Gray8(_) => PixelFormat::Gray8,
        }
    }

    /// Borrow the typed pixel storage.
    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn as_rgba(&self) -> Option<&RgbaImage> {
        match &self.pixels {
            Pixels::Rgba8(img) => Some(img),
            Pixels::Gray8(_) => None,
        }
    }

    pub fn as_gray(&self) -> Option<&GrayImage> {
        match &self.pixels {
            Pixels::Gray8(img) => Some(img),
            Pixels::Rgba8(_) => None,
        }
    }

    // -- Conversions ----------------------------------------------------------

    /// Grayscale copy using the fixed luma weights in [`sample::luma`].
    pub fn to_gray(&self) -> GrayImage {
        sample::to_gray(self)
    }

    /// RGBA copy. Gray pixels are replicated into R, G and B with opaque alpha.
    pub fn to_rgba(&self) -> RgbaImage {
        match &self.pixels {
            Pixels::Rgba8(img) => img.clone(),
            Pixels::Gray8(img) => DynamicImage::ImageLuma8(img.clone()).to_rgba8(),
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self.pixels {
            Pixels::Rgba8(img) => DynamicImage::ImageRgba8(img),
            Pixels::Gray8(img) => DynamicImage::ImageLuma8(img),
        }
    }
}

fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(BildwerkError::invalid_parameter(
            "raster buffer",
            format!("dimensions must be positive, got {width}x{height}"),
        ));
    }
    Ok(())
}
