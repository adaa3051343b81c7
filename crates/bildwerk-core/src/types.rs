// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Bildwerk.

use std::path::Path;

use crate::error::{BildwerkError, Result};

/// Pixel layout of a raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Four 8-bit channels: red, green, blue, alpha.
    Rgba8,
    /// One 8-bit luminance channel.
    Gray8,
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Rgba8 => write!(f, "rgba8"),
            PixelFormat::Gray8 => write!(f, "gray8"),
        }
    }
}

/// Direction in which the compositor joins buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Top-to-bottom; inputs share the widest width.
    Vertical,
    /// Left-to-right; inputs share the tallest height.
    Horizontal,
}

/// Encoded formats the codec boundary can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Pick the output format from a file extension (`jpg`, `jpeg`, `png`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "" => Err(BildwerkError::UnsupportedFormat(format!(
                "no file extension on {}",
                path.display()
            ))),
            other => Err(BildwerkError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}
