// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codec boundary — decode encoded bytes or files into raster buffers and
// encode buffers back to JPEG or PNG.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{OutputFormat, ProcessorConfig};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument};

use crate::buffer::{Pixels, RasterBuffer};

/// Container formats accepted on decode.
pub const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// Settings for the encode side of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// JPEG quality, 1-100. Ignored for PNG.
    pub quality: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { quality: 75 }
    }
}

impl From<&ProcessorConfig> for EncodeOptions {
    fn from(config: &ProcessorConfig) -> Self {
        Self {
            quality: config.jpeg_quality,
        }
    }
}

// -- Decode -------------------------------------------------------------------

/// Decode an in-memory JPEG, PNG, GIF, BMP or TIFF.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_bytes(data: &[u8]) -> Result<RasterBuffer> {
    let format = image::guess_format(data)
        .map_err(|_| BildwerkError::UnsupportedFormat("unrecognised image data".into()))?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(BildwerkError::UnsupportedFormat(format!("{format:?}")));
    }

    let image = image::load_from_memory_with_format(data, format)
        .map_err(|err| BildwerkError::processing("decode", err))?;
    debug!(
        ?format,
        width = image.width(),
        height = image.height(),
        "Image decoded from bytes"
    );
    RasterBuffer::from_dynamic(image)
}

/// Read and decode an image file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>) -> Result<RasterBuffer> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|_| BildwerkError::InvalidInput {
        path: path.to_path_buf(),
    })?;
    let buffer = decode_bytes(&data)?;
    info!(
        width = buffer.width(),
        height = buffer.height(),
        format = %buffer.format(),
        "Image loaded"
    );
    Ok(buffer)
}

// -- Encode -------------------------------------------------------------------

/// Encode `buffer` into `format`. JPEG drops alpha.
pub fn encode(buffer: &RasterBuffer, format: OutputFormat, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let quality = options.quality.clamp(1, 100);
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
            let written = match buffer.pixels() {
                Pixels::Gray8(img) => img.write_with_encoder(encoder),
                Pixels::Rgba8(img) => DynamicImage::ImageRgba8(img.clone())
                    .to_rgb8()
                    .write_with_encoder(encoder),
            };
            written.map_err(|err| BildwerkError::processing("encode", err))?;
        }
        OutputFormat::Png => {
            let mut cursor = std::io::Cursor::new(&mut bytes);
            let written = match buffer.pixels() {
                Pixels::Gray8(img) => img.write_to(&mut cursor, ImageFormat::Png),
                Pixels::Rgba8(img) => img.write_to(&mut cursor, ImageFormat::Png),
            };
            written.map_err(|err| BildwerkError::processing("encode", err))?;
        }
    }
    debug!(format = format.mime_type(), bytes = bytes.len(), "Image encoded");
    Ok(bytes)
}

/// Encode and write `buffer`; the format follows the file extension.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save(buffer: &RasterBuffer, path: impl AsRef<Path>, options: &EncodeOptions) -> Result<()> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;
    let bytes = encode(buffer, format, options)?;
    std::fs::write(path, bytes).map_err(|_| BildwerkError::InvalidOutput {
        path: path.to_path_buf(),
    })?;
    info!(
        width = buffer.width(),
        height = buffer.height(),
        "Image saved"
    );
    Ok(())
}
