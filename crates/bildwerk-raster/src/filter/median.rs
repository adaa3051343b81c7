// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-channel 3×3 median filter.

use image::{ImageBuffer, Pixel};
use tracing::{debug, info, instrument};

use crate::buffer::{Pixels, RasterBuffer};

/// Remove salt-and-pepper noise with a 3×3 median over each colour channel.
///
/// Channels are filtered independently (a scalar median, not a vector
/// median), so strongly coloured edges can lose a little saturation. Alpha is
/// taken from the centre pixel. The outermost one-pixel ring is copied from
/// the source unchanged, as are images narrower or shorter than 3 pixels.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn denoise(buffer: &RasterBuffer) -> RasterBuffer {
    info!("Denoising image");
    let pixels = match buffer.pixels() {
        Pixels::Rgba8(img) => Pixels::Rgba8(median_3x3(img, 3)),
        Pixels::Gray8(img) => Pixels::Gray8(median_3x3(img, 1)),
    };
    debug!("Median filter complete");
    RasterBuffer::from_pixels(pixels)
}

/// Median of the 3×3 window for the first `filtered_channels` channels of
/// every interior pixel; remaining channels pass through.
fn median_3x3<P>(src: &ImageBuffer<P, Vec<u8>>, filtered_channels: usize) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (w, h) = src.dimensions();
    if w < 3 || h < 3 {
        return src.clone();
    }

    ImageBuffer::from_fn(w, h, |x, y| {
        let centre = *src.get_pixel(x, y);
        if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
            return centre;
        }

        let mut out = centre;
        let mut window = [0u8; 9];
        for channel in 0..filtered_channels {
            for (i, slot) in window.iter_mut().enumerate() {
                let (dx, dy) = ((i % 3) as u32, (i / 3) as u32);
                *slot = src.get_pixel(x + dx - 1, y + dy - 1).channels()[channel];
            }
            window.sort_unstable();
            out.channels_mut()[channel] = window[4];
        }
        out
    })
}
