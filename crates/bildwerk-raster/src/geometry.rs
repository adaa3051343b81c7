// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric transform engine — arbitrary-angle rotation with canvas expansion
// and aspect-preserving Lanczos resize.

use bildwerk_core::error::{BildwerkError, Result};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Pixel, Rgba};
use tracing::{debug, info, instrument};

use crate::buffer::{Pixels, RasterBuffer};
use crate::sample::sample_nearest;

/// Value of destination pixels that map outside the source (transparent black).
pub const ROTATION_FILL_RGBA: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Gray counterpart of [`ROTATION_FILL_RGBA`].
pub const ROTATION_FILL_GRAY: Luma<u8> = Luma([0]);

/// Resampling kernel shared by `resize` and the compositor.
const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

// -- Rotation -----------------------------------------------------------------

/// Rotate by `degrees`, growing the canvas so nothing is clipped.
///
/// Positive angles turn the content clockwise on screen. The angle is first
/// normalised into `[0, 360)`; exact quarter turns use the lossless
/// `imageops` rotations, everything else goes through an inverse
/// nearest-neighbour mapping about the image centres.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn rotate(buffer: &RasterBuffer, degrees: f64) -> Result<RasterBuffer> {
    if !degrees.is_finite() {
        return Err(BildwerkError::invalid_parameter(
            "rotate",
            format!("angle must be finite, got {degrees}"),
        ));
    }

    let normalised = degrees.rem_euclid(360.0);
    info!(degrees, normalised, "Rotating image");

    if let Some(turns) = quarter_turns(normalised) {
        debug!(turns, "Lossless quarter-turn rotation");
        return Ok(rotate_quarter(buffer, turns));
    }

    let radians = normalised.to_radians();
    let pixels = match buffer.pixels() {
        Pixels::Rgba8(img) => Pixels::Rgba8(rotate_about_centre(img, radians, ROTATION_FILL_RGBA)),
        Pixels::Gray8(img) => Pixels::Gray8(rotate_about_centre(img, radians, ROTATION_FILL_GRAY)),
    };
    let rotated = RasterBuffer::from_pixels(pixels);

    debug!(
        new_w = rotated.width(),
        new_h = rotated.height(),
        "General rotation applied"
    );
    Ok(rotated)
}

/// Axis-aligned box enclosing a `width`×`height` rectangle rotated by `radians`.
///
/// `newW = |W·cosθ| + |H·sinθ|`, `newH = |W·sinθ| + |H·cosθ|`, each rounded
/// to the nearest integer and at least 1.
pub fn rotated_size(width: u32, height: u32, radians: f64) -> (u32, u32) {
    let (sin, cos) = radians.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (width as f64, height as f64);
    let new_w = (w * cos + h * sin).round().max(1.0) as u32;
    let new_h = (w * sin + h * cos).round().max(1.0) as u32;
    (new_w, new_h)
}

/// Number of clockwise quarter turns if `normalised` is an exact multiple of 90.
fn quarter_turns(normalised: f64) -> Option<u32> {
    let turns = normalised / 90.0;
    if turns.fract() == 0.0 {
        // rem_euclid may round up to exactly 360.
        Some(turns as u32 % 4)
    } else {
        None
    }
}

fn rotate_quarter(buffer: &RasterBuffer, turns: u32) -> RasterBuffer {
    let pixels = match (buffer.pixels(), turns) {
        (pixels, 0) => pixels.clone(),
        (Pixels::Rgba8(img), 1) => Pixels::Rgba8(imageops::rotate90(img)),
        (Pixels::Rgba8(img), 2) => Pixels::Rgba8(imageops::rotate180(img)),
        (Pixels::Rgba8(img), _) => Pixels::Rgba8(imageops::rotate270(img)),
        (Pixels::Gray8(img), 1) => Pixels::Gray8(imageops::rotate90(img)),
        (Pixels::Gray8(img), 2) => Pixels::Gray8(imageops::rotate180(img)),
        (Pixels::Gray8(img), _) => Pixels::Gray8(imageops::rotate270(img)),
    };
    RasterBuffer::from_pixels(pixels)
}

/// Inverse-map every destination pixel into the source and copy the pixel
/// found there by truncation; pixels that land outside keep `fill`.
fn rotate_about_centre<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    radians: f64,
    fill: P,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (w, h) = src.dimensions();
    let (new_w, new_h) = rotated_size(w, h, radians);

    let (centre_x, centre_y) = (w as f64 / 2.0, h as f64 / 2.0);
    let (new_centre_x, new_centre_y) = (new_w as f64 / 2.0, new_h as f64 / 2.0);
    let (sin, cos) = (-radians).sin_cos();

    ImageBuffer::from_fn(new_w, new_h, |x, y| {
        let xr = x as f64 - new_centre_x;
        let yr = y as f64 - new_centre_y;
        let src_x = xr * cos - yr * sin + centre_x;
        let src_y = xr * sin + yr * cos + centre_y;
        sample_nearest(src, src_x, src_y).unwrap_or(fill)
    })
}

// -- Resize -------------------------------------------------------------------

/// Resize to fit within `target_width` x `target_height`, preserving aspect
/// ratio. Uses Lanczos3 filtering for high-quality scaling in both directions.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn resize(buffer: &RasterBuffer, target_width: u32, target_height: u32) -> Result<RasterBuffer> {
    if target_width == 0 || target_height == 0 {
        return Err(BildwerkError::invalid_parameter(
            "resize",
            format!("target must be non-zero, got {target_width}x{target_height}"),
        ));
    }

    let (new_w, new_h) = fit_within(buffer.width(), buffer.height(), target_width, target_height);
    info!(target_width, target_height, new_w, new_h, "Resizing image");

    Ok(resample(buffer, new_w, new_h))
}

/// Largest size with the aspect ratio of `width`×`height` that fits the target.
///
/// When the target is relatively wider than the source, height binds;
/// otherwise width binds. The free dimension is rounded and at least 1.
pub fn fit_within(width: u32, height: u32, target_width: u32, target_height: u32) -> (u32, u32) {
    let ratio = width as f64 / height as f64;
    if target_width as f64 / target_height as f64 > ratio {
        let new_w = (target_height as f64 * ratio).round().max(1.0) as u32;
        (new_w, target_height)
    } else {
        let new_h = (target_width as f64 / ratio).round().max(1.0) as u32;
        (target_width, new_h)
    }
}

/// Resample to exactly `width`×`height`, keeping the pixel format.
pub(crate) fn resample(buffer: &RasterBuffer, width: u32, height: u32) -> RasterBuffer {
    if buffer.dimensions() == (width, height) {
        return buffer.clone();
    }
    let pixels = match buffer.pixels() {
        Pixels::Rgba8(img) => Pixels::Rgba8(imageops::resize(img, width, height, RESAMPLE_FILTER)),
        Pixels::Gray8(img) => Pixels::Gray8(imageops::resize(img, width, height, RESAMPLE_FILTER)),
    };
    RasterBuffer::from_pixels(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::PixelFormat;
    use image::{GrayImage, RgbaImage};

    /// A buffer where every pixel is distinct, so any shift shows up.
    fn numbered(width: u32, height: u32) -> RasterBuffer {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, (x * 7 + y * 13) as u8, 255])
        });
        RasterBuffer::from_rgba(img).unwrap()
    }

    #[test]
    fn zero_and_full_turns_return_identical_pixels() {
        let src = numbered(37, 21);
        for degrees in [0.0, 360.0, -360.0, 720.0, -0.0] {
            let out = rotate(&src, degrees).unwrap();
            assert_eq!(out, src, "rotation by {degrees} changed the image");
        }
    }

    /// Quarter turns swap dimensions and move the top-left pixel clockwise.
    #[test]
    fn quarter_turns_are_lossless_and_clockwise() {
        let src = numbered(4, 2);
        let top_left = *src.as_rgba().unwrap().get_pixel(0, 0);

        let r90 = rotate(&src, 90.0).unwrap();
        assert_eq!(r90.dimensions(), (2, 4));
        assert_eq!(r90.as_rgba().unwrap().get_pixel(1, 0), &top_left);

        let r180 = rotate(&src, -180.0).unwrap();
        assert_eq!(r180.dimensions(), (4, 2));
        assert_eq!(r180.as_rgba().unwrap().get_pixel(3, 1), &top_left);

        let r270 = rotate(&src, -90.0).unwrap();
        assert_eq!(r270.dimensions(), (2, 4));
        assert_eq!(r270.as_rgba().unwrap().get_pixel(0, 3), &top_left);

        // Four quarter turns come back to the start.
        let mut round_trip = src.clone();
        for _ in 0..4 {
            round_trip = rotate(&round_trip, 90.0).unwrap();
        }
        assert_eq!(round_trip, src);
    }

    #[test]
    fn bounding_box_grows_to_hold_rotated_content() {
        assert_eq!(rotated_size(100, 100, 45f64.to_radians()), (141, 141));
        assert_eq!(rotated_size(40, 20, 30f64.to_radians()), (45, 37));
        assert_eq!(rotated_size(40, 20, 0.0), (40, 20));
    }

    /// Centre content survives; corners outside the source get the
    /// transparent-black fill.
    #[test]
    fn general_rotation_fills_uncovered_corners() {
        let red = Rgba([200, 10, 10, 255]);
        let src = RasterBuffer::from_rgba(RgbaImage::from_pixel(40, 20, red)).unwrap();

        let out = rotate(&src, 30.0).unwrap();
        assert_eq!(out.dimensions(), (45, 37));
        let img = out.as_rgba().unwrap();
        assert_eq!(img.get_pixel(22, 18), &red);
        assert_eq!(img.get_pixel(0, 0), &ROTATION_FILL_RGBA);
        assert_eq!(img.get_pixel(44, 36), &ROTATION_FILL_RGBA);
    }

    #[test]
    fn gray_rotation_stays_gray() {
        let src = RasterBuffer::from_gray(GrayImage::from_pixel(10, 10, Luma([200]))).unwrap();
        let out = rotate(&src, 10.0).unwrap();
        assert_eq!(out.format(), PixelFormat::Gray8);
        assert_eq!(out.as_gray().unwrap().get_pixel(0, 0), &ROTATION_FILL_GRAY);
    }

    #[test]
    fn non_finite_angle_is_rejected() {
        let src = numbered(3, 3);
        assert!(matches!(
            rotate(&src, f64::NAN),
            Err(BildwerkError::InvalidParameter { op: "rotate", .. })
        ));
        assert!(rotate(&src, f64::INFINITY).is_err());
    }

    #[test]
    fn resize_binds_on_the_tighter_dimension() {
        assert_eq!(fit_within(200, 100, 50, 50), (50, 25));
        assert_eq!(fit_within(100, 200, 50, 50), (25, 50));
        assert_eq!(fit_within(100, 100, 50, 50), (50, 50));
        assert_eq!(fit_within(10, 10, 40, 30), (30, 30));
        // A sliver never collapses to zero.
        assert_eq!(fit_within(1000, 1, 10, 10), (10, 1));
    }

    /// Output always fits the target and keeps the source ratio within rounding.
    #[test]
    fn resize_fits_target_and_keeps_ratio() {
        let sources = [(640, 480), (480, 640), (123, 457), (1, 1), (999, 3)];
        let targets = [(800, 600), (50, 50), (17, 300), (300, 17), (1, 1)];
        for &(w, h) in &sources {
            for &(tw, th) in &targets {
                let (nw, nh) = fit_within(w, h, tw, th);
                assert!(nw <= tw && nh <= th, "{w}x{h} -> {nw}x{nh} exceeds {tw}x{th}");
                assert!(nw >= 1 && nh >= 1);
                let ratio = w as f64 / h as f64;
                let tolerance = ratio / nh as f64 + 1.0 / nh as f64;
                if nw > 1 && nh > 1 {
                    assert!(((nw as f64 / nh as f64) - ratio).abs() <= tolerance);
                }
            }
        }
    }

    #[test]
    fn resize_produces_exact_dimensions_and_keeps_format() {
        let src = numbered(200, 100);
        let out = resize(&src, 50, 50).unwrap();
        assert_eq!(out.dimensions(), (50, 25));
        assert_eq!(out.format(), PixelFormat::Rgba8);

        let gray = RasterBuffer::from_gray(GrayImage::from_pixel(10, 20, Luma([128]))).unwrap();
        let up = resize(&gray, 100, 100).unwrap();
        assert_eq!(up.dimensions(), (50, 100));
        assert_eq!(up.format(), PixelFormat::Gray8);
    }

    #[test]
    fn resize_rejects_zero_target() {
        let src = numbered(10, 10);
        assert!(matches!(
            resize(&src, 0, 10),
            Err(BildwerkError::InvalidParameter { op: "resize", .. })
        ));
        assert!(resize(&src, 10, 0).is_err());
    }
}
