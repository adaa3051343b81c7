// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skew detection — a Hough line transform over the Sobel edge map picks the
// dominant line angle, which `auto_rotate` then undoes.
//
// Lines are parametrised by their normal: `ρ = x·cosθ + y·sinθ` with θ in
// whole degrees over [0, 180). Structures that are vertical on the upright
// page vote near θ = 0, so a page turned clockwise by θ₀ reports θ₀.
// Horizontal structures vote near θ = 90, so the same page dominated by
// horizontal lines reports an angle 90° away from θ₀ (15° becomes -75°) and
// correcting it leaves the page a quarter turn off. The axis ambiguity is left to the caller.

use bildwerk_core::error::Result;
use image::GrayImage;
use tracing::{debug, info, instrument};

use crate::buffer::RasterBuffer;
use crate::filter::sobel_magnitude;
use crate::geometry::rotate;
use crate::sample::to_gray;

/// Edge magnitudes strictly above this vote.
pub const EDGE_ACTIVATION: u8 = 127;

/// Number of whole-degree angle bins, covering [0, 180).
pub const ANGLE_BINS: usize = 180;

/// The strongest accumulator cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoughPeak {
    /// Normal angle θ in whole degrees, 0..180.
    pub theta: u32,
    /// Signed distance ρ of the line from the origin, in pixels.
    pub rho: i64,
    pub votes: u32,
}

/// Vote counts indexed by (θ, ρ), θ-major.
#[derive(Debug, Clone)]
pub struct HoughAccumulator {
    width: u32,
    height: u32,
    rho_max: i64,
    rho_bins: usize,
    votes: Vec<u32>,
    trig: Vec<(f64, f64)>,
}

impl HoughAccumulator {
    /// Empty accumulator for a `width`×`height` edge map.
    ///
    /// ρ spans `[-ρmax, ρmax]` with `ρmax = ceil(sqrt(W² + H²))`, which covers
    /// every pixel coordinate.
    pub fn new(width: u32, height: u32) -> Self {
        let diagonal = (width as f64).hypot(height as f64);
        let rho_max = diagonal.ceil() as i64;
        let rho_bins = 2 * rho_max as usize + 1;
        let trig = (0..ANGLE_BINS)
            .map(|deg| {
                let (sin, cos) = (deg as f64).to_radians().sin_cos();
                (cos, sin)
            })
            .collect();
        Self {
            width,
            height,
            rho_max,
            rho_bins,
            votes: vec![0; ANGLE_BINS * rho_bins],
            trig,
        }
    }

    pub fn rho_max(&self) -> i64 {
        self.rho_max
    }

    /// Cast one vote per angle for the point `(x, y)`.
    ///
    /// Only points inside the `width`×`height` grid given to [`new`] have a
    /// ρ within `[-ρmax, ρmax]`; anything outside is rejected with `false`
    /// and leaves the votes untouched.
    ///
    /// [`new`]: HoughAccumulator::new
    pub fn vote(&mut self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (x, y) = (x as f64, y as f64);
        for (theta, &(cos, sin)) in self.trig.iter().enumerate() {
            let rho = (x * cos + y * sin).round() as i64;
            let index = theta * self.rho_bins + (rho + self.rho_max) as usize;
            self.votes[index] += 1;
        }
        true
    }

    /// Vote for every pixel of `edges` above [`EDGE_ACTIVATION`]; returns the
    /// number of voting pixels.
    pub fn vote_edges(&mut self, edges: &GrayImage) -> usize {
        let mut voters = 0;
        for (x, y, pixel) in edges.enumerate_pixels() {
            if pixel.0[0] > EDGE_ACTIVATION && self.vote(x, y) {
                voters += 1;
            }
        }
        voters
    }

    /// Votes in cell (θ, ρ); 0 outside the accumulator.
    pub fn votes_at(&self, theta: u32, rho: i64) -> u32 {
        if theta as usize >= ANGLE_BINS || rho.abs() > self.rho_max {
            return 0;
        }
        self.votes[theta as usize * self.rho_bins + (rho + self.rho_max) as usize]
    }

    /// Cell with the most votes, scanning θ then ρ; the first maximum wins.
    /// An accumulator without votes reports θ = 0.
    pub fn peak(&self) -> HoughPeak {
        let mut best = HoughPeak {
            theta: 0,
            rho: -self.rho_max,
            votes: 0,
        };
        for (theta, row) in self.votes.chunks_exact(self.rho_bins).enumerate() {
            for (bin, &votes) in row.iter().enumerate() {
                if votes > best.votes {
                    best = HoughPeak {
                        theta: theta as u32,
                        rho: bin as i64 - self.rho_max,
                        votes,
                    };
                }
            }
        }
        best
    }
}

/// Outcome of a skew estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewReport {
    /// Skew in degrees, within (-90, 90].
    pub angle: f64,
    pub peak: HoughPeak,
    /// Edge pixels that took part in the vote.
    pub edge_pixels: usize,
}

/// Map a normal angle in [0, 180) to a skew centred on 0.
pub fn correction_angle(theta: u32) -> f64 {
    let theta = theta as f64;
    if theta > 90.0 { theta - 180.0 } else { theta }
}

/// Run the Hough vote over an edge map.
///
/// Cost is `O(edge pixels × 180)`; downsample very large images first when
/// latency matters.
#[instrument(skip(edges), fields(width = edges.width(), height = edges.height()))]
pub fn detect_skew(edges: &GrayImage) -> SkewReport {
    let mut accumulator = HoughAccumulator::new(edges.width(), edges.height());
    let edge_pixels = accumulator.vote_edges(edges);
    let peak = accumulator.peak();
    let angle = correction_angle(peak.theta);
    debug!(
        edge_pixels,
        theta = peak.theta,
        rho = peak.rho,
        votes = peak.votes,
        angle,
        "Hough peak found"
    );
    SkewReport {
        angle,
        peak,
        edge_pixels,
    }
}

/// Dominant skew angle in degrees of an edge map.
pub fn detect_skew_angle(edges: &GrayImage) -> f64 {
    detect_skew(edges).angle
}

/// Estimate the skew of `buffer` and rotate it back, returning the report too.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn deskew(buffer: &RasterBuffer) -> Result<(RasterBuffer, SkewReport)> {
    let edges = sobel_magnitude(&to_gray(buffer));
    let report = detect_skew(&edges);
    info!(angle = report.angle, "Correcting detected skew");
    let corrected = rotate(buffer, -report.angle)?;
    Ok((corrected, report))
}

/// Grayscale → Sobel → Hough → rotate by the negated skew.
pub fn auto_rotate(buffer: &RasterBuffer) -> Result<RasterBuffer> {
    deskew(buffer).map(|(corrected, _)| corrected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth;
    use image::Luma;

    #[test]
    fn rho_range_covers_the_diagonal() {
        let acc = HoughAccumulator::new(3, 4);
        assert_eq!(acc.rho_max(), 5);
        assert_eq!(acc.rho_bins, 11);
        assert_eq!(acc.votes.len(), 180 * 11);
    }

    /// A single point puts one vote in every angle row; the tie goes to θ = 0.
    #[test]
    fn single_point_ties_resolve_to_first_angle() {
        let mut acc = HoughAccumulator::new(20, 20);
        assert!(acc.vote(10, 0));
        assert_eq!(acc.votes_at(0, 10), 1);
        assert_eq!(acc.votes_at(90, 0), 1);
        assert_eq!(
            acc.peak(),
            HoughPeak {
                theta: 0,
                rho: 10,
                votes: 1
            }
        );
    }

    /// Points past the grid would land in a neighbouring θ row or underflow
    /// the ρ index; they are refused and the accumulator stays empty.
    #[test]
    fn out_of_grid_votes_are_rejected() {
        let mut acc = HoughAccumulator::new(10, 10);
        assert_eq!(acc.rho_max(), 15);
        assert!(!acc.vote(12, 12));
        assert!(!acc.vote(20, 0));
        assert!(!acc.vote(0, 10));
        assert!(acc.votes.iter().all(|&v| v == 0));
        assert_eq!(acc.peak().votes, 0);

        assert!(acc.vote(9, 9));
        assert_eq!(acc.votes.iter().map(|&v| v as usize).sum::<usize>(), ANGLE_BINS);
    }

    /// An edge map larger than the accumulator only counts pixels that fit.
    #[test]
    fn oversized_edge_map_votes_only_inside_the_grid() {
        let edges = GrayImage::from_pixel(12, 12, Luma([255]));
        let mut acc = HoughAccumulator::new(10, 10);
        assert_eq!(acc.vote_edges(&edges), 100);
    }

    #[test]
    fn empty_edge_map_reports_zero_skew() {
        let edges = GrayImage::new(30, 30);
        let report = detect_skew(&edges);
        assert_eq!(report.edge_pixels, 0);
        assert_eq!(report.peak.votes, 0);
        assert_eq!(report.angle, 0.0);
    }

    #[test]
    fn activation_threshold_is_strict() {
        let mut edges = GrayImage::new(10, 10);
        edges.put_pixel(2, 2, Luma([EDGE_ACTIVATION]));
        edges.put_pixel(3, 3, Luma([EDGE_ACTIVATION + 1]));
        let mut acc = HoughAccumulator::new(10, 10);
        assert_eq!(acc.vote_edges(&edges), 1);
    }

    #[test]
    fn axis_aligned_lines() {
        // Column x = 7: normal along x, θ = 0.
        let vertical = GrayImage::from_fn(40, 40, |x, _| Luma([if x == 7 { 255 } else { 0 }]));
        let report = detect_skew(&vertical);
        assert_eq!((report.peak.theta, report.peak.rho), (0, 7));
        assert_eq!(report.angle, 0.0);

        // Row y = 5: normal along y, θ = 90, reported unchanged.
        let horizontal = GrayImage::from_fn(40, 40, |_, y| Luma([if y == 5 { 255 } else { 0 }]));
        let report = detect_skew(&horizontal);
        assert_eq!((report.peak.theta, report.peak.rho), (90, 5));
        assert_eq!(report.angle, 90.0);
    }

    /// The diagonal y = x has its normal at 135°, folded to -45°.
    #[test]
    fn obtuse_normals_fold_to_negative_angles() {
        let edges = GrayImage::from_fn(128, 128, |x, y| Luma([if x == y && x < 100 { 255 } else { 0 }]));
        let report = detect_skew(&edges);
        assert_eq!(report.peak.theta, 135);
        assert_eq!(report.peak.votes, 100);
        assert_eq!(report.angle, -45.0);
        assert_eq!(correction_angle(91), -89.0);
        assert_eq!(correction_angle(90), 90.0);
    }

    /// Vertical rules rotated clockwise by 15° are detected as a 15° skew.
    #[test]
    fn recovers_synthetic_rotation() {
        for angle in [15.0, -10.0, 4.0] {
            let skewed = synth::skewed_rules(120, 160, angle).unwrap();
            let edges = sobel_magnitude(&skewed.to_gray());
            let detected = detect_skew_angle(&edges);
            assert!(
                (detected - angle).abs() <= 2.0,
                "expected ~{angle}, detected {detected}"
            );
        }
    }

    /// After auto-rotation the rules are upright again.
    #[test]
    fn auto_rotate_levels_the_page() {
        let skewed = synth::skewed_rules(120, 160, 12.0).unwrap();
        let (corrected, report) = deskew(&skewed).unwrap();
        assert!((report.angle - 12.0).abs() <= 2.0);

        let residual = detect_skew_angle(&sobel_magnitude(&corrected.to_gray()));
        assert!(residual.abs() <= 2.0, "residual skew {residual}");
    }

    /// Horizontal rules skewed by 15° vote near the 105° normal and fold to
    /// about -75°. Correcting that turns the page a quarter further, leaving
    /// the rules vertical rather than level.
    #[test]
    fn horizontal_rules_report_the_perpendicular_skew() {
        let horizontal = synth::skewed_rules(120, 160, 90.0).unwrap();
        let skewed = rotate(&horizontal, 15.0).unwrap();

        let (corrected, report) = deskew(&skewed).unwrap();
        assert!(
            report.peak.theta.abs_diff(105) <= 2,
            "theta {}",
            report.peak.theta
        );
        assert!((report.angle + 75.0).abs() <= 2.0, "angle {}", report.angle);

        let residual = detect_skew_angle(&sobel_magnitude(&corrected.to_gray()));
        assert!(residual.abs() <= 2.0, "residual skew {residual}");
    }

    #[test]
    fn auto_rotate_of_flat_image_is_identity() {
        let flat = RasterBuffer::from_gray(GrayImage::from_pixel(25, 14, Luma([90]))).unwrap();
        assert_eq!(auto_rotate(&flat).unwrap(), flat);
    }
}
