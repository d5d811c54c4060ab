//! Hough transform for straight lines.
//!
//! Parameterization: a line is the set of pixels with
//! `x cos(theta) + (H - y) sin(theta) = r`, i.e. `y` is flipped so the origin
//! sits at the bottom-left corner. Theta runs over whole degrees in `[0, 360)`
//! and `r` is stored offset by `diag = floor(sqrt(W^2 + H^2))`, giving an
//! accumulator of `360 x 2 diag` cells addressed as `(theta, r_index)`.

use gp_core::{Image, ImageView, Point2i};
use log::debug;

pub const THETA_BINS: usize = 360;

/// Intensity marking an edge pixel in the input of [`hough_transform`].
pub const EDGE_VALUE: u8 = u8::MAX;

#[derive(Debug, Clone, PartialEq)]
pub struct HoughAccumulator {
    votes: Image<u32>,
    diag: usize,
    src_width: usize,
    src_height: usize,
}

/// Line parameters of an accumulator cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoughLine {
    pub theta_deg: f32,
    pub r: f32,
}

impl HoughLine {
    pub fn from_cell(cell: Point2i, diag: usize) -> Self {
        Self {
            theta_deg: cell.x as f32,
            r: cell.y as f32 - diag as f32,
        }
    }
}

impl HoughAccumulator {
    /// Number of `r` cells per theta column.
    pub fn r_bins(&self) -> usize {
        self.votes.height()
    }

    pub fn diag(&self) -> usize {
        self.diag
    }

    pub fn source_dims(&self) -> (usize, usize) {
        (self.src_width, self.src_height)
    }

    pub fn votes(&self, theta: usize, r_index: usize) -> u32 {
        self.votes.get(theta, r_index).copied().unwrap_or(0)
    }

    /// Votes as a grid with theta along x and `r_index` along y.
    pub fn as_view(&self) -> ImageView<'_, u32> {
        self.votes.as_view()
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.data().iter().map(|&v| u64::from(v)).sum()
    }

    /// Cell with the most votes; the first one in scan order on ties.
    pub fn max_cell(&self) -> (Point2i, u32) {
        let mut best = (Point2i::default(), 0u32);
        for theta in 0..THETA_BINS {
            for r in 0..self.r_bins() {
                let v = self.votes(theta, r);
                if v > best.1 {
                    best = (Point2i::from((theta, r)), v);
                }
            }
        }
        best
    }

    pub fn line_for(&self, cell: Point2i) -> HoughLine {
        HoughLine::from_cell(cell, self.diag)
    }
}

/// `floor(sqrt(W^2 + H^2))`.
pub fn hough_diag(width: usize, height: usize) -> usize {
    let w = width as f64;
    let h = height as f64;
    (w * w + h * h).sqrt().floor() as usize
}

/// `(cos, sin)` for every whole degree in `[0, 360)`.
pub(crate) fn trig_table() -> Vec<(f32, f32)> {
    (0..THETA_BINS)
        .map(|deg| {
            let t = (deg as f32).to_radians();
            (t.cos(), t.sin())
        })
        .collect()
}

/// Votes every pixel equal to [`EDGE_VALUE`] into all 360 theta columns.
///
/// Votes whose offset distance falls outside `[0, 2 diag)` are dropped and
/// counted in the debug log. With `diag = floor(sqrt(W^2 + H^2))` this happens
/// for ordinary in-grid pixels too: a radius that rounds up to `diag` lands on
/// index `2 diag`, one past the last bin. Thin grids lose the most, e.g. a
/// fully set 1x5 grid keeps 1749 of its 1800 votes.
pub fn hough_transform(edges: &ImageView<'_, u8>) -> HoughAccumulator {
    let (w, h) = edges.dims();
    let diag = hough_diag(w, h);
    let r_bins = 2 * diag;
    let trig = trig_table();

    let mut votes = Image::new_fill(THETA_BINS, r_bins, 0u32);
    let mut edge_pixels = 0usize;
    let mut dropped = 0usize;

    for y in 0..h {
        let fy = (h - y) as f32;
        for (x, &v) in edges.row(y).iter().enumerate() {
            if v != EDGE_VALUE {
                continue;
            }
            edge_pixels += 1;
            let fx = x as f32;
            for (theta, &(c, s)) in trig.iter().enumerate() {
                let r = (fx * c + fy * s).round() as isize + diag as isize;
                if r < 0 || r as usize >= r_bins {
                    dropped += 1;
                    continue;
                }
                if let Some(cell) = votes.get_mut(theta, r as usize) {
                    *cell += 1;
                }
            }
        }
    }

    debug!(
        "hough_transform: {w}x{h}, diag {diag}, {edge_pixels} edge pixels, {dropped} votes out of range"
    );

    HoughAccumulator {
        votes,
        diag,
        src_width: w,
        src_height: h,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeakMode {
    /// Every cell above the threshold is a peak.
    #[default]
    Flat,
    /// Above the threshold and not beaten by any cell within `radius`
    /// (theta wraps around, `r` does not). Equal neighbors earlier in scan
    /// order win, so a plateau yields one peak.
    LocalMaximum { radius: usize },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PeakConfig {
    pub threshold: u32,
    pub mode: PeakMode,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            threshold: 100,
            mode: PeakMode::Flat,
        }
    }
}

/// Every cell with more than `threshold` votes, scanned theta-major.
pub fn find_peaks(acc: &HoughAccumulator, threshold: u32) -> Vec<Point2i> {
    find_peaks_with(
        acc,
        &PeakConfig {
            threshold,
            mode: PeakMode::Flat,
        },
    )
}

pub fn find_peaks_with(acc: &HoughAccumulator, cfg: &PeakConfig) -> Vec<Point2i> {
    let mut peaks = Vec::new();
    for theta in 0..THETA_BINS {
        for r in 0..acc.r_bins() {
            let v = acc.votes(theta, r);
            if v <= cfg.threshold {
                continue;
            }
            let keep = match cfg.mode {
                PeakMode::Flat => true,
                PeakMode::LocalMaximum { radius } => is_local_max(acc, theta, r, v, radius),
            };
            if keep {
                peaks.push(Point2i::from((theta, r)));
            }
        }
    }

    debug!(
        "find_peaks: {} peaks above {} ({:?})",
        peaks.len(),
        cfg.threshold,
        cfg.mode
    );
    peaks
}

fn is_local_max(acc: &HoughAccumulator, theta: usize, r: usize, v: u32, radius: usize) -> bool {
    let rad = radius as isize;
    let bins = THETA_BINS as isize;
    let here = (theta, r);

    for dt in -rad..=rad {
        let t = (theta as isize + dt).rem_euclid(bins) as usize;
        for dr in -rad..=rad {
            if dt == 0 && dr == 0 {
                continue;
            }
            let rr = r as isize + dr;
            if rr < 0 || rr as usize >= acc.r_bins() {
                continue;
            }
            let rr = rr as usize;
            let other = acc.votes(t, rr);
            if other > v || (other == v && (t, rr) < here) {
                return false;
            }
        }
    }
    true
}
