//! Segment extraction along a detected Hough line.
//!
//! The line of a peak is walked across the grid (along x, or along y when the
//! line is steeper than 45 degrees), pixels at or above `min_intensity` are
//! collected in walk order, and consecutive hits are greedily chained while the
//! gap between them stays strictly under `max_gap`.
//!
//! Chaining is a two-state machine:
//! - `Flushed` -> `Accumulating` on the next point (a run starts there).
//! - `Accumulating` -> `Accumulating` when the gap is `< max_gap`.
//! - `Accumulating` -> `Flushed` on a gap `>= max_gap`: the run is emitted when its
//!   end-to-end length reaches `min_length`, dropped otherwise, and the point
//!   that broke the chain immediately starts a new run.
//!
//! What happens to the run still open at the end of the walk is configurable
//! with [`FinalRun`].

use gp_core::{ImageView, LineSegment, Point2i};
use log::debug;

use crate::hough::{HoughLine, hough_diag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FinalRun {
    /// Apply the length check to the last run as well.
    #[default]
    Flush,
    /// Discard the last run unconditionally.
    Drop,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentConfig {
    pub min_intensity: u8,
    pub min_length: f32,
    pub max_gap: f32,
    pub final_run: FinalRun,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_intensity: 255,
            min_length: 10.0,
            max_gap: 3.0,
            final_run: FinalRun::Flush,
        }
    }
}

pub fn detect_line_segments(
    img: &ImageView<'_, u8>,
    peak: Point2i,
    min_intensity: u8,
    min_length: f32,
    max_gap: f32,
) -> Vec<LineSegment> {
    detect_line_segments_with(
        img,
        peak,
        &SegmentConfig {
            min_intensity,
            min_length,
            max_gap,
            ..SegmentConfig::default()
        },
    )
}

pub fn detect_line_segments_with(
    img: &ImageView<'_, u8>,
    peak: Point2i,
    cfg: &SegmentConfig,
) -> Vec<LineSegment> {
    let line = HoughLine::from_cell(peak, hough_diag(img.width(), img.height()));
    let points = collect_line_points(img, line, cfg.min_intensity);
    let segments = chain_points(&points, cfg);
    debug!(
        "detect_line_segments: peak ({}, {}) -> {} hits, {} segments",
        peak.x,
        peak.y,
        points.len(),
        segments.len()
    );
    segments
}

/// Foreground pixels under `line`, in walk order.
///
/// At each step of the walk the two pixels bracketing the line (`floor` and
/// `ceil` of the crossing coordinate) are candidates. A candidate is a hit when
/// it reaches `min_intensity` and the line passes through its footprint, i.e.
/// `|x cos + (H - y) sin - r| <= (|cos| + |sin|) / 2`. The nearer of two hits
/// wins, so each step yields at most one point.
pub fn collect_line_points(img: &ImageView<'_, u8>, line: HoughLine, min_intensity: u8) -> Vec<Point2i> {
    let (w, h) = img.dims();
    let t = line.theta_deg.to_radians();
    let (c, s) = (t.cos(), t.sin());
    let fh = h as f32;
    let tolerance = 0.5 * (c.abs() + s.abs());

    let residual = |x: usize, y: usize| (x as f32 * c + (fh - y as f32) * s - line.r).abs();
    let nearest = |cands: [Option<(usize, usize)>; 2]| {
        cands
            .into_iter()
            .flatten()
            .filter(|&(x, y)| img.at(x, y) >= min_intensity)
            .map(|(x, y)| (residual(x, y), x, y))
            .filter(|&(d, _, _)| d <= tolerance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, x, y)| Point2i::from((x, y)))
    };

    let mut points = Vec::new();
    if s.abs() >= c.abs() {
        // Shallow line: y = H - (r - x cos) / sin.
        for x in 0..w {
            let y = fh - (line.r - x as f32 * c) / s;
            points.extend(nearest(bracket(y, h).map(|y| y.map(|y| (x, y)))));
        }
    } else {
        // Steep line: x = (r - (H - y) sin) / cos.
        for y in 0..h {
            let x = (line.r - (fh - y as f32) * s) / c;
            points.extend(nearest(bracket(x, w).map(|x| x.map(|x| (x, y)))));
        }
    }
    points
}

/// In-grid indices of `floor(v)` and `ceil(v)`; the second is `None` when `v`
/// is integral.
fn bracket(v: f32, len: usize) -> [Option<usize>; 2] {
    let lo = v.floor();
    let hi = v.ceil();
    let index = |u: f32| (u >= 0.0 && u < len as f32).then_some(u as usize);
    [index(lo), if hi > lo { index(hi) } else { None }]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chain {
    Flushed,
    Accumulating { start: Point2i, last: Point2i },
}

/// Greedy gap-bounded chaining of ordered points into segments.
pub fn chain_points(points: &[Point2i], cfg: &SegmentConfig) -> Vec<LineSegment> {
    let mut out = Vec::new();
    let mut state = Chain::Flushed;

    for &p in points {
        state = match state {
            Chain::Accumulating { start, last } if last.distance(p) < cfg.max_gap => {
                Chain::Accumulating { start, last: p }
            }
            Chain::Accumulating { start, last } => {
                flush(&mut out, start, last, cfg.min_length);
                Chain::Accumulating { start: p, last: p }
            }
            Chain::Flushed => Chain::Accumulating { start: p, last: p },
        };
    }

    if let Chain::Accumulating { start, last } = state
        && cfg.final_run == FinalRun::Flush
    {
        flush(&mut out, start, last, cfg.min_length);
    }
    out
}

fn flush(out: &mut Vec<LineSegment>, start: Point2i, last: Point2i, min_length: f32) {
    let seg = LineSegment::new(start, last);
    if seg.length() >= min_length {
        out.push(seg);
    }
}
