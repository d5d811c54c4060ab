//! Edge strength and straight-line detection.
//!
//! - [`gradient`] combines horizontal and vertical derivative responses into a
//!   Euclidean magnitude.
//! - [`hough`] votes binary edge pixels into a `(theta, r)` accumulator with
//!   360 one-degree theta bins and `2 * diag` radius bins, and extracts peaks.
//! - [`segments`] walks the line of a peak across the grid and chains
//!   foreground pixels into bounded segments.
//!
//! The Hough radius uses a bottom-left origin: a pixel at `(x, y)` votes with
//! `r = x cos(theta) + (H - y) sin(theta)`, stored at row `r + diag`.

pub mod gradient;
pub mod hough;
pub mod segments;

pub use gradient::{central_difference_gradient, gradient_magnitude, gradient_magnitude_from};
pub use hough::{
    EDGE_VALUE, HoughAccumulator, HoughLine, PeakConfig, PeakMode, THETA_BINS, find_peaks,
    find_peaks_with, hough_diag, hough_transform,
};
pub use segments::{
    FinalRun, SegmentConfig, chain_points, collect_line_points, detect_line_segments,
    detect_line_segments_with,
};
