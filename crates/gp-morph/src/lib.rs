//! Grayscale morphology over structuring elements.
//!
//! Erosion and dilation take the extremum over the element's "on" taps. The
//! center pixel always seeds the extremum and taps outside the grid are
//! skipped, so a flat grid is a fixed point of both operations.
//!
//! For binary grids (`0`/`1` labels or `0`/`255` intensities) these reduce to
//! the usual binary morphology.

mod element;
mod ops;
mod setops;

pub use element::{Shape, StructuringElement};
pub use ops::{close, dilate, erode, open};
pub use setops::{and, or};
