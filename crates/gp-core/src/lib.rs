//! Foundational primitives for pixel-grid processing.
//!
//! ## Grids and Stride
//! Grids use element stride (not byte stride). `stride` is the distance, in
//! elements, between adjacent row starts and may be greater than `width`.
//! Both dimensions of every grid are non-zero.
//!
//! ## Border Policy
//! Neighborhood operations in this workspace skip taps that fall outside the
//! grid. There is no padding, clamping or mirroring: a skipped tap simply does
//! not contribute to a sum, a rank or an extremum.
//!
//! ## Narrowing
//! Float results are converted to intensities with [`saturate_u8`].

mod cast;
mod error;
mod geom;
mod image;
mod neighborhood;
mod pixel;

pub use cast::{saturate_u8, saturate_u8_from_u32};
pub use error::Error;
pub use geom::{LineSegment, Point2i};
pub use image::{Image, ImageView, to_f32};
pub use neighborhood::{offset_index, offset_point};
pub use pixel::Rgb8;
