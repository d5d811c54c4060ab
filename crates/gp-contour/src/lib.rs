//! Moore-neighbor boundary tracing on `{0, 1}` label grids.
//!
//! The tracer starts at the first foreground pixel in column-major order and
//! walks the outer boundary clockwise (in image coordinates, y down), returning
//! the visited pixels in order without repeating the start.
//!
//! A candidate neighbor only counts as a boundary pixel if one of the on-taps
//! of the structuring element around it is background or outside the grid, so
//! the element decides how "thick" the boundary test is:
//! - [`gp_morph::Shape::Plus`]: 4-connected background test.
//! - [`gp_morph::Shape::Square`]: 8-connected background test.
//!
//! The probe direction lives in an explicit [`Compass`] value that each
//! [`trace_step`] consumes and returns; nothing is kept between calls.

mod compass;
mod trace;

pub use compass::{Compass, DIRECTIONS};
pub use trace::{find_start, is_boundary_pixel, trace_boundary, trace_step};
