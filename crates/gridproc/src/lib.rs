//! Umbrella crate for the `gridproc` workspace.
//!
//! Re-exports every stage crate and adds [`pipeline`], the fixed edge
//! pipelines built from them.

pub mod pipeline;

pub use gp_contour::*;
pub use gp_core::*;
pub use gp_edge::*;
pub use gp_filter::*;
pub use gp_morph::*;
pub use gp_pyr::*;
