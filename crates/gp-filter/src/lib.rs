//! Linear, rank and point filters.
//!
//! Every function allocates and returns a fresh grid; inputs are only read.
//! Neighborhood filters follow the skip border policy documented in `gp-core`.

pub mod conv2d;
pub mod kernels;
pub mod median;
pub mod point;

pub use conv2d::{convolve, convolve_f32};
pub use kernels::{
    Kernel, central_difference_x, central_difference_y, gaussian_kernel,
    gaussian_kernel_for_sigma,
};
pub use median::median_filter;
pub use point::{
    BinaryLevels, DEFAULT_MASK_THRESHOLD, binarize, invert, min_max, stretch_contrast,
    threshold, to_binary_mask, to_grayscale, to_grayscale_with_progress,
};
