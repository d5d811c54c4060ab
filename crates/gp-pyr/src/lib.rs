//! Exploratory multi-scale keypoint detection.
//!
//! A difference-of-Gaussians scale space is built over a few octaves, each
//! octave halving the previous one with a 2x2 box mean. Extrema of the DoG
//! stack are then screened with a Harris corner score and a naive "drop later
//! duplicate" rule. This stage is scaffolding: there is no subpixel
//! refinement, orientation or descriptor, and thresholds are in raw intensity
//! units.
//!
//! Drop-odd policy:
//! - Output size is `(src.width() / 2, src.height() / 2)`.
//! - If source width or height is odd, the last column/row is dropped.

mod downsample;
mod harris;
mod keypoints;
mod scale_space;

pub use downsample::{downsample2x2_mean_f32, downsample2x2_mean_u8_to_f32};
pub use harris::{Gradients, corner_score_at, harris_response};
pub use keypoints::{Keypoint, detect_keypoints, keypoints_in};
pub use scale_space::{Octave, ScaleSpace, ScaleSpaceConfig};
