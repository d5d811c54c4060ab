use gp_core::{Error, Image, ImageView, Point2i};
use log::debug;

use crate::harris::{Gradients, corner_score_at};
use crate::scale_space::{Octave, ScaleSpace, ScaleSpaceConfig};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keypoint {
    /// Location in base-image pixels.
    pub position: Point2i,
    pub octave: usize,
    /// Index of the difference level the extremum was found in.
    pub scale_index: usize,
    /// Blur of that level in base-image pixels.
    pub sigma: f32,
    /// Signed difference-of-Gaussian value.
    pub response: f32,
    pub corner_score: f32,
}

/// Scale-space extrema that also look like corners.
///
/// A candidate is a strict maximum or minimum of its 26 neighbors in
/// `(x, y, scale)`, has `|DoG|` above the contrast threshold, lies outside the
/// border margin and has a Harris score above the corner threshold on its
/// Gaussian level. Candidates are visited octave by octave, then by scale and
/// raster order; one closer than `min_distance` to an already kept keypoint is
/// dropped.
pub fn detect_keypoints(
    src: &ImageView<'_, u8>,
    cfg: &ScaleSpaceConfig,
) -> Result<Vec<Keypoint>, Error> {
    let space = ScaleSpace::build(src, cfg)?;
    Ok(keypoints_in(&space, cfg))
}

/// Keypoint selection over an already built scale space.
pub fn keypoints_in(space: &ScaleSpace, cfg: &ScaleSpaceConfig) -> Vec<Keypoint> {
    let mut candidates = Vec::new();
    for octave in space.octaves() {
        collect_octave(octave, cfg, &mut candidates);
    }
    let found = candidates.len();
    let kept = suppress_duplicates(candidates, cfg.min_distance);
    debug!("detect_keypoints: {found} extrema, {} kept", kept.len());
    kept
}

fn collect_octave(octave: &Octave, cfg: &ScaleSpaceConfig, out: &mut Vec<Keypoint>) {
    let (w, h) = octave.dims();
    let m = cfg.border_margin.max(1);
    if w <= 2 * m || h <= 2 * m {
        return;
    }
    let scale = octave.scale();

    for s in 1..octave.dogs.len().saturating_sub(1) {
        let mut grads: Option<Gradients> = None;
        for y in m..h - m {
            for x in m..w - m {
                let v = octave.dogs[s].as_view().at(x, y);
                if v.abs() <= cfg.contrast_threshold || !is_extremum(&octave.dogs, s, x, y, v) {
                    continue;
                }
                let g = grads.get_or_insert_with(|| Gradients::new(&octave.gaussians[s].as_view()));
                let q = corner_score_at(g, x, y, cfg.window_radius, cfg.corner_alpha);
                if q <= cfg.corner_threshold {
                    continue;
                }
                out.push(Keypoint {
                    position: Point2i::from((x * scale, y * scale)),
                    octave: octave.index,
                    scale_index: s,
                    sigma: octave.sigmas[s] * scale as f32,
                    response: v,
                    corner_score: q,
                });
            }
        }
    }
}

fn is_extremum(dogs: &[Image<f32>], s: usize, x: usize, y: usize, v: f32) -> bool {
    let levels: [ImageView<'_, f32>; 3] = [
        dogs[s - 1].as_view(),
        dogs[s].as_view(),
        dogs[s + 1].as_view(),
    ];
    let mut is_max = true;
    let mut is_min = true;
    for (ls, level) in levels.iter().enumerate() {
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if ls == 1 && nx == x && ny == y {
                    continue;
                }
                let n = level.at(nx, ny);
                is_max &= v > n;
                is_min &= v < n;
                if !is_max && !is_min {
                    return false;
                }
            }
        }
    }
    true
}

fn suppress_duplicates(candidates: Vec<Keypoint>, min_distance: f32) -> Vec<Keypoint> {
    let mut kept: Vec<Keypoint> = Vec::with_capacity(candidates.len());
    for kp in candidates {
        if kept
            .iter()
            .all(|k| k.position.distance(kp.position) >= min_distance)
        {
            kept.push(kp);
        }
    }
    kept
}
