//! Harris corner score `Q = (A B - C^2) - alpha (A + B)^2` with
//! `A = sum Ix^2`, `B = sum Iy^2`, `C = sum Ix Iy` over a square window.
//!
//! Derivatives come from the central-difference kernels of `gp-filter`. Window
//! taps outside the grid are skipped.

use gp_core::{Image, ImageView, offset_point};
use gp_filter::{central_difference_x, central_difference_y, convolve_f32};

#[derive(Debug, Clone)]
pub struct Gradients {
    pub ix: Image<f32>,
    pub iy: Image<f32>,
}

impl Gradients {
    pub fn new(level: &ImageView<'_, f32>) -> Self {
        Self {
            ix: convolve_f32(level, &central_difference_x()),
            iy: convolve_f32(level, &central_difference_y()),
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        self.ix.dims()
    }
}

pub fn corner_score_at(grads: &Gradients, x: usize, y: usize, radius: usize, alpha: f32) -> f32 {
    let (w, h) = grads.dims();
    let (ix, iy) = (grads.ix.as_view(), grads.iy.as_view());
    let r = radius as isize;

    let (mut a, mut b, mut c) = (0.0f32, 0.0f32, 0.0f32);
    for dy in -r..=r {
        for dx in -r..=r {
            let Some((sx, sy)) = offset_point(x, y, dx, dy, w, h) else {
                continue;
            };
            let gx = ix.at(sx, sy);
            let gy = iy.at(sx, sy);
            a += gx * gx;
            b += gy * gy;
            c += gx * gy;
        }
    }

    let trace = a + b;
    (a * b - c * c) - alpha * trace * trace
}

/// Dense Harris response of a level.
pub fn harris_response(level: &ImageView<'_, f32>, radius: usize, alpha: f32) -> Image<f32> {
    let grads = Gradients::new(level);
    level.map_coords(|x, y| corner_score_at(&grads, x, y, radius, alpha))
}

#[cfg(test)]
mod tests {
    use gp_core::Image;

    use super::harris_response;

    fn quadrant() -> Image<f32> {
        Image::from_fn(20, 20, |x, y| if x >= 10 && y >= 10 { 100.0 } else { 0.0 })
    }

    #[test]
    fn corner_edge_and_flat_regions() {
        let q = harris_response(&quadrant().as_view(), 1, 0.04);

        let corner = *q.get(10, 10).expect("inside");
        let edge = *q.get(10, 15).expect("inside");
        let flat = *q.get(4, 4).expect("inside");

        assert!((corner - 7.775e7).abs() < 1.0e3, "corner score {corner}");
        assert!(edge < 0.0);
        assert_eq!(flat, 0.0);
    }

    #[test]
    fn larger_alpha_lowers_the_score() {
        let img = quadrant();
        let low = harris_response(&img.as_view(), 1, 0.04);
        let high = harris_response(&img.as_view(), 1, 0.2);
        assert!(high.get(10, 10) < low.get(10, 10));
    }
}
