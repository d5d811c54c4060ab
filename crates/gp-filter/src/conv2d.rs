//! 2D convolution with the skip border policy.
//!
//! Output `(x, y)` accumulates `src[x + rx - kx, y + ry - ky] * k[kx, ky]`, so
//! the kernel is mirrored relative to naive indexing (true convolution, not
//! correlation). Taps whose source pixel lies outside the grid are left out of
//! the sum entirely; near borders sums therefore run low (positive kernels) or
//! lose cancellation (signed kernels). Accumulation is always in `f32`.

use gp_core::{Image, ImageView, offset_index, saturate_u8};

use crate::kernels::Kernel;

/// Intensity convolution: `|sum|` saturated to `[0, 255]`.
pub fn convolve(src: &ImageView<'_, u8>, kernel: &Kernel) -> Image<u8> {
    let acc = convolve_f32(src, kernel);
    acc.as_view().map(|v| saturate_u8(v.abs()))
}

/// Signed convolution without rectification or narrowing.
pub fn convolve_f32<T: Copy + Into<f32>>(src: &ImageView<'_, T>, kernel: &Kernel) -> Image<f32> {
    let w = src.width();
    let h = src.height();
    let rx = kernel.radius_x();
    let ry = kernel.radius_y();

    let mut out = Image::new_fill(w, h, 0.0f32);
    let dst = out.data_mut();

    for y in 0..h {
        let interior_y = y >= ry && y + ry < h;
        for x in 0..w {
            let interior = interior_y && x >= rx && x + rx < w;
            dst[y * w + x] = if interior {
                convolve_interior(src, kernel, x, y)
            } else {
                convolve_border(src, kernel, x, y)
            };
        }
    }

    out
}

#[inline]
fn convolve_interior<T: Copy + Into<f32>>(
    src: &ImageView<'_, T>,
    kernel: &Kernel,
    x: usize,
    y: usize,
) -> f32 {
    let kw = kernel.width();
    let kh = kernel.height();
    let base_x = x - kernel.radius_x();
    let base_y = y - kernel.radius_y();

    let mut acc = 0.0f32;
    for ky in 0..kh {
        // Source row for kernel row `ky` is mirrored around the anchor.
        let row = src.row(base_y + (kh - 1 - ky));
        for kx in 0..kw {
            acc += row[base_x + (kw - 1 - kx)].into() * kernel.at(kx, ky);
        }
    }
    acc
}

fn convolve_border<T: Copy + Into<f32>>(
    src: &ImageView<'_, T>,
    kernel: &Kernel,
    x: usize,
    y: usize,
) -> f32 {
    let rx = kernel.radius_x() as isize;
    let ry = kernel.radius_y() as isize;

    let mut acc = 0.0f32;
    for ky in 0..kernel.height() {
        let Some(sy) = offset_index(y, ry - ky as isize, src.height()) else {
            continue;
        };
        for kx in 0..kernel.width() {
            let Some(sx) = offset_index(x, rx - kx as isize, src.width()) else {
                continue;
            };
            acc += src.at(sx, sy).into() * kernel.at(kx, ky);
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use gp_core::Image;
    use proptest::prelude::*;

    use crate::conv2d::{convolve, convolve_f32};
    use crate::kernels::{Kernel, central_difference_x, gaussian_kernel};

    #[test]
    fn kernel_is_mirrored() {
        // A kernel with its only tap on the right samples the pixel to the left.
        let src = Image::from_vec(3, 1, vec![10u8, 20, 30]).expect("valid image");
        let k = Kernel::new(3, 1, vec![0.0, 0.0, 1.0]).expect("valid kernel");
        let out = convolve(&src.as_view(), &k);
        assert_eq!(out.data(), &[0, 10, 20]);
    }

    #[test]
    fn out_of_bounds_taps_are_skipped() {
        let src = Image::new_fill(3, 3, 9u8);
        let k = Kernel::new(3, 3, vec![1.0; 9]).expect("valid kernel");
        let out = convolve(&src.as_view(), &k);
        assert_eq!(out.data(), &[36, 54, 36, 54, 81, 54, 36, 54, 36]);
    }

    #[test]
    fn output_is_absolute_and_saturated() {
        let src = Image::from_vec(3, 1, vec![0u8, 0, 200]).expect("valid image");
        let dx = central_difference_x();
        let signed = convolve_f32(&src.as_view(), &dx);
        assert_eq!(signed.data(), &[0.0, -100.0, 0.0]);

        let rect = convolve(&src.as_view(), &dx);
        assert_eq!(rect.data(), &[0, 100, 0]);

        let gain = Kernel::new(1, 1, vec![4.0]).expect("valid kernel");
        assert_eq!(convolve(&src.as_view(), &gain).data(), &[0, 0, 255]);
    }

    #[test]
    fn non_contiguous_views_convolve_like_packed_images() {
        let data = vec![
            1u8, 2, 3, 0, // row 0
            4, 5, 6, 0, // row 1
            7, 8, 9, 0, // row 2
        ];
        let strided = gp_core::ImageView::from_slice(3, 3, 4, &data).expect("valid view");
        let packed = strided.to_image();
        let k = gaussian_kernel(3, 0.8).expect("valid kernel");
        assert_eq!(
            convolve(&strided, &k).data(),
            convolve(&packed.as_view(), &k).data()
        );
    }

    #[test]
    fn float_input_is_accepted() {
        let src = Image::from_vec(2, 2, vec![1.0f32, 2.0, 3.0, 4.0]).expect("valid image");
        let k = Kernel::identity(3).expect("valid kernel");
        assert_eq!(convolve_f32(&src.as_view(), &k).data(), src.data());
    }

    proptest! {
        #[test]
        fn identity_kernel_reproduces_input(
            w in 1usize..9,
            h in 1usize..9,
            half in 0usize..3,
            seed in prop::collection::vec(0..=255u8, 64),
        ) {
            let img = Image::from_fn(w, h, |x, y| seed[(y * 8 + x) % seed.len()]);
            let k = Kernel::identity(2 * half + 1).expect("valid kernel");
            let out = convolve(&img.as_view(), &k);
            prop_assert_eq!(out.data(), img.data());
        }
    }
}
