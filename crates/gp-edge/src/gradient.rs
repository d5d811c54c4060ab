use gp_core::{Error, Image, ImageView, saturate_u8};
use gp_filter::{Kernel, central_difference_x, central_difference_y, convolve};

/// `sqrt(Dx^2 + Dy^2)` of the two rectified directional convolutions,
/// saturated to `[0, 255]`.
pub fn gradient_magnitude(
    src: &ImageView<'_, u8>,
    h_kernel: &Kernel,
    v_kernel: &Kernel,
) -> Image<u8> {
    let dx = convolve(src, h_kernel);
    let dy = convolve(src, v_kernel);
    combine(&dx.as_view(), &dy.as_view())
}

/// Combines precomputed derivative grids of equal size.
pub fn gradient_magnitude_from(
    dx: &ImageView<'_, u8>,
    dy: &ImageView<'_, u8>,
) -> Result<Image<u8>, Error> {
    if dx.dims() != dy.dims() {
        return Err(Error::DimensionMismatch {
            expected: dx.dims(),
            actual: dy.dims(),
        });
    }
    Ok(combine(dx, dy))
}

/// Gradient magnitude with the `[-0.5, 0, 0.5]` central-difference pair.
pub fn central_difference_gradient(src: &ImageView<'_, u8>) -> Image<u8> {
    gradient_magnitude(src, &central_difference_x(), &central_difference_y())
}

fn combine(dx: &ImageView<'_, u8>, dy: &ImageView<'_, u8>) -> Image<u8> {
    dx.map_coords(|x, y| {
        let gx = f32::from(dx.at(x, y));
        let gy = f32::from(dy.at(x, y));
        saturate_u8((gx * gx + gy * gy).sqrt())
    })
}
