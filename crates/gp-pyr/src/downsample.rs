use gp_core::{Error, Image, ImageView};

fn dst_dims(src_w: usize, src_h: usize) -> Result<(usize, usize), Error> {
    let (w, h) = (src_w / 2, src_h / 2);
    if w == 0 || h == 0 {
        return Err(Error::InvalidDimension {
            width: w,
            height: h,
        });
    }
    Ok((w, h))
}

/// 2x2 box mean with the drop-odd policy; a source narrower or shorter than 2
/// has no output level and yields [`Error::InvalidDimension`].
pub fn downsample2x2_mean_f32(src: &ImageView<'_, f32>) -> Result<Image<f32>, Error> {
    downsample_with(src, |v| v)
}

pub fn downsample2x2_mean_u8_to_f32(src: &ImageView<'_, u8>) -> Result<Image<f32>, Error> {
    downsample_with(src, f32::from)
}

fn downsample_with<T: Copy>(
    src: &ImageView<'_, T>,
    to_f32: impl Fn(T) -> f32,
) -> Result<Image<f32>, Error> {
    let (dst_w, dst_h) = dst_dims(src.width(), src.height())?;
    let mut data = Vec::with_capacity(dst_w * dst_h);
    for y in 0..dst_h {
        let row0 = &src.row(2 * y)[..2 * dst_w];
        let row1 = &src.row(2 * y + 1)[..2 * dst_w];
        data.extend(row0.chunks_exact(2).zip(row1.chunks_exact(2)).map(|(a, b)| {
            (to_f32(a[0]) + to_f32(a[1]) + to_f32(b[0]) + to_f32(b[1])) * 0.25
        }));
    }
    Image::from_vec(dst_w, dst_h, data)
}
