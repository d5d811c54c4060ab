use gp_core::{Error, Image, ImageView, offset_index};

/// Median over a square window of radius `(size - 1) / 2`.
///
/// Only in-bounds neighbors are collected, so windows shrink near borders.
/// For an even sample count the lower median (index `(count - 1) / 2`) wins.
pub fn median_filter(src: &ImageView<'_, u8>, size: usize) -> Result<Image<u8>, Error> {
    if size == 0 {
        return Err(Error::InvalidDimension {
            width: size,
            height: size,
        });
    }

    let r = ((size - 1) / 2) as isize;
    let mut window = Vec::with_capacity(size * size);

    Ok(src.map_coords(|x, y| {
        window.clear();
        for dy in -r..=r {
            let Some(sy) = offset_index(y, dy, src.height()) else {
                continue;
            };
            let row = src.row(sy);
            for dx in -r..=r {
                if let Some(sx) = offset_index(x, dx, src.width()) {
                    window.push(row[sx]);
                }
            }
        }
        window.sort_unstable();
        window[(window.len() - 1) / 2]
    }))
}
