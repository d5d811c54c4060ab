//! Per-pixel intensity transforms.

use gp_core::{Error, Image, ImageView, Rgb8};
use log::debug;

/// Mask threshold used when callers do not supply one.
pub const DEFAULT_MASK_THRESHOLD: u8 = 127;

/// Output levels of a binarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryLevels {
    /// `0` / `255`, for display and the Hough stage.
    #[default]
    Intensity,
    /// `0` / `1`, the label representation expected by the boundary tracer.
    Label,
}

impl BinaryLevels {
    pub fn foreground(self) -> u8 {
        match self {
            Self::Intensity => u8::MAX,
            Self::Label => 1,
        }
    }
}

pub fn to_grayscale(src: &ImageView<'_, Rgb8>) -> Image<u8> {
    src.map(Rgb8::average)
}

/// Same as [`to_grayscale`], reporting `(done, total)` after every pixel.
pub fn to_grayscale_with_progress(
    src: &ImageView<'_, Rgb8>,
    mut on_pixel: impl FnMut(usize, usize),
) -> Image<u8> {
    let total = src.width() * src.height();
    let mut done = 0usize;
    src.map(|px| {
        done += 1;
        on_pixel(done, total);
        px.average()
    })
}

/// Bitwise complement of every sample.
pub fn invert(src: &ImageView<'_, u8>) -> Image<u8> {
    src.map(|v| !v)
}

/// Smallest and largest sample.
pub fn min_max(src: &ImageView<'_, u8>) -> (u8, u8) {
    let mut lo = u8::MAX;
    let mut hi = u8::MIN;
    for y in 0..src.height() {
        for &v in src.row(y) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo, hi)
}

/// Affine remap of `[min, max]` onto `[0, 255]` with integer truncation.
///
/// A flat grid has no range to stretch and yields [`Error::DegenerateRange`].
pub fn stretch_contrast(src: &ImageView<'_, u8>) -> Result<Image<u8>, Error> {
    let (lo, hi) = min_max(src);
    if lo == hi {
        return Err(Error::DegenerateRange { value: lo });
    }

    debug!("stretch_contrast: source range [{lo}, {hi}]");
    let range = u32::from(hi - lo);
    Ok(src.map(|v| (u32::from(v - lo) * 255 / range) as u8))
}

/// `v > t` becomes the foreground level of `levels`, everything else `0`.
pub fn binarize(src: &ImageView<'_, u8>, t: u8, levels: BinaryLevels) -> Image<u8> {
    let on = levels.foreground();
    src.map(|v| if v > t { on } else { 0 })
}

pub fn threshold(src: &ImageView<'_, u8>, t: u8) -> Image<u8> {
    binarize(src, t, BinaryLevels::Intensity)
}

pub fn to_binary_mask(src: &ImageView<'_, u8>, t: u8) -> Image<u8> {
    binarize(src, t, BinaryLevels::Label)
}
