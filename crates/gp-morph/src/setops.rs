//! Pixelwise set operations between two grids.
//!
//! Operands may differ in size. The result spans `max(width) x max(height)`
//! and any sample outside an operand reads as `T::default()` (zero).

use gp_core::{Image, ImageView};
use log::debug;

/// Equality-gated AND: keeps `a[p]` where `a[p] == b[p]`, otherwise zero.
///
/// This is meant for label grids; on grayscale data it only keeps pixels that
/// happen to agree exactly.
pub fn and<T: Copy + PartialEq + Default>(a: &ImageView<'_, T>, b: &ImageView<'_, T>) -> Image<T> {
    combine(a, b, |va, vb| if va == vb { va } else { T::default() })
}

/// OR: nonzero wherever either operand is nonzero.
///
/// The value kept is `a[p]` when it is nonzero and `b[p]` otherwise. A rule
/// that always kept `a[p]` would zero every pixel set only in `b`, so the
/// left operand wins only where both are set.
pub fn or<T: Copy + PartialEq + Default>(a: &ImageView<'_, T>, b: &ImageView<'_, T>) -> Image<T> {
    let zero = T::default();
    combine(a, b, |va, vb| if va != zero { va } else { vb })
}

fn combine<T: Copy + Default>(
    a: &ImageView<'_, T>,
    b: &ImageView<'_, T>,
    f: impl Fn(T, T) -> T,
) -> Image<T> {
    let width = a.width().max(b.width());
    let height = a.height().max(b.height());
    if a.dims() != b.dims() {
        debug!(
            "set operation on {}x{} and {}x{}: zero-filling to {width}x{height}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        );
    }

    Image::from_fn(width, height, |x, y| {
        let va = a.get(x, y).copied().unwrap_or_default();
        let vb = b.get(x, y).copied().unwrap_or_default();
        f(va, vb)
    })
}
