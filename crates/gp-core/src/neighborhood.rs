//! Neighborhood taps under the "skip" border policy.
//!
//! A tap is a source coordinate displaced from an output coordinate. Taps that
//! land outside the grid produce `None` and must not contribute; they are never
//! clamped, mirrored or wrapped.

#[inline]
pub fn offset_index(i: usize, offset: isize, len: usize) -> Option<usize> {
    let j = (i as isize).checked_add(offset)?;
    if j < 0 || j as usize >= len {
        return None;
    }
    Some(j as usize)
}

#[inline]
pub fn offset_point(
    x: usize,
    y: usize,
    dx: isize,
    dy: isize,
    width: usize,
    height: usize,
) -> Option<(usize, usize)> {
    Some((offset_index(x, dx, width)?, offset_index(y, dy, height)?))
}

#[cfg(test)]
mod tests {
    use super::{offset_index, offset_point};

    #[test]
    fn taps_outside_are_skipped_not_clamped() {
        assert_eq!(offset_index(0, -1, 5), None);
        assert_eq!(offset_index(0, 0, 5), Some(0));
        assert_eq!(offset_index(2, 2, 5), Some(4));
        assert_eq!(offset_index(4, 1, 5), None);
        assert_eq!(offset_index(1, -3, 5), None);
        assert_eq!(offset_index(0, 0, 0), None);
    }

    #[test]
    fn point_taps_need_both_axes_in_range() {
        assert_eq!(offset_point(1, 1, -1, 1, 3, 3), Some((0, 2)));
        assert_eq!(offset_point(1, 2, 0, 1, 3, 3), None);
        assert_eq!(offset_point(0, 1, -1, 0, 3, 3), None);
    }
}
