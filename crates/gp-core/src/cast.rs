//! Explicit narrowing conversions.
//!
//! Every float-to-intensity conversion in the workspace goes through
//! [`saturate_u8`]: values are clamped to `[0, 255]` and then truncated toward
//! zero. NaN maps to `0`. Nothing wraps.

#[inline]
pub fn saturate_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0) as u8
}

#[inline]
pub fn saturate_u8_from_u32(v: u32) -> u8 {
    v.min(u32::from(u8::MAX)) as u8
}
