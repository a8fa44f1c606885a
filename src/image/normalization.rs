use crate::types::WindowLevel;

#[inline]
#[must_use]
pub fn find_min_max(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &val| {
            (min.min(val), max.max(val))
        })
}

/// Map `[min, min + range]` onto `[0, 255]`
#[inline]
#[must_use]
pub fn normalize_to_u8(value: f32, min: f32, range: f32) -> u8 {
    let normalized = (value - min) / range;
    // Saturating cast guards against rounding just outside the range
    (normalized * 255.0_f32) as u8
}

/// Clip to the window and stretch it across `[0, 255]`
#[inline]
#[must_use]
pub fn apply_window(value: f32, window: &WindowLevel) -> u8 {
    let width = window.width as f32;
    let lower = window.center as f32 - width / 2.0;
    let upper = lower + width;
    normalize_to_u8(value.clamp(lower, upper), lower, width)
}

/// Direct clamp to the displayable range
#[inline]
#[must_use]
pub fn clamp_to_u8(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// MONOCHROME1 inversion
#[inline(always)]
#[must_use]
pub fn invert(gray: u8) -> u8 {
    255 - gray
}
