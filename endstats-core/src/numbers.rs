//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;
use std::borrow::Cow;

/// Fractional bits carried by the host's fixed-point scalars.
pub const FIXED_POINT_FRACTION_BITS: u32 = 16;

/// Truncate a graph abscissa toward zero, returning `None` for non-finite values.
#[must_use]
pub fn truncate_turn(value: f32) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    let min = cast::<i32, f32>(i32::MIN).unwrap_or(f32::MIN);
    let max = cast::<i32, f32>(i32::MAX).unwrap_or(f32::MAX);
    cast::<f32, i32>(value.clamp(min, max).trunc())
}

/// Clamp a f64 to the f32 range and downcast, returning 0.0 for non-finite values.
#[must_use]
pub fn clamp_f64_to_f32(value: f64) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let min = cast::<f32, f64>(f32::MIN).unwrap_or(f64::MIN);
    let max = cast::<f32, f64>(f32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max);
    cast::<f64, f32>(clamped).unwrap_or(0.0)
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Clamp an i64 into the i32 range.
#[must_use]
pub fn saturate_i64_to_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Saturating length-to-count conversion for serialized counters.
#[must_use]
pub fn count_to_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert a raw fixed-point value to floating point.
#[must_use]
pub fn fixed_raw_to_f64(raw: i64) -> f64 {
    let scale = f64::from(1_u32 << FIXED_POINT_FRACTION_BITS);
    cast::<i64, f64>(raw).map_or(0.0, |value| value / scale)
}

/// Best-effort parse of a scalar's textual form, returning 0.0 when unparseable.
///
/// A single `,` is read as the decimal separator.
#[must_use]
pub fn parse_scalar_text(text: &str) -> f64 {
    let text = text.trim();
    let normalized = if text.matches(',').count() == 1 && !text.contains('.') {
        Cow::Owned(text.replacen(',', ".", 1))
    } else {
        Cow::Borrowed(text)
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}
