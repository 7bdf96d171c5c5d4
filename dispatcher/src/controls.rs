use common::channel::RAW_MAX;

/// Map a raw controller reading onto a declared attribute range.
/// `0` maps to `min` and `RAW_MAX` maps to `max`. Readings outside of
/// `[0, RAW_MAX]` extrapolate past the range rather than clamp, so a
/// miswired channel is visible in the scene instead of pinned at a bound.
pub fn scale_reading(raw: i32, min: f64, max: f64) -> f64 {
    (max - min) * (raw as f64 / RAW_MAX as f64) + min
}
