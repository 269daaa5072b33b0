pub(crate) const NEARLY_ZERO: f32 = 1.0 / (1 << 12) as f32;

pub(crate) fn nearly_zero(v: f32) -> bool {
    v.abs() <= NEARLY_ZERO
}

pub(crate) fn nearly_equal(a: f32, b: f32) -> bool {
    nearly_zero(a - b)
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Largest representable frame strictly below `out_point`, never below `in_point`.
pub(crate) fn last_valid_frame(in_point: f32, out_point: f32) -> f32 {
    out_point.next_down().max(in_point)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
