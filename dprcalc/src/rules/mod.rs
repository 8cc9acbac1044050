pub mod abilities;
pub mod damage;
pub mod dice;
pub mod profile;

/// Returns the value as an integer if it is finite and has no fractional part.
pub(crate) fn whole_number(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}
