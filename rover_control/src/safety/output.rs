//! Actuator command sanitizing.

/// Coerce non-finite values to zero and clamp to ±`limit`.
///
/// A non-finite or negative `limit` collapses the range to zero.
#[inline]
pub fn sanitize_output(value: f64, limit: f64) -> f64 {
    let limit = if limit.is_finite() { limit.max(0.0) } else { 0.0 };
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(-limit, limit)
}
