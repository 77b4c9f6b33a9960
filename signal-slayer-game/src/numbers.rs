//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;
use std::time::Duration;

/// Convert a duration into fractional seconds as f32, returning 0.0 for values that cannot be represented.
#[must_use]
pub fn duration_to_secs_f32(elapsed: Duration) -> f32 {
    let secs = elapsed.as_secs_f64();
    if !secs.is_finite() {
        return 0.0;
    }
    let max = cast::<f32, f64>(f32::MAX).unwrap_or(f64::MAX);
    cast::<f64, f32>(secs.min(max)).unwrap_or(0.0)
}

/// Convert u32 into f32 while allowing precision loss in a single location.
#[must_use]
pub fn u32_to_f32(value: u32) -> f32 {
    cast::<u32, f32>(value).unwrap_or(0.0)
}

/// Number of whole steps of at most `max_step` needed to cover `elapsed`.
#[must_use]
pub fn step_count(elapsed: Duration, max_step: Duration) -> u32 {
    if max_step.is_zero() || elapsed.is_zero() {
        return 0;
    }
    let steps = elapsed.as_nanos().div_ceil(max_step.as_nanos());
    u32::try_from(steps).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_converts_to_seconds() {
        assert!((duration_to_secs_f32(Duration::from_millis(250)) - 0.25).abs() < f32::EPSILON);
        assert!(duration_to_secs_f32(Duration::ZERO).abs() < f32::EPSILON);
    }

    #[test]
    fn counters_convert() {
        assert!((u32_to_f32(3) - 3.0).abs() < f32::EPSILON);
        assert!((u32_to_f32(u32::MAX) - 4_294_967_296.0).abs() < 1.0);
    }

    #[test]
    fn step_count_rounds_up() {
        let max = Duration::from_millis(50);
        assert_eq!(step_count(Duration::from_millis(16), max), 1);
        assert_eq!(step_count(Duration::from_millis(50), max), 1);
        assert_eq!(step_count(Duration::from_millis(51), max), 2);
        assert_eq!(step_count(Duration::from_millis(160), max), 4);
        assert_eq!(step_count(Duration::ZERO, max), 0);
        assert_eq!(step_count(Duration::from_millis(10), Duration::ZERO), 0);
    }
}
