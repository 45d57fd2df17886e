//! # Utility Module
//!
//! Numeric helpers for the probability knobs in configs and themes.

/// Restricts `value` to `[min, max]`.
///
/// ```
/// use dungeon_forge::utils::util::clamp;
///
/// assert_eq!(clamp(12, 0, 10), 10);
/// assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
/// ```
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamps a probability into `[0, 1]`.
pub fn clamp_unit(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

/// `density * multiplier`, kept a valid probability.
pub fn scale_density(density: f64, multiplier: f64) -> f64 {
    clamp_unit(density * multiplier)
}
