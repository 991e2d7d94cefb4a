//! Common utilities for component calculations.

use fl_core::numeric::ensure_finite;

use crate::error::{ComponentError, ComponentResult};

/// Flows below this magnitude are treated as stagnant (kg/s).
pub const EPSILON_MDOT: f64 = 1e-12;

/// Reynolds number below which flow is taken as laminar.
pub const RE_LAMINAR: f64 = 2100.0;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    let v = check_finite(value, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(ComponentError::NonPhysical { what })
    }
}

/// Ensure a value is finite and not negative.
pub fn check_non_negative(value: f64, what: &'static str) -> ComponentResult<f64> {
    let v = check_finite(value, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(ComponentError::NonPhysical { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_positive() {
        assert!(check_positive(0.0, "d").is_err());
        assert!(check_non_negative(0.0, "l").is_ok());
        assert!(check_non_negative(-1e-9, "l").is_err());
    }
}
