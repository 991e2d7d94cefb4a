use crate::FlError;

/// Floating point type used throughout the workspace.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FlError::NonFinite { what, value: v })
    }
}

/// `x * |x|`, the sign-preserving square used by quadratic loss laws.
#[inline]
pub fn signed_square(x: Real) -> Real {
    x * x.abs()
}

/// Area of a circle from its diameter.
#[inline]
pub fn circle_area(diameter: Real) -> Real {
    core::f64::consts::PI * diameter * diameter / 4.0
}
