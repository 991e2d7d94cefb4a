//! Fluid property errors.

use fl_core::FlError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, viscosity, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Query outside the tabulated range.
    #[error("{what} = {value} outside table range [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Reference table is unusable.
    #[error("Invalid property table: {what}")]
    InvalidTable { what: &'static str },
}

impl From<FluidError> for FlError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what } => FlError::InvalidArg { what },
            FluidError::OutOfRange { what, .. } => FlError::InvalidArg { what },
            FluidError::InvalidTable { what } => FlError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::OutOfRange {
            what: "temperature",
            value: 500.0,
            min: 250.0,
            max: 450.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("temperature"));
        assert!(msg.contains("450"));
    }

    #[test]
    fn error_to_core_error() {
        let err: FlError = FluidError::InvalidTable { what: "rows" }.into();
        assert!(matches!(err, FlError::InvalidArg { .. }));
    }
}
