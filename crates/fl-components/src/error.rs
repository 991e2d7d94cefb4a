//! Error and warning types for component operations.

use std::fmt;

use fl_core::error::FlError;
use fl_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur during component calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Missing parameter: {what}")]
    MissingParameter { what: &'static str },

    #[error("Expected {expected} port nodes, got {actual}")]
    PortMismatch { expected: usize, actual: usize },

    #[error("State error: {0}")]
    State(#[from] FlError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for FlError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what } => FlError::InvalidArg { what },
            ComponentError::InvalidArg { what } => FlError::InvalidArg { what },
            ComponentError::MissingParameter { what } => FlError::InvalidArg { what },
            ComponentError::PortMismatch { expected, actual } => FlError::IndexOob {
                what: "element ports",
                index: actual,
                len: expected,
            },
            ComponentError::State(inner) => inner,
            ComponentError::Fluid(inner) => inner.into(),
        }
    }
}

/// A correlation evaluated outside its validated range.
///
/// Not fatal: the value is still computed (usually clamped to the nearest
/// valid point), but the caller should be told which parameter strayed.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeWarning {
    pub parameter: &'static str,
    pub value: f64,
    pub limit: f64,
    pub note: &'static str,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {:.4} beyond limit {:.4}: {}",
            self.parameter, self.value, self.limit, self.note
        )
    }
}
