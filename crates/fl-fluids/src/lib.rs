//! fl-fluids: liquid property collaborators for feedline.
//!
//! Provides:
//! - `FluidProperties`, the temperature-indexed property trait
//! - `ConstantFluid` for fixed properties (plus a water preset)
//! - `TabulatedFluid`, piecewise-linear interpolation over reference tables
//! - `FluidState`, the per-element snapshot consumed by flow elements
//!
//! # Example
//!
//! ```
//! use fl_core::units::k;
//! use fl_fluids::{ConstantFluid, FluidProperties};
//!
//! let water = ConstantFluid::water();
//! let state = water.state(k(293.15)).unwrap();
//! assert!(state.density > 990.0);
//! ```

pub mod constant;
pub mod error;
pub mod model;
pub mod state;
pub mod tabulated;

pub use constant::ConstantFluid;
pub use error::{FluidError, FluidResult};
pub use model::{Conductivity, FluidProperties, SpecHeat, T_STP};
pub use state::FluidState;
pub use tabulated::{PropertyRow, TabulatedFluid};
