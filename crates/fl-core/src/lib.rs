//! fl-core: shared foundation for feedline.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + float helpers)
//! - ids (stable compact IDs for elements and nodes)
//! - state (the pressure / mass-flow state vector)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod state;
pub mod units;

pub use error::{FlError, FlResult};
pub use ids::*;
pub use numeric::*;
pub use state::StateVector;
pub use units::*;
