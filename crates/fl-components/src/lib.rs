//! fl-components: lumped flow elements for liquid feed systems.
//!
//! Provides:
//! - `Pipe` with Colebrook-White, Churchill or tabulated friction, bends and elevation
//! - `Orifice` with sharp, rounded and beveled edge correlations
//! - `Reducer` for contractions and enlargements
//! - `Tee` and `Manifold` junctions
//! - `ThrustChamber`, a choked-throat sink
//!
//! Every element implements `FlowElement`: a fixed number of steady residuals
//! (one per port) plus the storage and stiffness terms used for
//! frequency-domain analysis. `ElementKind` wraps them all so one circuit can
//! hold a mix.
//!
//! # Example
//!
//! ```
//! use fl_components::{FlowElement, Pipe};
//! use fl_core::units::{kgpm3, m, pas};
//! use fl_core::{NodeId, StateVector};
//! use fl_fluids::FluidState;
//!
//! let pipe = Pipe::new(m(1.0), m(0.02), m(1e-5)).unwrap();
//! let fluid = FluidState::new(kgpm3(998.2), pas(1.002e-3)).unwrap();
//! let state = StateVector {
//!     pressures: vec![5e5, 4e5],
//!     mass_flows: vec![1.0, 1.0],
//! };
//! let ports = [NodeId::from_index(0), NodeId::from_index(1)];
//! let r = pipe.steady_flow_eqns(&ports, &state, &fluid).unwrap();
//! assert_eq!(r.len(), 2);
//! ```

pub mod common;
pub mod correlations;
pub mod element;
pub mod error;
pub mod junction;
pub mod orifice;
pub mod pipe;
pub mod reducer;
pub mod thrust_chamber;
pub mod traits;

pub use element::ElementKind;
pub use error::{ComponentError, ComponentResult, RangeWarning};
pub use junction::{FlowConfig, Manifold, Tee};
pub use orifice::Orifice;
pub use pipe::{Bend, FrictionCurve, FrictionModel, Pipe};
pub use reducer::Reducer;
pub use thrust_chamber::{ThrustChamber, ideal_exit_velocity, ideal_mass_flow};
pub use traits::{FlowElement, RowTerms, Term, Var, port_nodes};
