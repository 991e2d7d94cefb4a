//! Steady-state and frequency-domain solver for liquid feed networks.
//!
//! A `Model` borrows a meshed `Network` of flow elements, takes boundary
//! conditions at its boundary nodes and solves for one pressure and one mass
//! flow per node with a damped Newton iteration. About the steady point it
//! assembles the linearized mass, damping and stiffness matrices and finds
//! the system's eigenmodes; a mode with positive real part is a feed-system
//! instability.
//!
//! # Example
//!
//! ```
//! use fl_components::{ElementKind, Pipe};
//! use fl_core::units::{kgpm3, m, pa, pas};
//! use fl_core::NodeId;
//! use fl_fluids::FluidState;
//! use fl_network::{Circuit, Network};
//! use fl_solver::Model;
//!
//! let mut circuit = Circuit::new();
//! let pipe = Pipe::new(m(1.0), m(0.02), m(1.5e-6)).unwrap();
//! let line = circuit.add_element("line", ElementKind::from(pipe));
//! let network = Network::mesh(&circuit, line).unwrap();
//!
//! let water = FluidState::new(kgpm3(998.2), pas(1.002e-3)).unwrap();
//! let mut model = Model::new(&network, water);
//! model.add_pressure_bc(NodeId::from_index(0), pa(500_000.0)).unwrap();
//! model.add_pressure_bc(NodeId::from_index(1), pa(400_000.0)).unwrap();
//!
//! let state = model.steady_solve().unwrap();
//! assert!(state.mass_flows[0] > 0.0);
//! ```

pub mod dynamics;
pub mod error;
pub mod jacobian;
pub mod modal;
pub mod model;
pub mod newton;
pub mod report;

pub use dynamics::DynamicsMatrices;
pub use error::{SolverError, SolverResult};
pub use modal::{EigenConfig, Mode, pencil_eigenvalues, quadratic_modes};
pub use model::{BoundaryKind, ElementWarning, Model, Stage};
pub use newton::{NewtonConfig, NewtonResult, Termination, newton_solve};
pub use report::{NodeRow, SteadyReport};
