//! fl-network: element arena and mesh builder for feedline.
//!
//! Provides:
//! - `Circuit`, an arena of elements wired port-to-port with `tie_in`
//! - `Network`, the node graph inferred from a circuit by breadth-first meshing
//! - A read-only mesh report for inspecting the result
//!
//! # Example
//!
//! ```
//! use fl_network::{Circuit, Network, NodeKind, Ported};
//!
//! #[derive(Clone)]
//! struct TwoPort;
//! impl Ported for TwoPort {
//!     fn port_count(&self) -> usize { 2 }
//! }
//!
//! let mut circuit = Circuit::new();
//! let a = circuit.add_element("a", TwoPort);
//! let b = circuit.add_element("b", TwoPort);
//! circuit.tie_in(a, 1, b, 0).unwrap();
//!
//! let net = Network::mesh(&circuit, a).unwrap();
//! assert_eq!(net.elements().len(), 2);
//! assert_eq!(net.nodes().len(), 3);
//! assert_eq!(net.nodes()[1].kind, NodeKind::Connection);
//! ```

pub mod circuit;
pub mod error;
pub mod network;
pub mod report;
pub(crate) mod validate;

pub use circuit::{Circuit, Element, Link, Ported};
pub use error::{NetworkError, NetworkResult};
pub use network::{MeshedElement, Network, Node, NodeKind};
pub use report::MeshReport;
