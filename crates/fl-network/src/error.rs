//! Topology error types.

use fl_core::{ElementId, FlError, NodeId};

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Circuit wiring and meshing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Element id does not exist in the circuit.
    UnknownElement { element: ElementId },

    /// Port index is outside the element's port range.
    PortOutOfRange {
        element: ElementId,
        port: usize,
        port_count: usize,
    },

    /// An element port cannot be tied to another port of the same element.
    SelfTie { element: ElementId },

    /// A port names a neighbor whose matching slot does not point back.
    ///
    /// Usually left behind when a port is re-tied.
    NonReciprocalTie {
        element: ElementId,
        port: usize,
        neighbor: ElementId,
        neighbor_port: usize,
    },

    /// A port was left without a node after meshing.
    UnassignedPort { element: ElementId, port: usize },

    /// A node is referenced by the wrong number of ports for its kind.
    NodeDegree {
        node: NodeId,
        expected: usize,
        actual: usize,
    },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::UnknownElement { element } => {
                write!(f, "Element {} does not exist", element)
            }
            NetworkError::PortOutOfRange {
                element,
                port,
                port_count,
            } => {
                write!(
                    f,
                    "Port {} out of range for element {} ({} ports)",
                    port, element, port_count
                )
            }
            NetworkError::SelfTie { element } => {
                write!(f, "Element {} cannot be tied to itself", element)
            }
            NetworkError::NonReciprocalTie {
                element,
                port,
                neighbor,
                neighbor_port,
            } => {
                write!(
                    f,
                    "Element {} port {} names element {} port {}, which does not point back",
                    element, port, neighbor, neighbor_port
                )
            }
            NetworkError::UnassignedPort { element, port } => {
                write!(f, "Element {} port {} has no node after meshing", element, port)
            }
            NetworkError::NodeDegree {
                node,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Node {} is referenced by {} ports (expected {})",
                    node, actual, expected
                )
            }
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<NetworkError> for FlError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::PortOutOfRange {
                port, port_count, ..
            } => FlError::IndexOob {
                what: "element port",
                index: port,
                len: port_count,
            },
            _ => FlError::InvalidArg {
                what: "network topology",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_element_and_port() {
        let err = NetworkError::PortOutOfRange {
            element: ElementId::from_index(2),
            port: 5,
            port_count: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Port 5"));
        assert!(msg.contains("element 2"));
    }

    #[test]
    fn converts_to_core_error() {
        let err: FlError = NetworkError::SelfTie {
            element: ElementId::from_index(0),
        }
        .into();
        assert!(matches!(err, FlError::InvalidArg { .. }));
    }
}
