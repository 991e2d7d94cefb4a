//! Post-mesh invariant checks.

use fl_core::NodeId;

use crate::error::{NetworkError, NetworkResult};
use crate::network::{MeshedElement, Node, NodeKind};

/// Every port must reference an existing node, connections must be shared by
/// exactly two ports and boundaries referenced by exactly one.
pub(crate) fn validate_mesh<E>(elements: &[MeshedElement<E>], nodes: &[Node]) -> NetworkResult<()> {
    let mut degree = vec![0_usize; nodes.len()];

    for element in elements {
        for (port, node) in element.ports.iter().enumerate() {
            match degree.get_mut(node.idx()) {
                Some(d) => *d += 1,
                None => {
                    return Err(NetworkError::UnassignedPort {
                        element: element.id,
                        port,
                    });
                }
            }
        }
    }

    for (node, actual) in nodes.iter().zip(degree) {
        let expected = match node.kind {
            NodeKind::Connection => 2,
            NodeKind::Boundary => 1,
        };
        if actual != expected {
            return Err(NetworkError::NodeDegree {
                node: node.id,
                expected,
                actual,
            });
        }
    }

    Ok(())
}
