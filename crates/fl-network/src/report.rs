//! Human-readable mesh accounting.

use std::fmt;

use fl_core::NodeId;

use crate::network::{Network, NodeKind};

/// Label used for an open port in the neighbor listing.
pub const BOUNDARY_LABEL: &str = "Boundary";

/// Snapshot of a network's topology for display.
///
/// Building it never mutates the network, and two reports of the same
/// network compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshReport {
    pub connection_nodes: Vec<NodeId>,
    pub boundary_nodes: Vec<NodeId>,
    /// (element name, node per port)
    pub nodes_by_element: Vec<(String, Vec<NodeId>)>,
    /// (element name, neighbor name per port or `BOUNDARY_LABEL`)
    pub neighbors_by_element: Vec<(String, Vec<String>)>,
}

impl MeshReport {
    pub fn new<E>(network: &Network<E>) -> Self {
        let connection_nodes = network.connection_nodes().collect();
        let boundary_nodes = network.boundary_nodes().collect();

        let nodes_by_element = network
            .elements()
            .iter()
            .map(|e| (e.name.clone(), e.ports.clone()))
            .collect();

        let neighbors_by_element = network
            .elements()
            .iter()
            .map(|e| {
                let names = e
                    .neighbors
                    .iter()
                    .map(|slot| match slot {
                        Some(link) => network
                            .element(link.element)
                            .map_or_else(|| link.element.to_string(), |n| n.name.clone()),
                        None => BOUNDARY_LABEL.to_string(),
                    })
                    .collect();
                (e.name.clone(), names)
            })
            .collect();

        Self {
            connection_nodes,
            boundary_nodes,
            nodes_by_element,
            neighbors_by_element,
        }
    }

    pub fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        if self.connection_nodes.contains(&node) {
            Some(NodeKind::Connection)
        } else if self.boundary_nodes.contains(&node) {
            Some(NodeKind::Boundary)
        } else {
            None
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for MeshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connection nodes: [{}]", join(&self.connection_nodes))?;
        writeln!(f, "Boundary nodes: [{}]", join(&self.boundary_nodes))?;
        writeln!(f, "Nodes by element:")?;
        for (name, nodes) in &self.nodes_by_element {
            writeln!(f, "  {name}: [{}]", join(nodes))?;
        }
        writeln!(f, "Neighbors by element:")?;
        for (name, neighbors) in &self.neighbors_by_element {
            writeln!(f, "  {name}: [{}]", neighbors.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, Ported};

    #[derive(Debug, Clone)]
    struct Ports(usize);

    impl Ported for Ports {
        fn port_count(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn report_lists_boundary_sentinel() {
        let mut c = Circuit::new();
        let feed = c.add_element("feed", Ports(2));
        let inj = c.add_element("injector", Ports(2));
        c.tie_in(feed, 1, inj, 0).unwrap();

        let net = Network::mesh(&c, feed).unwrap();
        let report = net.mesh_report();
        let text = report.to_string();

        assert!(text.contains("Connection nodes: [1]"));
        assert!(text.contains("Boundary nodes: [0, 2]"));
        assert!(text.contains("feed: [0, 1]"));
        assert!(text.contains("feed: [Boundary, injector]"));
        assert!(text.contains("injector: [feed, Boundary]"));
        assert_eq!(report.node_kind(NodeId::from_index(1)), Some(NodeKind::Connection));
    }
}
