//! Breadth-first meshing of a circuit into an indexed node graph.

use std::collections::{HashMap, VecDeque};

use fl_core::{ElementId, NodeId};
use tracing::debug;

use crate::circuit::{Circuit, Link, Ported};
use crate::error::{NetworkError, NetworkResult};
use crate::report::MeshReport;
use crate::validate;

/// Kind of a network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Internal junction shared by exactly two element ports.
    Connection,
    /// Open port where external conditions are applied.
    Boundary,
}

/// A network node. Its identity is its position in [`Network::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// An element snapshot with every port resolved to a node.
#[derive(Debug, Clone)]
pub struct MeshedElement<E> {
    pub id: ElementId,
    pub name: String,
    pub payload: E,
    pub neighbors: Vec<Option<Link>>,
    pub ports: Vec<NodeId>,
}

/// Immutable node graph produced by [`Network::mesh`].
///
/// `elements` are in BFS discovery order from the seed, `nodes` in the order
/// they were created. The circuit can be rewired afterwards without affecting
/// an existing network.
#[derive(Debug, Clone)]
pub struct Network<E> {
    elements: Vec<MeshedElement<E>>,
    nodes: Vec<Node>,
    position: HashMap<ElementId, usize>,
}

impl<E: Ported + Clone> Network<E> {
    /// Discover every element reachable from `seed` and assign nodes to ports.
    ///
    /// Ports are visited in index order. An open port gets a new boundary node.
    /// A tied port whose node is still unset gets a new connection node, shared
    /// with the neighbor's reciprocal port; the neighbor is queued the first
    /// time it is seen. Each element is queued at most once, so the traversal
    /// terminates. A tie that does not point back fails with
    /// `NonReciprocalTie`.
    pub fn mesh(circuit: &Circuit<E>, seed: ElementId) -> NetworkResult<Self> {
        let seed_element = circuit.element(seed)?;

        let mut order: Vec<ElementId> = vec![seed];
        let mut port_nodes: HashMap<ElementId, Vec<Option<NodeId>>> = HashMap::new();
        port_nodes.insert(seed, vec![None; seed_element.port_count()]);
        let mut nodes: Vec<Node> = Vec::new();
        let mut queue = VecDeque::from([seed]);

        while let Some(front) = queue.pop_front() {
            let element = circuit.element(front)?;

            for (port, slot) in element.neighbors().iter().enumerate() {
                let assigned = port_nodes
                    .get(&front)
                    .and_then(|p| p.get(port))
                    .is_some_and(Option::is_some);
                if assigned {
                    continue;
                }

                let node = NodeId::from_index(nodes.len() as u32);
                match slot {
                    None => {
                        nodes.push(Node {
                            id: node,
                            kind: NodeKind::Boundary,
                        });
                        assign(&mut port_nodes, front, port, node);
                    }
                    Some(link) => {
                        let neighbor = circuit.element(link.element)?;
                        let back = neighbor.neighbors().get(link.port).copied().flatten();
                        if back != Some(Link { element: front, port }) {
                            return Err(NetworkError::NonReciprocalTie {
                                element: front,
                                port,
                                neighbor: link.element,
                                neighbor_port: link.port,
                            });
                        }

                        if !port_nodes.contains_key(&link.element) {
                            port_nodes.insert(link.element, vec![None; neighbor.port_count()]);
                            order.push(link.element);
                            queue.push_back(link.element);
                        }

                        nodes.push(Node {
                            id: node,
                            kind: NodeKind::Connection,
                        });
                        assign(&mut port_nodes, front, port, node);
                        assign(&mut port_nodes, link.element, link.port, node);
                    }
                }
            }
        }

        let mut elements = Vec::with_capacity(order.len());
        for id in order {
            let element = circuit.element(id)?;
            let slots = port_nodes.remove(&id).unwrap_or_default();
            let ports = slots
                .into_iter()
                .enumerate()
                .map(|(port, node)| {
                    node.ok_or(NetworkError::UnassignedPort { element: id, port })
                })
                .collect::<NetworkResult<Vec<_>>>()?;
            elements.push(MeshedElement {
                id,
                name: element.name.clone(),
                payload: element.payload.clone(),
                neighbors: element.neighbors().to_vec(),
                ports,
            });
        }

        validate::validate_mesh(&elements, &nodes)?;

        let position = elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();

        debug!(
            elements = elements.len(),
            nodes = nodes.len(),
            seed = %seed_element.name,
            "meshed network"
        );

        Ok(Self {
            elements,
            nodes,
            position,
        })
    }
}

fn assign(
    port_nodes: &mut HashMap<ElementId, Vec<Option<NodeId>>>,
    element: ElementId,
    port: usize,
    node: NodeId,
) {
    if let Some(slot) = port_nodes.get_mut(&element).and_then(|p| p.get_mut(port)) {
        *slot = Some(node);
    }
}

impl<E> Network<E> {
    /// Elements in BFS discovery order.
    pub fn elements(&self) -> &[MeshedElement<E>] {
        &self.elements
    }

    /// Nodes in creation order; `nodes()[i].id.idx() == i`.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.idx())
    }

    /// Look up an element by its circuit id.
    pub fn element(&self, id: ElementId) -> Option<&MeshedElement<E>> {
        self.position.get(&id).and_then(|&i| self.elements.get(i))
    }

    /// Position of an element in [`Network::elements`].
    pub fn element_position(&self, id: ElementId) -> Option<usize> {
        self.position.get(&id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sum of port counts over all elements.
    pub fn port_count(&self) -> usize {
        self.elements.iter().map(|e| e.ports.len()).sum()
    }

    pub fn is_boundary(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.kind == NodeKind::Boundary)
    }

    pub fn boundary_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_of_kind(NodeKind::Boundary)
    }

    pub fn connection_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_of_kind(NodeKind::Connection)
    }

    fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.kind == kind)
            .map(|n| n.id)
    }

    /// Build the read-only mesh report.
    pub fn mesh_report(&self) -> MeshReport {
        MeshReport::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Ports(usize);

    impl Ported for Ports {
        fn port_count(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn single_element_is_all_boundary() {
        let mut c = Circuit::new();
        let a = c.add_element("a", Ports(2));
        let net = Network::mesh(&c, a).unwrap();
        assert_eq!(net.node_count(), 2);
        assert!(net.nodes().iter().all(|n| n.kind == NodeKind::Boundary));
        assert_eq!(net.elements()[0].ports, vec![NodeId::from_index(0), NodeId::from_index(1)]);
    }

    #[test]
    fn discovery_order_is_bfs_not_insertion() {
        // c - a - b, seeded at a, with c inserted first
        let mut circuit = Circuit::new();
        let c = circuit.add_element("c", Ports(2));
        let a = circuit.add_element("a", Ports(2));
        let b = circuit.add_element("b", Ports(2));
        circuit.tie_in(a, 0, c, 1).unwrap();
        circuit.tie_in(a, 1, b, 0).unwrap();

        let net = Network::mesh(&circuit, a).unwrap();
        let names: Vec<_> = net.elements().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "c", "b"]);
        assert_eq!(net.element_position(b), Some(2));
    }

    #[test]
    fn cycle_closes_with_shared_node() {
        // triangle of 2-port elements
        let mut c = Circuit::new();
        let x = c.add_element("x", Ports(2));
        let y = c.add_element("y", Ports(2));
        let z = c.add_element("z", Ports(2));
        c.tie_in(x, 1, y, 0).unwrap();
        c.tie_in(y, 1, z, 0).unwrap();
        c.tie_in(z, 1, x, 0).unwrap();

        let net = Network::mesh(&c, x).unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.boundary_nodes().count(), 0);
        let zel = net.element(z).unwrap();
        let xel = net.element(x).unwrap();
        assert_eq!(zel.ports[1], xel.ports[0]);
    }

    #[test]
    fn parallel_ties_between_same_pair() {
        let mut c = Circuit::new();
        let a = c.add_element("a", Ports(2));
        let b = c.add_element("b", Ports(2));
        c.tie_in(a, 0, b, 1).unwrap();
        c.tie_in(a, 1, b, 0).unwrap();

        let net = Network::mesh(&c, a).unwrap();
        assert_eq!(net.node_count(), 2);
        let bel = net.element(b).unwrap();
        let ael = net.element(a).unwrap();
        assert_eq!(ael.ports[0], bel.ports[1]);
        assert_eq!(ael.ports[1], bel.ports[0]);
    }

    #[test]
    fn stale_link_is_reported() {
        let mut c = Circuit::new();
        let a = c.add_element("a", Ports(2));
        let b = c.add_element("b", Ports(2));
        let d = c.add_element("d", Ports(2));
        c.tie_in(a, 1, b, 0).unwrap();
        c.tie_in(b, 1, d, 0).unwrap();
        // a.1 now points at d.1, b.0 still names a.1
        c.tie_in(a, 1, d, 1).unwrap();

        let err = Network::mesh(&c, b).unwrap_err();
        assert_eq!(
            err,
            NetworkError::NonReciprocalTie {
                element: b,
                port: 0,
                neighbor: a,
                neighbor_port: 1,
            }
        );
    }

    #[test]
    fn unknown_seed() {
        let c: Circuit<Ports> = Circuit::new();
        assert!(matches!(
            Network::mesh(&c, ElementId::from_index(0)),
            Err(NetworkError::UnknownElement { .. })
        ));
    }
}
