//! Element arena and port wiring.

use fl_core::ElementId;
use tracing::warn;

use crate::error::{NetworkError, NetworkResult};

/// Anything with a fixed number of ports can live in a circuit.
pub trait Ported {
    fn port_count(&self) -> usize;
}

/// The far side of a tie: an element and one of its ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub element: ElementId,
    pub port: usize,
}

/// An element as wired by the caller.
///
/// `neighbors` always has `port_count` slots. An empty slot is an open port,
/// which becomes a boundary node when meshed.
#[derive(Debug, Clone)]
pub struct Element<E> {
    pub id: ElementId,
    pub name: String,
    pub payload: E,
    pub(crate) neighbors: Vec<Option<Link>>,
}

impl<E> Element<E> {
    pub fn neighbors(&self) -> &[Option<Link>] {
        &self.neighbors
    }

    pub fn port_count(&self) -> usize {
        self.neighbors.len()
    }

    fn check_port(&self, port: usize) -> NetworkResult<()> {
        if port < self.neighbors.len() {
            Ok(())
        } else {
            Err(NetworkError::PortOutOfRange {
                element: self.id,
                port,
                port_count: self.neighbors.len(),
            })
        }
    }
}

/// Arena of elements addressed by stable ids.
///
/// Adjacency is stored as (element, port) pairs so cycles need no shared
/// ownership. Elements are never deleted; `remove` only detaches them.
#[derive(Debug, Clone)]
pub struct Circuit<E> {
    elements: Vec<Element<E>>,
}

impl<E> Default for Circuit<E> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<E: Ported> Circuit<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element with every port open.
    pub fn add_element(&mut self, name: impl Into<String>, payload: E) -> ElementId {
        let id = ElementId::from_index(self.elements.len() as u32);
        let ports = payload.port_count();
        self.elements.push(Element {
            id,
            name: name.into(),
            payload,
            neighbors: vec![None; ports],
        });
        id
    }

    /// Tie `a`'s port `a_port` to `b`'s port `b_port`, in both directions.
    ///
    /// Re-tying an occupied port overwrites it. The old neighbor keeps its
    /// now-stale link, which meshing reports as `NonReciprocalTie`.
    pub fn tie_in(
        &mut self,
        a: ElementId,
        a_port: usize,
        b: ElementId,
        b_port: usize,
    ) -> NetworkResult<()> {
        if a == b {
            return Err(NetworkError::SelfTie { element: a });
        }
        self.element(a)?.check_port(a_port)?;
        self.element(b)?.check_port(b_port)?;

        self.set_neighbor(a, a_port, Link { element: b, port: b_port });
        self.set_neighbor(b, b_port, Link { element: a, port: a_port });
        Ok(())
    }

    fn set_neighbor(&mut self, id: ElementId, port: usize, link: Link) {
        let Some(element) = self.elements.get_mut(id.idx()) else {
            return;
        };
        let Some(slot) = element.neighbors.get_mut(port) else {
            return;
        };
        if let Some(previous) = slot.replace(link) {
            if previous != link {
                warn!(
                    element = %element.name,
                    port,
                    previous = %previous.element,
                    "port re-tied; previous neighbor keeps a stale link"
                );
            }
        }
    }

    /// Detach an element: null every neighbor slot that points back at it,
    /// then clear its own slots.
    ///
    /// Networks already meshed are unaffected.
    pub fn remove(&mut self, id: ElementId) -> NetworkResult<()> {
        let neighbors: Vec<ElementId> = self
            .element(id)?
            .neighbors
            .iter()
            .flatten()
            .map(|link| link.element)
            .collect();

        for neighbor in neighbors {
            if let Some(other) = self.elements.get_mut(neighbor.idx()) {
                for slot in other.neighbors.iter_mut() {
                    if slot.is_some_and(|link| link.element == id) {
                        *slot = None;
                    }
                }
            }
        }

        if let Some(element) = self.elements.get_mut(id.idx()) {
            element.neighbors.iter_mut().for_each(|slot| *slot = None);
        }
        Ok(())
    }
}

impl<E> Circuit<E> {
    pub fn element(&self, id: ElementId) -> NetworkResult<&Element<E>> {
        self.elements
            .get(id.idx())
            .ok_or(NetworkError::UnknownElement { element: id })
    }

    /// Mutable access to an element's payload; wiring stays private.
    pub fn payload_mut(&mut self, id: ElementId) -> NetworkResult<&mut E> {
        self.elements
            .get_mut(id.idx())
            .map(|e| &mut e.payload)
            .ok_or(NetworkError::UnknownElement { element: id })
    }

    pub fn elements(&self) -> &[Element<E>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
