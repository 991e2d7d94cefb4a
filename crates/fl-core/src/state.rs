//! Global state vector: one pressure and one mass-flow unknown per node.
//!
//! The flat layout handed to root finders is `[p_0 .. p_{n-1}, mdot_0 .. mdot_{n-1}]`.
//! Elements never index the flat vector directly; they go through
//! [`StateVector::pressure`] and [`StateVector::mass_flow`].

use crate::error::{FlError, FlResult};
use crate::ids::NodeId;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateVector {
    pub pressures: Vec<f64>,
    pub mass_flows: Vec<f64>,
}

impl StateVector {
    /// Zero pressures and flows for `node_count` nodes.
    pub fn zeros(node_count: usize) -> Self {
        Self::filled(node_count, 0.0)
    }

    pub fn filled(node_count: usize, value: f64) -> Self {
        Self {
            pressures: vec![value; node_count],
            mass_flows: vec![value; node_count],
        }
    }

    /// Split a flat vector (pressures first, then flows).
    pub fn from_flat(flat: &[f64]) -> FlResult<Self> {
        if flat.len() % 2 != 0 {
            return Err(FlError::OddStateLength { len: flat.len() });
        }
        let (p, m) = flat.split_at(flat.len() / 2);
        Ok(Self {
            pressures: p.to_vec(),
            mass_flows: m.to_vec(),
        })
    }

    pub fn to_flat(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.pressures);
        out.extend_from_slice(&self.mass_flows);
        out
    }

    pub fn node_count(&self) -> usize {
        self.pressures.len()
    }

    /// Length of the flat vector, `2 * node_count`.
    pub fn len(&self) -> usize {
        self.pressures.len() + self.mass_flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressures.is_empty()
    }

    pub fn pressure(&self, node: NodeId) -> FlResult<f64> {
        self.pressures
            .get(node.idx())
            .copied()
            .ok_or(FlError::IndexOob {
                what: "pressure",
                index: node.idx(),
                len: self.pressures.len(),
            })
    }

    pub fn mass_flow(&self, node: NodeId) -> FlResult<f64> {
        self.mass_flows
            .get(node.idx())
            .copied()
            .ok_or(FlError::IndexOob {
                what: "mass flow",
                index: node.idx(),
                len: self.mass_flows.len(),
            })
    }

    /// Flat index of a node's pressure unknown.
    #[inline]
    pub fn pressure_index(node: NodeId) -> usize {
        node.idx()
    }

    /// Flat index of a node's mass-flow unknown.
    #[inline]
    pub fn mass_flow_index(node: NodeId, node_count: usize) -> usize {
        node_count + node.idx()
    }
}
