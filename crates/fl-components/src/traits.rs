//! Equation-contribution protocol shared by every element type.

use fl_core::{NodeId, StateVector};
use fl_fluids::FluidState;
use fl_network::Ported;

use crate::error::{ComponentError, ComponentResult, RangeWarning};

/// One unknown of the global state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    Pressure(NodeId),
    MassFlow(NodeId),
}

impl Var {
    /// Position in the flat `[pressures, mass_flows]` layout.
    pub fn flat_index(self, node_count: usize) -> usize {
        match self {
            Var::Pressure(n) => StateVector::pressure_index(n),
            Var::MassFlow(n) => StateVector::mass_flow_index(n, node_count),
        }
    }
}

/// `coeff` multiplying the time derivative (or displacement) of `var` in
/// one residual row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub var: Var,
    pub coeff: f64,
}

impl Term {
    pub fn new(var: Var, coeff: f64) -> Self {
        Self { var, coeff }
    }
}

/// Linear terms for each residual row of an element, in residual order.
pub type RowTerms = Vec<Vec<Term>>;

/// A lumped flow element.
///
/// `steady_flow_eqns` must return exactly `port_count()` residuals, in a
/// fixed order; the dynamics hooks return one row of terms per residual in
/// that same order. `ports[i]` is the node meshed onto port `i`.
pub trait FlowElement: Ported {
    /// Steady residuals `f(x) = 0`.
    fn steady_flow_eqns(
        &self,
        ports: &[NodeId],
        state: &StateVector,
        fluid: &FluidState,
    ) -> ComponentResult<Vec<f64>>;

    /// Storage (inertance and compliance) terms, the coefficients of `dx/dt`.
    fn storage_terms(&self, ports: &[NodeId], fluid: &FluidState) -> ComponentResult<RowTerms> {
        let _ = (ports, fluid);
        Ok(vec![Vec::new(); self.port_count()])
    }

    /// Stiffness terms, the coefficients of the integrated perturbation.
    fn stiffness_terms(&self, ports: &[NodeId], fluid: &FluidState) -> ComponentResult<RowTerms> {
        let _ = (ports, fluid);
        Ok(vec![Vec::new(); self.port_count()])
    }

    /// Correlations evaluated outside their validated range.
    fn domain_warnings(&self) -> Vec<RangeWarning> {
        Vec::new()
    }
}

/// Destructure a port slice into a fixed-size array.
pub fn port_nodes<const N: usize>(ports: &[NodeId]) -> ComponentResult<[NodeId; N]> {
    <[NodeId; N]>::try_from(ports).map_err(|_| ComponentError::PortMismatch {
        expected: N,
        actual: ports.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_index_layout() {
        let n = NodeId::from_index(2);
        assert_eq!(Var::Pressure(n).flat_index(5), 2);
        assert_eq!(Var::MassFlow(n).flat_index(5), 7);
    }

    #[test]
    fn port_nodes_checks_length() {
        let ports = [NodeId::from_index(0), NodeId::from_index(1)];
        let [a, b] = port_nodes::<2>(&ports).unwrap();
        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(
            port_nodes::<3>(&ports).unwrap_err(),
            ComponentError::PortMismatch {
                expected: 3,
                actual: 2
            }
        );
    }
}
