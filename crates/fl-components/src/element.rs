//! Closed set of element types a feed-system circuit is built from.

use fl_core::{NodeId, StateVector};
use fl_fluids::FluidState;
use fl_network::Ported;

use crate::error::{ComponentResult, RangeWarning};
use crate::junction::{Manifold, Tee};
use crate::orifice::Orifice;
use crate::pipe::Pipe;
use crate::reducer::Reducer;
use crate::thrust_chamber::ThrustChamber;
use crate::traits::{FlowElement, RowTerms};

/// Any element that can sit in a circuit.
#[derive(Debug, Clone)]
pub enum ElementKind {
    Pipe(Pipe),
    Orifice(Orifice),
    Reducer(Reducer),
    Tee(Tee),
    Manifold(Manifold),
    ThrustChamber(ThrustChamber),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            ElementKind::Pipe($inner) => $body,
            ElementKind::Orifice($inner) => $body,
            ElementKind::Reducer($inner) => $body,
            ElementKind::Tee($inner) => $body,
            ElementKind::Manifold($inner) => $body,
            ElementKind::ThrustChamber($inner) => $body,
        }
    };
}

impl ElementKind {
    /// Short type label for reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ElementKind::Pipe(_) => "pipe",
            ElementKind::Orifice(_) => "orifice",
            ElementKind::Reducer(_) => "reducer",
            ElementKind::Tee(_) => "tee",
            ElementKind::Manifold(_) => "manifold",
            ElementKind::ThrustChamber(_) => "thrust chamber",
        }
    }
}

impl Ported for ElementKind {
    fn port_count(&self) -> usize {
        dispatch!(self, e => e.port_count())
    }
}

impl FlowElement for ElementKind {
    fn steady_flow_eqns(
        &self,
        ports: &[NodeId],
        state: &StateVector,
        fluid: &FluidState,
    ) -> ComponentResult<Vec<f64>> {
        dispatch!(self, e => e.steady_flow_eqns(ports, state, fluid))
    }

    fn storage_terms(&self, ports: &[NodeId], fluid: &FluidState) -> ComponentResult<RowTerms> {
        dispatch!(self, e => e.storage_terms(ports, fluid))
    }

    fn stiffness_terms(&self, ports: &[NodeId], fluid: &FluidState) -> ComponentResult<RowTerms> {
        dispatch!(self, e => e.stiffness_terms(ports, fluid))
    }

    fn domain_warnings(&self) -> Vec<RangeWarning> {
        dispatch!(self, e => e.domain_warnings())
    }
}

macro_rules! impl_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for ElementKind {
                fn from(e: $variant) -> Self {
                    ElementKind::$variant(e)
                }
            }
        )*
    };
}

impl_from!(Pipe, Orifice, Reducer, Tee, Manifold, ThrustChamber);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::junction::FlowConfig;
    use fl_core::units::{m, mps};

    #[test]
    fn port_counts_dispatch() {
        let pipe: ElementKind = Pipe::new(m(1.0), m(0.02), m(1e-5)).unwrap().into();
        let tee: ElementKind = Tee::new(FlowConfig::Diverging).into();
        let manifold: ElementKind = Manifold::new(FlowConfig::Converging, 5).unwrap().into();
        let tc: ElementKind = ThrustChamber::new(m(0.02), mps(1500.0)).unwrap().into();
        assert_eq!(pipe.port_count(), 2);
        assert_eq!(tee.port_count(), 3);
        assert_eq!(manifold.port_count(), 5);
        assert_eq!(tc.port_count(), 1);
        assert_eq!(tc.kind_name(), "thrust chamber");
    }
}
