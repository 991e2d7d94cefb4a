//! Tees and manifolds: one combined port feeding or collecting N branches.
//!
//! Port 0 is always the combined port. Residual order is one pressure
//! relation per branch, then the continuity relation `m0 - Σ mi = 0`.

use fl_core::numeric::{circle_area, signed_square};
use fl_core::units::{Length, Volume};
use fl_core::{NodeId, StateVector};
use fl_fluids::FluidState;
use fl_network::Ported;

use crate::common::{check_finite, check_non_negative, check_positive};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{FlowElement, RowTerms, Term, Var};

/// Direction of flow through a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowConfig {
    /// Branches merge into the combined port.
    Converging,
    /// The combined port splits into the branches.
    Diverging,
}

#[derive(Debug, Clone, PartialEq)]
struct BranchLosses {
    area: f64,
    k: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct Junction {
    config: FlowConfig,
    ports: usize,
    losses: Option<BranchLosses>,
    volume: Option<f64>,
}

impl Junction {
    fn new(config: FlowConfig, ports: usize) -> Self {
        Self {
            config,
            ports,
            losses: None,
            volume: None,
        }
    }

    fn set_branch_losses(&mut self, diameter: Length, k: Vec<f64>) -> ComponentResult<()> {
        let d = check_positive(diameter.value, "branch diameter")?;
        if k.len() != self.ports - 1 {
            return Err(ComponentError::InvalidArg {
                what: "one loss coefficient per branch required",
            });
        }
        for &ki in &k {
            check_non_negative(ki, "branch loss coefficient")?;
        }
        self.losses = Some(BranchLosses {
            area: circle_area(d),
            k,
        });
        Ok(())
    }

    fn set_volume(&mut self, volume: Volume) -> ComponentResult<()> {
        self.volume = Some(check_positive(volume.value, "junction volume")?);
        Ok(())
    }

    fn branch_drop(&self, branch: usize, mdot: f64, rho: f64) -> f64 {
        match &self.losses {
            Some(l) => l.k[branch] * signed_square(mdot) / (2.0 * l.area * l.area * rho),
            None => 0.0,
        }
    }

    fn check_ports(&self, ports: &[NodeId]) -> ComponentResult<()> {
        if ports.len() == self.ports {
            Ok(())
        } else {
            Err(ComponentError::PortMismatch {
                expected: self.ports,
                actual: ports.len(),
            })
        }
    }

    fn residuals(
        &self,
        ports: &[NodeId],
        state: &StateVector,
        fluid: &FluidState,
    ) -> ComponentResult<Vec<f64>> {
        self.check_ports(ports)?;
        let p0 = state.pressure(ports[0])?;
        let m0 = state.mass_flow(ports[0])?;

        let mut out = Vec::with_capacity(self.ports);
        let mut branch_flow = 0.0;
        for (i, &node) in ports.iter().enumerate().skip(1) {
            let (pi, mi) = (state.pressure(node)?, state.mass_flow(node)?);
            branch_flow += mi;
            let drop = self.branch_drop(i - 1, mi, fluid.density);
            let r = match self.config {
                FlowConfig::Diverging => p0 - pi - drop,
                FlowConfig::Converging => pi - p0 - drop,
            };
            out.push(check_finite(r, "junction pressure residual")?);
        }
        out.push(m0 - branch_flow);
        Ok(out)
    }

    fn storage(&self, ports: &[NodeId], fluid: &FluidState) -> ComponentResult<RowTerms> {
        self.check_ports(ports)?;
        let mut rows = vec![Vec::new(); self.ports];
        if let (Some(v), Some(a)) = (self.volume, fluid.sound_speed) {
            let cap = v / (a * a);
            let coeff = match self.config {
                FlowConfig::Diverging => -cap,
                FlowConfig::Converging => cap,
            };
            rows[self.ports - 1].push(Term::new(Var::Pressure(ports[0]), coeff));
        }
        Ok(rows)
    }
}

/// Three-port tee; ports 1 and 2 are the branches.
///
/// Without branch losses the pressure relations reduce to `P0 = P1 = P2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tee(Junction);

impl Tee {
    pub fn new(config: FlowConfig) -> Self {
        Self(Junction::new(config, 3))
    }

    pub fn config(&self) -> FlowConfig {
        self.0.config
    }

    /// Branch loss coefficients referenced to `diameter`.
    pub fn with_branch_losses(mut self, diameter: Length, k: [f64; 2]) -> ComponentResult<Self> {
        self.0.set_branch_losses(diameter, k.to_vec())?;
        Ok(self)
    }

    /// Liquid volume at the junction, for compliance.
    pub fn with_volume(mut self, volume: Volume) -> ComponentResult<Self> {
        self.0.set_volume(volume)?;
        Ok(self)
    }
}

impl Ported for Tee {
    fn port_count(&self) -> usize {
        3
    }
}

impl FlowElement for Tee {
    fn steady_flow_eqns(
        &self,
        ports: &[NodeId],
        state: &StateVector,
        fluid: &FluidState,
    ) -> ComponentResult<Vec<f64>> {
        self.0.residuals(ports, state, fluid)
    }

    fn storage_terms(&self, ports: &[NodeId], fluid: &FluidState) -> ComponentResult<RowTerms> {
        self.0.storage(ports, fluid)
    }
}

/// Manifold with `ports - 1` branches, e.g. an injector feed ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifold(Junction);

impl Manifold {
    pub fn new(config: FlowConfig, ports: usize) -> ComponentResult<Self> {
        if ports < 2 {
            return Err(ComponentError::InvalidArg {
                what: "manifold needs at least two ports",
            });
        }
        Ok(Self(Junction::new(config, ports)))
    }

    pub fn config(&self) -> FlowConfig {
        self.0.config
    }

    pub fn with_branch_losses(mut self, diameter: Length, k: Vec<f64>) -> ComponentResult<Self> {
        self.0.set_branch_losses(diameter, k)?;
        Ok(self)
    }

    pub fn with_volume(mut self, volume: Volume) -> ComponentResult<Self> {
        self.0.set_volume(volume)?;
        Ok(self)
    }
}

impl Ported for Manifold {
    fn port_count(&self) -> usize {
        self.0.ports
    }
}

impl FlowElement for Manifold {
    fn steady_flow_eqns(
        &self,
        ports: &[NodeId],
        state: &StateVector,
        fluid: &FluidState,
    ) -> ComponentResult<Vec<f64>> {
        self.0.residuals(ports, state, fluid)
    }

    fn storage_terms(&self, ports: &[NodeId], fluid: &FluidState) -> ComponentResult<RowTerms> {
        self.0.storage(ports, fluid)
    }
}
