//! Thrust chamber seen from the injector face: a choked throat sink.

use fl_core::numeric::circle_area;
use fl_core::units::{Length, Velocity, Volume};
use fl_core::{NodeId, StateVector};
use fl_fluids::FluidState;
use fl_network::Ported;

use crate::common::{check_finite, check_positive};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{FlowElement, RowTerms, Term, Var, port_nodes};

/// One-port chamber whose throat passes `m = Pc At / c*`.
///
/// The injector-side pressure is taken as the chamber pressure. With a
/// chamber volume and gas `R T` the gas-side compliance `V / (R T)` enters
/// the dynamics, which is the classic chugging storage term.
#[derive(Debug, Clone)]
pub struct ThrustChamber {
    pub throat_diameter: Length,
    /// Characteristic velocity
    pub c_star: Velocity,
    chamber: Option<(f64, f64)>,
}

impl ThrustChamber {
    pub fn new(throat_diameter: Length, c_star: Velocity) -> ComponentResult<Self> {
        check_positive(throat_diameter.value, "throat diameter")?;
        check_positive(c_star.value, "characteristic velocity")?;
        Ok(Self {
            throat_diameter,
            c_star,
            chamber: None,
        })
    }

    /// Chamber gas volume and specific gas constant times temperature [J/kg].
    pub fn with_chamber(mut self, volume: Volume, gas_rt: f64) -> ComponentResult<Self> {
        let v = check_positive(volume.value, "chamber volume")?;
        let rt = check_positive(gas_rt, "chamber gas RT")?;
        self.chamber = Some((v, rt));
        Ok(self)
    }

    pub fn throat_area(&self) -> f64 {
        circle_area(self.throat_diameter.value)
    }

    /// Throat flow at chamber pressure `pc` [kg/s].
    pub fn choked_mass_flow(&self, pc: f64) -> f64 {
        pc * self.throat_area() / self.c_star.value
    }

    /// Gas-side compliance `V / (R T)` [m·s²], if the chamber is described.
    pub fn compliance(&self) -> Option<f64> {
        self.chamber.map(|(v, rt)| v / rt)
    }
}

/// Ideal nozzle exit velocity from throat sound speed `a_t`, inlet and exit
/// pressures and the ratio of specific heats.
pub fn ideal_exit_velocity(a_t: f64, p_in: f64, p_exit: f64, gamma: f64) -> ComponentResult<f64> {
    check_positive(a_t, "throat sound speed")?;
    check_positive(p_in, "nozzle inlet pressure")?;
    if gamma.is_nan() || gamma <= 1.0 {
        return Err(ComponentError::InvalidArg {
            what: "gamma must exceed 1",
        });
    }
    if !(0.0..p_in).contains(&p_exit) {
        return Err(ComponentError::InvalidArg {
            what: "exit pressure must be in 0..inlet pressure",
        });
    }
    let expansion = 1.0 - (p_exit / p_in).powf((gamma - 1.0) / gamma);
    check_finite(
        a_t * ((gamma + 1.0) / (gamma - 1.0) * expansion).sqrt(),
        "exit velocity",
    )
}

/// Propellant flow needed for `thrust` at exit velocity `v_exit`.
pub fn ideal_mass_flow(thrust: f64, v_exit: f64) -> ComponentResult<f64> {
    check_positive(v_exit, "exit velocity")?;
    check_finite(thrust / v_exit, "ideal mass flow")
}

impl Ported for ThrustChamber {
    fn port_count(&self) -> usize {
        1
    }
}

impl FlowElement for ThrustChamber {
    fn steady_flow_eqns(
        &self,
        ports: &[NodeId],
        state: &StateVector,
        _fluid: &FluidState,
    ) -> ComponentResult<Vec<f64>> {
        let [n0] = port_nodes::<1>(ports)?;
        let (p0, m0) = (state.pressure(n0)?, state.mass_flow(n0)?);
        Ok(vec![m0 - self.choked_mass_flow(p0)])
    }

    fn storage_terms(&self, ports: &[NodeId], _fluid: &FluidState) -> ComponentResult<RowTerms> {
        let [n0] = port_nodes::<1>(ports)?;
        let row = match self.compliance() {
            Some(cap) => vec![Term::new(Var::Pressure(n0), -cap)],
            None => Vec::new(),
        };
        Ok(vec![row])
    }
}
