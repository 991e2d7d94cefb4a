//! Constant-area pipe with Darcy friction, bends and elevation change.

use fl_core::constants::G0_MPS2;
use fl_core::numeric::{circle_area, signed_square};
use fl_core::units::{Angle, Length, m};
use fl_core::{NodeId, StateVector};
use fl_fluids::FluidState;
use fl_network::Ported;

use crate::common::{EPSILON_MDOT, check_finite, check_non_negative, check_positive};
use crate::correlations::{churchill, colebrook_white, k_bend, k_friction};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{FlowElement, RowTerms, Term, Var, port_nodes};

/// Tabulated friction factor against Reynolds number, interpolated in
/// `log10(Re)` and held constant past either end.
#[derive(Debug, Clone, PartialEq)]
pub struct FrictionCurve {
    reynolds: Vec<f64>,
    friction: Vec<f64>,
}

impl FrictionCurve {
    pub fn new(reynolds: Vec<f64>, friction: Vec<f64>) -> ComponentResult<Self> {
        if reynolds.is_empty() || reynolds.len() != friction.len() {
            return Err(ComponentError::InvalidArg {
                what: "friction curve needs matching, non-empty Re and f data",
            });
        }
        if reynolds.iter().any(|re| !(re.is_finite() && *re > 0.0))
            || reynolds.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(ComponentError::InvalidArg {
                what: "friction curve Re must be positive and increasing",
            });
        }
        if friction.iter().any(|f| !(f.is_finite() && *f > 0.0)) {
            return Err(ComponentError::NonPhysical {
                what: "friction curve factor",
            });
        }
        Ok(Self { reynolds, friction })
    }

    pub fn friction_factor(&self, re: f64) -> f64 {
        let last = self.reynolds.len() - 1;
        if re <= self.reynolds[0] {
            return self.friction[0];
        }
        if re >= self.reynolds[last] {
            return self.friction[last];
        }
        let hi = self.reynolds.partition_point(|&r| r < re);
        let (r0, r1) = (self.reynolds[hi - 1].log10(), self.reynolds[hi].log10());
        let w = (re.log10() - r0) / (r1 - r0);
        self.friction[hi - 1] + w * (self.friction[hi] - self.friction[hi - 1])
    }
}

/// How the Darcy friction factor is obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum FrictionModel {
    ColebrookWhite { iterations: usize },
    Churchill,
    Empirical(FrictionCurve),
}

impl Default for FrictionModel {
    fn default() -> Self {
        FrictionModel::ColebrookWhite { iterations: 4 }
    }
}

/// A circular bend along the pipe run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bend {
    pub radius: Length,
    pub angle: Angle,
}

/// Two-port pipe: port 0 is the inlet, port 1 the outlet.
///
/// Momentum: `P1 - P2 - K(Re) m|m| / (2 A² ρ) - ρ g0 Δz = 0`, with
/// `K = f l/D + Σ K_bend`. Continuity: `m2 - m1 = 0`.
#[derive(Debug, Clone)]
pub struct Pipe {
    /// Pipe length
    pub length: Length,
    /// Hydraulic diameter
    pub diameter: Length,
    /// Absolute wall roughness
    pub roughness: Length,
    pub bends: Vec<Bend>,
    /// Outlet height minus inlet height
    pub elevation_change: Length,
    pub friction: FrictionModel,
}

impl Pipe {
    pub fn new(length: Length, diameter: Length, roughness: Length) -> ComponentResult<Self> {
        check_positive(length.value, "pipe length")?;
        check_positive(diameter.value, "pipe diameter")?;
        check_non_negative(roughness.value, "pipe roughness")?;
        Ok(Self {
            length,
            diameter,
            roughness,
            bends: Vec::new(),
            elevation_change: m(0.0),
            friction: FrictionModel::default(),
        })
    }

    pub fn with_bend(mut self, radius: Length, angle: Angle) -> ComponentResult<Self> {
        check_positive(radius.value, "bend radius")?;
        check_non_negative(angle.value, "bend angle")?;
        self.bends.push(Bend { radius, angle });
        Ok(self)
    }

    pub fn with_elevation_change(mut self, dz: Length) -> ComponentResult<Self> {
        check_finite(dz.value, "elevation change")?;
        self.elevation_change = dz;
        Ok(self)
    }

    pub fn with_friction_model(mut self, friction: FrictionModel) -> Self {
        self.friction = friction;
        self
    }

    /// Flow area [m²]
    pub fn area(&self) -> f64 {
        circle_area(self.diameter.value)
    }

    pub fn reynolds(&self, mdot: f64, fluid: &FluidState) -> f64 {
        mdot.abs() * self.diameter.value / (fluid.viscosity * self.area())
    }

    pub fn friction_factor(&self, re: f64) -> f64 {
        let d = self.diameter.value;
        let eps = self.roughness.value;
        match &self.friction {
            FrictionModel::ColebrookWhite { iterations } => colebrook_white(d, eps, re, *iterations),
            FrictionModel::Churchill => churchill(d, eps, re),
            FrictionModel::Empirical(curve) => curve.friction_factor(re),
        }
    }

    /// Total loss coefficient at `mdot`, friction plus bends.
    pub fn loss_coefficient(&self, mdot: f64, fluid: &FluidState) -> ComponentResult<f64> {
        let re = check_finite(self.reynolds(mdot, fluid), "Reynolds number")?;
        let f = self.friction_factor(re);
        let d = self.diameter.value;
        let bends: f64 = self
            .bends
            .iter()
            .map(|b| k_bend(f, d, b.radius.value, b.angle.value))
            .sum();
        check_finite(k_friction(f, self.length.value, d) + bends, "pipe loss coefficient")
    }

    /// Signed inlet-to-outlet pressure drop at `mdot` [Pa].
    pub fn pressure_drop(&self, mdot: f64, fluid: &FluidState) -> ComponentResult<f64> {
        let rho = fluid.density;
        let body = rho * G0_MPS2 * self.elevation_change.value;
        if mdot.abs() < EPSILON_MDOT {
            return Ok(body);
        }
        let a = self.area();
        let k = self.loss_coefficient(mdot, fluid)?;
        check_finite(k * signed_square(mdot) / (2.0 * a * a * rho) + body, "pressure drop")
    }

    /// Mass-flow inertance `l / A` [1/m].
    pub fn inertance(&self) -> f64 {
        self.length.value / self.area()
    }

    /// Line compliance `A l / a²` [m·s²], if the fluid has a sound speed.
    pub fn compliance(&self, fluid: &FluidState) -> Option<f64> {
        fluid
            .sound_speed
            .map(|a| self.area() * self.length.value / (a * a))
    }
}

impl Ported for Pipe {
    fn port_count(&self) -> usize {
        2
    }
}

impl FlowElement for Pipe {
    fn steady_flow_eqns(
        &self,
        ports: &[NodeId],
        state: &StateVector,
        fluid: &FluidState,
    ) -> ComponentResult<Vec<f64>> {
        let [n1, n2] = port_nodes::<2>(ports)?;
        let (p1, p2) = (state.pressure(n1)?, state.pressure(n2)?);
        let (m1, m2) = (state.mass_flow(n1)?, state.mass_flow(n2)?);

        Ok(vec![p1 - p2 - self.pressure_drop(m1, fluid)?, m2 - m1])
    }

    fn storage_terms(&self, ports: &[NodeId], fluid: &FluidState) -> ComponentResult<RowTerms> {
        let [n1, n2] = port_nodes::<2>(ports)?;
        let momentum = vec![Term::new(Var::MassFlow(n1), -self.inertance())];
        let continuity = match self.compliance(fluid) {
            Some(cap) => vec![
                Term::new(Var::Pressure(n1), 0.5 * cap),
                Term::new(Var::Pressure(n2), 0.5 * cap),
            ],
            None => Vec::new(),
        };
        Ok(vec![momentum, continuity])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::units::{deg, kgpm3, pas};

    fn water() -> FluidState {
        FluidState::new(kgpm3(998.0), pas(1.0e-3)).unwrap()
    }

    fn pipe() -> Pipe {
        Pipe::new(m(1.0), m(0.02), m(1.5e-6)).unwrap()
    }

    fn nodes() -> [NodeId; 2] {
        [NodeId::from_index(0), NodeId::from_index(1)]
    }

    #[test]
    fn pipe_zero_flow_equal_pressure() {
        let sv = StateVector {
            pressures: vec![2e5, 2e5],
            mass_flows: vec![0.0, 0.0],
        };
        let r = pipe().steady_flow_eqns(&nodes(), &sv, &water()).unwrap();
        assert_eq!(r, vec![0.0, 0.0]);
    }

    #[test]
    fn pipe_positive_flow() {
        let p = pipe();
        let fluid = water();
        let mdot = 1.0;
        let dp = p.pressure_drop(mdot, &fluid).unwrap();
        assert!(dp > 0.0);

        let k = p.loss_coefficient(mdot, &fluid).unwrap();
        let a = p.area();
        assert!((dp - k * mdot * mdot / (2.0 * a * a * fluid.density)).abs() < 1e-9);

        let sv = StateVector {
            pressures: vec![3e5, 3e5 - dp],
            mass_flows: vec![mdot, mdot],
        };
        let r = p.steady_flow_eqns(&nodes(), &sv, &fluid).unwrap();
        assert!(r[0].abs() < 1e-6);
        assert_eq!(r[1], 0.0);
    }

    #[test]
    fn pipe_reverse_flow_is_antisymmetric() {
        let p = pipe();
        let fluid = water();
        let fwd = p.pressure_drop(0.7, &fluid).unwrap();
        let rev = p.pressure_drop(-0.7, &fluid).unwrap();
        assert!((fwd + rev).abs() < 1e-9);
    }

    #[test]
    fn bends_and_rise_add_loss() {
        let fluid = water();
        let straight = pipe().pressure_drop(1.0, &fluid).unwrap();
        let bent = pipe()
            .with_bend(m(0.05), deg(90.0))
            .unwrap()
            .pressure_drop(1.0, &fluid)
            .unwrap();
        assert!(bent > straight);

        let rising = pipe().with_elevation_change(m(2.0)).unwrap();
        let static_head = rising.pressure_drop(0.0, &fluid).unwrap();
        assert!((static_head - 998.0 * G0_MPS2 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn empirical_curve_overrides_correlation() {
        let curve = FrictionCurve::new(vec![1e3, 1e5], vec![0.04, 0.02]).unwrap();
        let p = pipe().with_friction_model(FrictionModel::Empirical(curve));
        assert!((p.friction_factor(1e4) - 0.03).abs() < 1e-12);
        assert_eq!(p.friction_factor(1e7), 0.02);
    }

    #[test]
    fn storage_terms_follow_residual_rows() {
        let p = pipe();
        let fluid = water().with_sound_speed(fl_core::units::mps(1400.0)).unwrap();
        let rows = p.storage_terms(&nodes(), &fluid).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].var, Var::MassFlow(NodeId::from_index(0)));
        assert!((rows[0][0].coeff + p.inertance()).abs() < 1e-12);
        assert_eq!(rows[1].len(), 2);

        let no_sound = p.storage_terms(&nodes(), &water()).unwrap();
        assert!(no_sound[1].is_empty());
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(Pipe::new(m(0.0), m(0.02), m(0.0)).is_err());
        assert!(Pipe::new(m(1.0), m(-0.02), m(0.0)).is_err());
    }
}
