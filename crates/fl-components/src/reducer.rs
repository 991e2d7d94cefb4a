//! Concentric reducer (contraction or enlargement) between two diameters.

use std::f64::consts::PI;

use fl_core::numeric::{circle_area, signed_square};
use fl_core::units::{Angle, Length};
use fl_core::{NodeId, StateVector};
use fl_fluids::FluidState;
use fl_network::Ported;

use crate::common::{EPSILON_MDOT, check_finite, check_non_negative, check_positive};
use crate::correlations::{colebrook_white, k_contraction, k_enlargement};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{FlowElement, RowTerms, Term, Var, port_nodes};

const FRICTION_ITERATIONS: usize = 4;

/// Reducer from `inlet_diameter` (port 0) to `outlet_diameter` (port 1).
///
/// Momentum:
/// `P1 - P2 - m²/(2ρ) (1/A2² - 1/A1²) - K m|m|/(2ρ As²) - friction = 0`,
/// where `As` is the smaller area and `K` the Crane contraction or
/// enlargement coefficient for the included angle. Continuity `m2 - m1 = 0`.
#[derive(Debug, Clone)]
pub struct Reducer {
    pub inlet_diameter: Length,
    pub outlet_diameter: Length,
    pub length: Length,
    /// Included cone angle
    pub angle: Angle,
    pub roughness: Length,
}

impl Reducer {
    pub fn new(
        inlet_diameter: Length,
        outlet_diameter: Length,
        length: Length,
        angle: Angle,
        roughness: Length,
    ) -> ComponentResult<Self> {
        check_positive(inlet_diameter.value, "reducer inlet diameter")?;
        check_positive(outlet_diameter.value, "reducer outlet diameter")?;
        check_non_negative(length.value, "reducer length")?;
        check_non_negative(roughness.value, "reducer roughness")?;
        let a = check_finite(angle.value, "reducer angle")?;
        if !(0.0..=PI).contains(&a) {
            return Err(ComponentError::InvalidArg {
                what: "reducer angle must be within 0..180 degrees",
            });
        }
        Ok(Self {
            inlet_diameter,
            outlet_diameter,
            length,
            angle,
            roughness,
        })
    }

    fn small_large(&self) -> (f64, f64) {
        let (d1, d2) = (self.inlet_diameter.value, self.outlet_diameter.value);
        (d1.min(d2), d1.max(d2))
    }

    /// Form loss referenced to the small end.
    pub fn form_loss_coefficient(&self) -> f64 {
        let (ds, dl) = self.small_large();
        let beta = ds / dl;
        let (d1, d2) = (self.inlet_diameter.value, self.outlet_diameter.value);
        if d2 < d1 {
            k_contraction(beta, self.angle.value)
        } else if d2 > d1 {
            k_enlargement(beta, self.angle.value)
        } else {
            0.0
        }
    }

    fn friction_drop(&self, mdot: f64, fluid: &FluidState) -> f64 {
        if self.length.value <= 0.0 || mdot.abs() < EPSILON_MDOT {
            return 0.0;
        }
        let dm = 0.5 * (self.inlet_diameter.value + self.outlet_diameter.value);
        let am = circle_area(dm);
        let re = mdot.abs() * dm / (fluid.viscosity * am);
        let f = colebrook_white(dm, self.roughness.value, re, FRICTION_ITERATIONS);
        f * self.length.value / dm * signed_square(mdot) / (2.0 * am * am * fluid.density)
    }

    /// Inlet-to-outlet pressure change at `mdot` [Pa].
    pub fn pressure_drop(&self, mdot: f64, fluid: &FluidState) -> ComponentResult<f64> {
        let rho = fluid.density;
        let a1 = circle_area(self.inlet_diameter.value);
        let a2 = circle_area(self.outlet_diameter.value);
        let a_small = a1.min(a2);

        let bernoulli = mdot * mdot / (2.0 * rho) * (1.0 / (a2 * a2) - 1.0 / (a1 * a1));
        let form = self.form_loss_coefficient() * signed_square(mdot)
            / (2.0 * rho * a_small * a_small);
        check_finite(
            bernoulli + form + self.friction_drop(mdot, fluid),
            "pressure drop",
        )
    }

    /// `∫ dx / A(x)` over a linear taper, `4 L / (π D1 D2)` [1/m].
    pub fn inertance(&self) -> f64 {
        4.0 * self.length.value / (PI * self.inlet_diameter.value * self.outlet_diameter.value)
    }

    /// Frustum volume [m³]
    pub fn volume(&self) -> f64 {
        let (d1, d2) = (self.inlet_diameter.value, self.outlet_diameter.value);
        PI * self.length.value * (d1 * d1 + d1 * d2 + d2 * d2) / 12.0
    }
}

impl Ported for Reducer {
    fn port_count(&self) -> usize {
        2
    }
}

impl FlowElement for Reducer {
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
        let inertance = self.inertance();
        let momentum = if inertance > 0.0 {
            vec![Term::new(Var::MassFlow(n1), -inertance)]
        } else {
            Vec::new()
        };
        let continuity = match fluid.sound_speed {
            Some(a) if self.length.value > 0.0 => {
                let cap = self.volume() / (a * a);
                vec![
                    Term::new(Var::Pressure(n1), 0.5 * cap),
                    Term::new(Var::Pressure(n2), 0.5 * cap),
                ]
            }
            _ => Vec::new(),
        };
        Ok(vec![momentum, continuity])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::units::{deg, kgpm3, m, pas};

    fn fluid() -> FluidState {
        FluidState::new(kgpm3(1000.0), pas(1e-3)).unwrap()
    }

    #[test]
    fn contraction_accelerates_and_drops_pressure() {
        let r = Reducer::new(m(0.04), m(0.02), m(0.0), deg(30.0), m(0.0)).unwrap();
        let dp = r.pressure_drop(1.0, &fluid()).unwrap();
        let a1 = circle_area(0.04);
        let a2 = circle_area(0.02);
        let bernoulli = 1.0 / 2000.0 * (1.0 / (a2 * a2) - 1.0 / (a1 * a1));
        assert!(dp > bernoulli);
        let k = r.form_loss_coefficient();
        assert!((dp - bernoulli - k / (2000.0 * a2 * a2)).abs() < 1e-6);
    }

    #[test]
    fn enlargement_recovers_pressure() {
        // abrupt enlargement still recovers some static pressure
        let r = Reducer::new(m(0.02), m(0.04), m(0.0), deg(180.0), m(0.0)).unwrap();
        let dp = r.pressure_drop(1.0, &fluid()).unwrap();
        assert!(dp < 0.0);
    }

    #[test]
    fn straight_reducer_is_friction_only() {
        let r = Reducer::new(m(0.02), m(0.02), m(1.0), deg(0.0), m(1e-6)).unwrap();
        assert_eq!(r.form_loss_coefficient(), 0.0);
        assert!(r.pressure_drop(0.5, &fluid()).unwrap() > 0.0);
        let pipe_inertance = 1.0 / circle_area(0.02);
        assert!((r.inertance() - pipe_inertance).abs() / pipe_inertance < 1e-12);
    }

    #[test]
    fn rejects_angle_over_180() {
        assert!(Reducer::new(m(0.02), m(0.01), m(0.1), deg(200.0), m(0.0)).is_err());
    }
}
