//! Orifice plate with one or more identical holes.

use fl_core::numeric::{circle_area, signed_square};
use fl_core::units::{Angle, Length};
use fl_core::{NodeId, StateVector};
use fl_fluids::FluidState;
use fl_network::Ported;
use tracing::warn;

use crate::common::{EPSILON_MDOT, check_finite, check_non_negative, check_positive};
use crate::correlations::{OrificeK, k_orifice_beveled, k_orifice_rounded, k_orifice_sharp};
use crate::error::{ComponentError, ComponentResult, RangeWarning};
use crate::traits::{FlowElement, RowTerms, Term, Var, port_nodes};

/// Orifice plate: port 0 upstream, port 1 downstream.
///
/// Momentum: `P1 - P2 - Ko (m/N)|m/N| / (2 Ao² ρ) = 0`; continuity `m2 - m1 = 0`.
/// The loss coefficient must be set (directly, from an edge correlation or
/// by fitting test data) before the element can be evaluated.
#[derive(Debug, Clone)]
pub struct Orifice {
    /// Hole diameter
    pub diameter: Length,
    /// Hole (plate) length
    pub length: Length,
    /// Number of holes
    pub count: u32,
    ko: Option<f64>,
    warnings: Vec<RangeWarning>,
}

impl Orifice {
    pub fn new(diameter: Length, length: Length, count: u32) -> ComponentResult<Self> {
        check_positive(diameter.value, "orifice diameter")?;
        check_non_negative(length.value, "orifice length")?;
        if count == 0 {
            return Err(ComponentError::InvalidArg {
                what: "orifice plate needs at least one hole",
            });
        }
        Ok(Self {
            diameter,
            length,
            count,
            ko: None,
            warnings: Vec::new(),
        })
    }

    /// Area of one hole [m²]
    pub fn hole_area(&self) -> f64 {
        circle_area(self.diameter.value)
    }

    fn holes_squared(&self) -> f64 {
        let n = f64::from(self.count);
        n * n
    }

    /// Single-hole loss coefficient, if set.
    pub fn ko(&self) -> Option<f64> {
        self.ko
    }

    /// Whole-plate loss coefficient `Ko / N²`, if set.
    pub fn knet(&self) -> Option<f64> {
        self.ko.map(|ko| ko / self.holes_squared())
    }

    pub fn set_ko(&mut self, ko: f64) -> ComponentResult<()> {
        self.ko = Some(check_positive(ko, "orifice Ko")?);
        Ok(())
    }

    pub fn set_knet(&mut self, knet: f64) -> ComponentResult<()> {
        let knet = check_positive(knet, "orifice Knet")?;
        self.ko = Some(knet * self.holes_squared());
        Ok(())
    }

    pub fn with_ko(mut self, ko: f64) -> ComponentResult<Self> {
        self.set_ko(ko)?;
        Ok(self)
    }

    pub fn with_knet(mut self, knet: f64) -> ComponentResult<Self> {
        self.set_knet(knet)?;
        Ok(self)
    }

    fn apply(mut self, k: OrificeK) -> ComponentResult<Self> {
        if let Some(w) = &k.warning {
            warn!(warning = %w, "orifice correlation out of range");
        }
        self.warnings.extend(k.warning);
        self.set_ko(k.ko)?;
        Ok(self)
    }

    /// Sharp-edged holes between pipes of diameter `d_up` and `d_down`.
    pub fn with_sharp_edge(self, d_up: Length, d_down: Length) -> ComponentResult<Self> {
        let k = k_orifice_sharp(
            self.count,
            self.length.value,
            self.diameter.value,
            d_up.value,
            d_down.value,
        )?;
        self.apply(k)
    }

    /// Holes with a rounded inlet of fillet radius `radius`.
    pub fn with_rounded_edge(
        self,
        d_up: Length,
        d_down: Length,
        radius: Length,
    ) -> ComponentResult<Self> {
        let k = k_orifice_rounded(
            self.count,
            self.diameter.value,
            d_up.value,
            d_down.value,
            radius.value,
        )?;
        self.apply(k)
    }

    /// Holes with a beveled inlet; the bevel spans the plate length.
    pub fn with_beveled_edge(
        self,
        d_up: Length,
        d_down: Length,
        bevel: Angle,
    ) -> ComponentResult<Self> {
        let k = k_orifice_beveled(
            self.count,
            self.length.value,
            self.diameter.value,
            d_up.value,
            d_down.value,
            bevel.value,
        )?;
        self.apply(k)
    }

    /// Fit `Knet` as the mean of `2 Ao² ρ ΔP / m²` over test points
    /// `(mdot, dp, rho)`, store it and return it.
    pub fn fit_k(&mut self, data: &[(f64, f64, f64)]) -> ComponentResult<f64> {
        if data.is_empty() {
            return Err(ComponentError::InvalidArg {
                what: "no test data to fit",
            });
        }
        let a = self.hole_area();
        let mut sum = 0.0;
        for &(mdot, dp, rho) in data {
            if mdot.abs() < EPSILON_MDOT {
                return Err(ComponentError::InvalidArg {
                    what: "test point with zero flow",
                });
            }
            check_positive(rho, "test density")?;
            sum += check_finite(2.0 * a * a * rho * dp / (mdot * mdot), "fitted Knet")?;
        }
        let knet = sum / data.len() as f64;
        self.set_knet(knet)?;
        Ok(knet)
    }

    /// Signed pressure drop at total flow `mdot` [Pa].
    pub fn pressure_drop(&self, mdot: f64, fluid: &FluidState) -> ComponentResult<f64> {
        let ko = self.ko.ok_or(ComponentError::MissingParameter {
            what: "orifice loss coefficient",
        })?;
        let a = self.hole_area();
        let per_hole = mdot / f64::from(self.count);
        check_finite(
            ko * signed_square(per_hole) / (2.0 * a * a * fluid.density),
            "pressure drop",
        )
    }

    /// Mass-flow inertance of the parallel holes, `lo / (N Ao)` [1/m].
    pub fn inertance(&self) -> f64 {
        self.length.value / (f64::from(self.count) * self.hole_area())
    }
}

impl Ported for Orifice {
    fn port_count(&self) -> usize {
        2
    }
}

impl FlowElement for Orifice {
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

    fn storage_terms(&self, ports: &[NodeId], _fluid: &FluidState) -> ComponentResult<RowTerms> {
        let [n1, _] = port_nodes::<2>(ports)?;
        let inertance = self.inertance();
        let momentum = if inertance > 0.0 {
            vec![Term::new(Var::MassFlow(n1), -inertance)]
        } else {
            Vec::new()
        };
        Ok(vec![momentum, Vec::new()])
    }

    fn domain_warnings(&self) -> Vec<RangeWarning> {
        self.warnings.clone()
    }
}
