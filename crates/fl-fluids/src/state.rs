//! Per-element fluid snapshot.

use fl_core::units::{Density, DynVisc, Velocity};

use crate::error::{FluidError, FluidResult};

/// Properties an element needs to evaluate its equations, in SI `f64`.
///
/// `sound_speed` is only needed for compliance terms in the dynamics
/// matrices; without it elements contribute no line capacitance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidState {
    /// Density [kg/m³]
    pub density: f64,
    /// Dynamic viscosity [Pa·s]
    pub viscosity: f64,
    /// Speed of sound in the liquid [m/s]
    pub sound_speed: Option<f64>,
}

impl FluidState {
    pub fn new(density: Density, viscosity: DynVisc) -> FluidResult<Self> {
        let state = Self {
            density: density.value,
            viscosity: viscosity.value,
            sound_speed: None,
        };
        state.validate()?;
        Ok(state)
    }

    pub fn with_sound_speed(mut self, sound_speed: Velocity) -> FluidResult<Self> {
        self.sound_speed = Some(sound_speed.value);
        self.validate()?;
        Ok(self)
    }

    /// Reject non-finite or non-positive properties.
    pub fn validate(&self) -> FluidResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.density) {
            return Err(FluidError::NonPhysical { what: "density" });
        }
        if !positive(self.viscosity) {
            return Err(FluidError::NonPhysical { what: "viscosity" });
        }
        if self.sound_speed.is_some_and(|a| !positive(a)) {
            return Err(FluidError::NonPhysical {
                what: "sound speed",
            });
        }
        Ok(())
    }
}
