//! Fluid property trait.

use fl_core::units::{Density, DynVisc, Temperature, Velocity};
use uom::si::f64::{SpecificHeatCapacity, ThermalConductivity};

use crate::error::FluidResult;
use crate::state::FluidState;

pub type SpecHeat = SpecificHeatCapacity;
pub type Conductivity = ThermalConductivity;

/// Default evaluation temperature [K].
pub const T_STP: f64 = 273.15;

/// Temperature-dependent transport properties of a liquid.
///
/// Implementations are pure: a lookup never changes the model.
pub trait FluidProperties {
    fn name(&self) -> &str;

    fn density(&self, t: Temperature) -> FluidResult<Density>;

    fn specific_heat(&self, t: Temperature) -> FluidResult<SpecHeat>;

    fn conductivity(&self, t: Temperature) -> FluidResult<Conductivity>;

    fn viscosity(&self, t: Temperature) -> FluidResult<DynVisc>;

    /// Speed of sound, if the model knows it.
    fn sound_speed(&self, _t: Temperature) -> FluidResult<Option<Velocity>> {
        Ok(None)
    }

    /// Snapshot of everything a flow element needs at `t`.
    fn state(&self, t: Temperature) -> FluidResult<FluidState> {
        let state = FluidState::new(self.density(t)?, self.viscosity(t)?)?;
        match self.sound_speed(t)? {
            Some(a) => state.with_sound_speed(a),
            None => Ok(state),
        }
    }
}
