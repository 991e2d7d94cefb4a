//! Temperature-independent fluid.

use fl_core::units::{Density, DynVisc, Temperature, Velocity, kgpm3, mps, pas};
use uom::si::specific_heat_capacity::joule_per_kilogram_kelvin;
use uom::si::thermal_conductivity::watt_per_meter_kelvin;

use crate::error::{FluidError, FluidResult};
use crate::model::{Conductivity, FluidProperties, SpecHeat};

#[derive(Clone, Debug)]
pub struct ConstantFluid {
    name: String,
    density: Density,
    viscosity: DynVisc,
    specific_heat: SpecHeat,
    conductivity: Conductivity,
    sound_speed: Option<Velocity>,
}

impl ConstantFluid {
    pub fn new(
        name: impl Into<String>,
        density: Density,
        viscosity: DynVisc,
    ) -> FluidResult<Self> {
        if !(density.value.is_finite() && density.value > 0.0) {
            return Err(FluidError::NonPhysical { what: "density" });
        }
        if !(viscosity.value.is_finite() && viscosity.value > 0.0) {
            return Err(FluidError::NonPhysical { what: "viscosity" });
        }
        Ok(Self {
            name: name.into(),
            density,
            viscosity,
            specific_heat: SpecHeat::new::<joule_per_kilogram_kelvin>(0.0),
            conductivity: Conductivity::new::<watt_per_meter_kelvin>(0.0),
            sound_speed: None,
        })
    }

    pub fn with_thermal(mut self, cp_j_per_kg_k: f64, k_w_per_m_k: f64) -> Self {
        self.specific_heat = SpecHeat::new::<joule_per_kilogram_kelvin>(cp_j_per_kg_k);
        self.conductivity = Conductivity::new::<watt_per_meter_kelvin>(k_w_per_m_k);
        self
    }

    pub fn with_sound_speed(mut self, sound_speed: Velocity) -> Self {
        self.sound_speed = Some(sound_speed);
        self
    }

    /// Liquid water near 20 °C.
    pub fn water() -> Self {
        Self {
            name: "Water".into(),
            density: kgpm3(998.2),
            viscosity: pas(1.002e-3),
            specific_heat: SpecHeat::new::<joule_per_kilogram_kelvin>(4182.0),
            conductivity: Conductivity::new::<watt_per_meter_kelvin>(0.598),
            sound_speed: Some(mps(1482.0)),
        }
    }
}

impl FluidProperties for ConstantFluid {
    fn name(&self) -> &str {
        &self.name
    }

    fn density(&self, _t: Temperature) -> FluidResult<Density> {
        Ok(self.density)
    }

    fn specific_heat(&self, _t: Temperature) -> FluidResult<SpecHeat> {
        Ok(self.specific_heat)
    }

    fn conductivity(&self, _t: Temperature) -> FluidResult<Conductivity> {
        Ok(self.conductivity)
    }

    fn viscosity(&self, _t: Temperature) -> FluidResult<DynVisc> {
        Ok(self.viscosity)
    }

    fn sound_speed(&self, _t: Temperature) -> FluidResult<Option<Velocity>> {
        Ok(self.sound_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::units::k;

    #[test]
    fn water_preset_state() {
        let s = ConstantFluid::water().state(k(300.0)).unwrap();
        assert!((s.density - 998.2).abs() < 1e-12);
        assert_eq!(s.sound_speed, Some(1482.0));
    }

    #[test]
    fn constant_ignores_temperature() {
        let f = ConstantFluid::new("RP-1", kgpm3(810.0), pas(2e-3)).unwrap();
        assert_eq!(
            f.density(k(250.0)).unwrap(),
            f.density(k(400.0)).unwrap()
        );
        assert!(f.state(k(300.0)).unwrap().sound_speed.is_none());
    }

    #[test]
    fn rejects_zero_viscosity() {
        assert!(ConstantFluid::new("bad", kgpm3(1000.0), pas(0.0)).is_err());
    }
}
