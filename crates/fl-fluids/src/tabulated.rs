//! Fluid properties interpolated from reference tables.

use fl_core::units::{Density, DynVisc, Temperature, Velocity, kgpm3, mps, pas};
use uom::si::specific_heat_capacity::joule_per_kilogram_kelvin;
use uom::si::thermal_conductivity::watt_per_meter_kelvin;

use crate::error::{FluidError, FluidResult};
use crate::model::{Conductivity, FluidProperties, SpecHeat};

/// One table row, SI units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyRow {
    /// Temperature [K]
    pub t: f64,
    /// Density [kg/m³]
    pub rho: f64,
    /// Specific heat [J/(kg·K)]
    pub cp: f64,
    /// Thermal conductivity [W/(m·K)]
    pub k: f64,
    /// Dynamic viscosity [Pa·s]
    pub mu: f64,
}

/// Piecewise-linear interpolation over rows sorted by temperature.
///
/// Queries outside the first and last row are errors, never extrapolated.
#[derive(Clone, Debug)]
pub struct TabulatedFluid {
    name: String,
    rows: Vec<PropertyRow>,
    sound_speed: Option<f64>,
}

impl TabulatedFluid {
    pub fn new(name: impl Into<String>, rows: Vec<PropertyRow>) -> FluidResult<Self> {
        if rows.len() < 2 {
            return Err(FluidError::InvalidTable {
                what: "need at least two rows",
            });
        }
        if rows.windows(2).any(|w| w[1].t <= w[0].t) {
            return Err(FluidError::InvalidTable {
                what: "temperatures must be strictly increasing",
            });
        }
        let bad = rows.iter().any(|r| {
            [r.t, r.rho, r.mu].iter().any(|v| !(v.is_finite() && *v > 0.0))
                || !r.cp.is_finite()
                || !r.k.is_finite()
        });
        if bad {
            return Err(FluidError::InvalidTable {
                what: "non-physical entry",
            });
        }
        Ok(Self {
            name: name.into(),
            rows,
            sound_speed: None,
        })
    }

    pub fn with_sound_speed(mut self, sound_speed: Velocity) -> Self {
        self.sound_speed = Some(sound_speed.value);
        self
    }

    pub fn range(&self) -> (f64, f64) {
        let first = self.rows.first().map_or(0.0, |r| r.t);
        let last = self.rows.last().map_or(0.0, |r| r.t);
        (first, last)
    }

    fn interpolate(&self, t: f64, field: impl Fn(&PropertyRow) -> f64) -> FluidResult<f64> {
        let (min, max) = self.range();
        if !(t.is_finite() && t >= min && t <= max) {
            return Err(FluidError::OutOfRange {
                what: "temperature",
                value: t,
                min,
                max,
            });
        }
        // first row with t_row >= t, so the bracket is [hi-1, hi]
        let hi = self.rows.partition_point(|r| r.t < t).max(1);
        let (a, b) = (&self.rows[hi - 1], &self.rows[hi]);
        let w = (t - a.t) / (b.t - a.t);
        Ok(field(a) + w * (field(b) - field(a)))
    }
}

impl FluidProperties for TabulatedFluid {
    fn name(&self) -> &str {
        &self.name
    }

    fn density(&self, t: Temperature) -> FluidResult<Density> {
        Ok(kgpm3(self.interpolate(t.value, |r| r.rho)?))
    }

    fn specific_heat(&self, t: Temperature) -> FluidResult<SpecHeat> {
        let cp = self.interpolate(t.value, |r| r.cp)?;
        Ok(SpecHeat::new::<joule_per_kilogram_kelvin>(cp))
    }

    fn conductivity(&self, t: Temperature) -> FluidResult<Conductivity> {
        let k = self.interpolate(t.value, |r| r.k)?;
        Ok(Conductivity::new::<watt_per_meter_kelvin>(k))
    }

    fn viscosity(&self, t: Temperature) -> FluidResult<DynVisc> {
        Ok(pas(self.interpolate(t.value, |r| r.mu)?))
    }

    fn sound_speed(&self, _t: Temperature) -> FluidResult<Option<Velocity>> {
        Ok(self.sound_speed.map(mps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::units::k;

    fn table() -> TabulatedFluid {
        TabulatedFluid::new(
            "kerosene",
            vec![
                PropertyRow { t: 250.0, rho: 830.0, cp: 1900.0, k: 0.12, mu: 4e-3 },
                PropertyRow { t: 300.0, rho: 800.0, cp: 2000.0, k: 0.11, mu: 2e-3 },
                PropertyRow { t: 400.0, rho: 720.0, cp: 2300.0, k: 0.10, mu: 8e-4 },
            ],
        )
        .unwrap()
    }

    #[test]
    fn interpolates_between_rows() {
        let f = table();
        let rho = f.density(k(275.0)).unwrap().value;
        assert!((rho - 815.0).abs() < 1e-9);
        let mu = f.viscosity(k(350.0)).unwrap().value;
        assert!((mu - 1.4e-3).abs() < 1e-12);
    }

    #[test]
    fn exact_at_endpoints() {
        let f = table();
        assert!((f.density(k(250.0)).unwrap().value - 830.0).abs() < 1e-12);
        assert!((f.density(k(400.0)).unwrap().value - 720.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_is_error() {
        let f = table();
        assert!(matches!(
            f.density(k(401.0)),
            Err(FluidError::OutOfRange { .. })
        ));
        assert!(f.viscosity(k(f64::NAN)).is_err());
    }

    #[test]
    fn rejects_unsorted_rows() {
        let rows = vec![
            PropertyRow { t: 300.0, rho: 800.0, cp: 2000.0, k: 0.11, mu: 2e-3 },
            PropertyRow { t: 250.0, rho: 830.0, cp: 1900.0, k: 0.12, mu: 4e-3 },
        ];
        assert!(TabulatedFluid::new("bad", rows).is_err());
    }
}
