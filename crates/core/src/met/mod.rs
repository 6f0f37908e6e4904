//! Imposed meteorology: vertical temperature, moisture and pressure
//! structure as a function of the altitude offset y.
//!
//! The profile is built once from the ambient scalars and read by value
//! everywhere else; nothing in the plume state is referenced back from here.

mod solar;

pub use solar::SolarZenith;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::grid::Mesh;
use crate::physics::thermo;

/// Configuration for the imposed profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetConfig {
    /// Temperature lapse rate dT/dy [K/m]; negative cools with altitude.
    pub lapse_rate_k_per_m: f64,
    /// Depth over which relative humidity relaxes to the background value
    /// away from flight level [m]. Zero keeps RH uniform.
    pub rh_relaxation_depth_m: f64,
}

impl Default for MetConfig {
    fn default() -> Self {
        Self {
            lapse_rate_k_per_m: -3.0e-3,
            rh_relaxation_depth_m: 0.0,
        }
    }
}

/// y-indexed environment columns evaluated at cell rows.
#[derive(Debug, Clone)]
pub struct Meteorology {
    /// Temperature per row [K].
    temperature: Vec<f64>,
    /// Pressure per row [Pa], hydrostatic about flight level.
    pressure: Vec<f64>,
    /// Water vapour number density per row [molecules/cm^3].
    h2o: Vec<f64>,
}

impl Meteorology {
    /// Build the profile about flight level: `temperature_k` and
    /// `pressure_pa` hold at y = 0, temperature follows the lapse rate, and
    /// pressure follows the hydrostatic relation for the local temperature.
    /// Water vapour is set from the relative humidity over liquid at each
    /// row's temperature.
    #[must_use]
    pub fn new(
        mesh: &Mesh,
        temperature_k: f64,
        pressure_pa: f64,
        rel_humidity_w: f64,
        config: &MetConfig,
    ) -> Self {
        let ny = mesh.ny();
        let mut temperature = Vec::with_capacity(ny);
        let mut pressure = Vec::with_capacity(ny);
        let mut h2o = Vec::with_capacity(ny);
        for j in 0..ny {
            let y = mesh.y()[j];
            let t = temperature_k + config.lapse_rate_k_per_m * y;
            // Hydrostatic displacement at the layer-mean temperature.
            let t_mean = 0.5 * (t + temperature_k);
            let p = pressure_pa
                * (-constants::G0 * constants::MW_AIR * y / (constants::R_GAS * t_mean)).exp();
            let rh = if config.rh_relaxation_depth_m > 0.0 {
                let w = (-y.abs() / config.rh_relaxation_depth_m).exp();
                rel_humidity_w * w + rel_humidity_w * 0.5 * (1.0 - w)
            } else {
                rel_humidity_w
            };
            let n_h2o = rh / 100.0 * thermo::psat_h2o_liquid(t) / (constants::K_B * t) * 1.0e-6;
            temperature.push(t);
            pressure.push(p);
            h2o.push(n_h2o);
        }
        Self {
            temperature,
            pressure,
            h2o,
        }
    }

    /// Temperature at cell row `j` [K].
    #[inline]
    #[must_use]
    pub fn temperature(&self, j: usize) -> f64 {
        self.temperature[j]
    }

    /// Pressure at cell row `j` [Pa].
    #[inline]
    #[must_use]
    pub fn pressure(&self, j: usize) -> f64 {
        self.pressure[j]
    }

    /// Water vapour number density at cell row `j` [molecules/cm^3].
    #[inline]
    #[must_use]
    pub fn h2o(&self, j: usize) -> f64 {
        self.h2o[j]
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.temperature.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Mesh, Meteorology) {
        let mesh = Mesh::new(8, 16, 800.0, 800.0);
        let met = Meteorology::new(&mesh, 220.0, 24000.0, 60.0, &MetConfig::default());
        (mesh, met)
    }

    #[test]
    fn temperature_follows_lapse_rate() {
        let (mesh, met) = setup();
        let j_lo = 0;
        let j_hi = mesh.ny() - 1;
        let dt = met.temperature(j_hi) - met.temperature(j_lo);
        let dy = mesh.y()[j_hi] - mesh.y()[j_lo];
        assert!((dt / dy - (-3.0e-3)).abs() < 1e-12);
    }

    #[test]
    fn pressure_decreases_upward() {
        let (mesh, met) = setup();
        for j in 1..mesh.ny() {
            assert!(met.pressure(j) < met.pressure(j - 1));
        }
    }

    #[test]
    fn flight_level_matches_inputs() {
        let (mesh, met) = setup();
        // Rows straddling y = 0.
        let j = mesh.ny() / 2;
        assert!((met.temperature(j) - 220.0).abs() < 0.2);
        assert!((met.pressure(j) - 24000.0).abs() / 24000.0 < 0.01);
    }
}
