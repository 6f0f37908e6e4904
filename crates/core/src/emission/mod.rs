//! Engine, fuel and aircraft characteristics and their aggregation into
//! per-fuel-mass emission indices.
//!
//! CO2, H2O and the sulfur species follow from the fuel composition; NOx,
//! CO, unburned hydrocarbons and soot are engine properties. An aircraft
//! pairs an engine with flight parameters.

use serde::{Deserialize, Serialize};

/// Jet fuel described by its mean molecular formula `CnHm` and fuel sulfur
/// content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fuel {
    /// Carbon atoms per mean molecule.
    pub n_carbon: f64,
    /// Hydrogen atoms per mean molecule.
    pub n_hydrogen: f64,
    /// Fuel sulfur content [mass fraction].
    pub fsc: f64,
}

impl Fuel {
    /// Conventional Jet A surrogate, C12H24 at 600 ppm sulfur by mass.
    #[must_use]
    pub fn jet_a() -> Self {
        Self {
            n_carbon: 12.0,
            n_hydrogen: 24.0,
            fsc: 6.0e-4,
        }
    }

    /// Mean molar mass of the fuel [g/mol].
    #[must_use]
    pub fn molar_mass(&self) -> f64 {
        12.011 * self.n_carbon + 1.008 * self.n_hydrogen
    }

    /// CO2 emission index [g/kg fuel] from complete combustion.
    #[must_use]
    pub fn ei_co2(&self) -> f64 {
        1000.0 * self.n_carbon * 44.01 / self.molar_mass()
    }

    /// H2O emission index [g/kg fuel] from complete combustion.
    #[must_use]
    pub fn ei_h2o(&self) -> f64 {
        1000.0 * (self.n_hydrogen / 2.0) * 18.02 / self.molar_mass()
    }

    /// SO2 emission index [g/kg fuel] from the fuel sulfur content.
    #[must_use]
    pub fn ei_so2(&self) -> f64 {
        1000.0 * self.fsc * 64.06 / 32.06
    }
}

/// Engine-dependent emission characteristics at cruise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    /// NOx emission index [g(NO2)/kg fuel].
    pub ei_nox: f64,
    /// CO emission index [g/kg fuel].
    pub ei_co: f64,
    /// Unburned-hydrocarbon emission index [g/kg fuel].
    pub ei_uhc: f64,
    /// Soot mass emission index [g/kg fuel].
    pub ei_soot: f64,
    /// Soot primary-particle radius [m].
    pub soot_radius: f64,
    /// Fuel flow per engine [kg/s].
    pub fuel_flow: f64,
}

impl Engine {
    /// A representative large high-bypass turbofan at cruise.
    #[must_use]
    pub fn cruise_default() -> Self {
        Self {
            ei_nox: 14.0,
            ei_co: 1.5,
            ei_uhc: 0.1,
            ei_soot: 0.04,
            soot_radius: 2.0e-8,
            fuel_flow: 0.7,
        }
    }
}

/// Aircraft: engine pairing plus flight and wake-vortex parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub engine: Engine,
    /// Number of engines.
    pub n_engines: u32,
    /// True airspeed [m/s].
    pub flight_speed: f64,
    /// Initial wake-vortex downward displacement [m].
    pub vortex_delta_z: f64,
}

impl Aircraft {
    /// Four-engine wide-body default (B747 class).
    #[must_use]
    pub fn b747() -> Self {
        Self {
            engine: Engine::cruise_default(),
            n_engines: 4,
            flight_speed: 250.0,
            vortex_delta_z: 60.0,
        }
    }

    /// Total fuel flow over all engines [kg/s].
    #[must_use]
    pub fn total_fuel_flow(&self) -> f64 {
        self.engine.fuel_flow * f64::from(self.n_engines)
    }

    /// Fuel burned per metre of flight path [kg/m].
    #[must_use]
    pub fn fuel_per_metre(&self) -> f64 {
        self.total_fuel_flow() / self.flight_speed
    }
}

/// Aggregated emission indices for one aircraft/fuel pairing, all in
/// grams per kilogram of fuel unless noted. The NOx index is split onto
/// NO, NO2 and HNO2 with the conventional cruise partitioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionIndex {
    pub co2: f64,
    pub h2o: f64,
    pub no: f64,
    pub no2: f64,
    pub hno2: f64,
    pub co: f64,
    pub uhc: f64,
    pub so2: f64,
    /// Fraction of emitted sulfur converted to SO4 in the engine and early
    /// plume.
    pub so2_to_so4: f64,
    pub soot: f64,
    /// Soot primary-particle radius [m].
    pub soot_radius: f64,
}

impl EmissionIndex {
    /// Aggregate fuel and engine characteristics.
    #[must_use]
    pub fn new(fuel: &Fuel, engine: &Engine, so2_to_so4: f64) -> Self {
        // 90% NO, 9% NO2, 1% HNO2 by mass of the NO2-equivalent index.
        let nox = engine.ei_nox;
        Self {
            co2: fuel.ei_co2(),
            h2o: fuel.ei_h2o(),
            no: 0.90 * nox * 30.01 / 46.01,
            no2: 0.09 * nox,
            hno2: 0.01 * nox * 47.01 / 46.01,
            co: engine.ei_co,
            uhc: engine.ei_uhc,
            so2: fuel.ei_so2(),
            so2_to_so4,
            soot: engine.ei_soot,
            soot_radius: engine.soot_radius,
        }
    }

    /// Soot number emission index [particles/kg fuel] for the monodisperse
    /// primary-particle assumption.
    #[must_use]
    pub fn soot_number(&self) -> f64 {
        let volume = 4.0 / 3.0 * std::f64::consts::PI * self.soot_radius.powi(3);
        let mass_kg = volume * crate::constants::RHO_SOOT;
        self.soot * 1.0e-3 / mass_kg
    }

    /// NOx emission index as mass of nitrogen [g(N)/kg fuel].
    #[must_use]
    pub fn nox_as_nitrogen(&self) -> f64 {
        14.01 * (self.no / 30.01 + self.no2 / 46.01 + self.hno2 / 47.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_a_combustion_indices() {
        let fuel = Fuel::jet_a();
        // Canonical values: ~3.16 kg CO2 and ~1.29 kg H2O per kg fuel.
        assert!((fuel.ei_co2() - 3160.0).abs() < 30.0, "{}", fuel.ei_co2());
        assert!((fuel.ei_h2o() - 1290.0).abs() < 20.0, "{}", fuel.ei_h2o());
        assert!((fuel.ei_so2() - 1.2).abs() < 0.05, "{}", fuel.ei_so2());
    }

    #[test]
    fn nox_split_preserves_nitrogen() {
        let ei = EmissionIndex::new(&Fuel::jet_a(), &Engine::cruise_default(), 0.02);
        // All the nitrogen of the NO2-equivalent index must reappear.
        let expected_n = 14.01 * 14.0 / 46.01;
        assert!(
            (ei.nox_as_nitrogen() - expected_n).abs() / expected_n < 1e-3,
            "{} vs {expected_n}",
            ei.nox_as_nitrogen()
        );
    }

    #[test]
    fn soot_number_scales_inversely_with_radius_cubed() {
        let mut engine = Engine::cruise_default();
        let fuel = Fuel::jet_a();
        let n1 = EmissionIndex::new(&fuel, &engine, 0.02).soot_number();
        engine.soot_radius *= 2.0;
        let n2 = EmissionIndex::new(&fuel, &engine, 0.02).soot_number();
        assert!((n1 / n2 - 8.0).abs() < 1e-9);
    }

    #[test]
    fn fuel_per_metre_is_flow_over_speed() {
        let ac = Aircraft::b747();
        let expected = 4.0 * 0.7 / 250.0;
        assert!((ac.fuel_per_metre() - expected).abs() < 1e-12);
    }
}
