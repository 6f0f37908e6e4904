//! Physical constants used across the engine.
//!
//! Values follow CODATA 2018 where applicable. All quantities are SI; the
//! concentrations elsewhere in the crate are in molecules per cm^3, the
//! native unit of the chemistry.

/// Boltzmann constant [J/K]
pub const K_B: f64 = 1.380_649e-23;

/// Avogadro constant [1/mol]
pub const NA: f64 = 6.022_140_76e23;

/// Universal gas constant [J/(mol K)]
pub const R_GAS: f64 = 8.314_462_618;

/// Standard gravity [m/s^2]
pub const G0: f64 = 9.806_65;

/// Molar mass of dry air [kg/mol]
pub const MW_AIR: f64 = 28.9644e-3;

/// Molar mass of water [kg/mol]
pub const MW_H2O: f64 = 18.015_28e-3;

/// Density of ice [kg/m^3]
pub const RHO_ICE: f64 = 916.7;

/// Density of aqueous sulfate aerosol [kg/m^3]
pub const RHO_SULFATE: f64 = 1600.0;

/// Density of soot [kg/m^3]
pub const RHO_SOOT: f64 = 1800.0;

/// Seconds per hour
pub const HOUR: f64 = 3600.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideal_gas_relations_are_consistent() {
        // R = k_B * N_A to full precision.
        assert!(((K_B * NA - R_GAS) / R_GAS).abs() < 1e-12);
    }

    #[test]
    fn air_density_at_cruise_is_plausible() {
        // ~0.38 kg/m^3 at 24 kPa and 220 K.
        let rho = 24_000.0 * MW_AIR / (R_GAS * 220.0);
        assert!((rho - 0.38).abs() < 0.01, "rho = {rho}");
    }
}
