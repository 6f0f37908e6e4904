//! Thermodynamic relations for moist air and sulfate aerosol.
//!
//! Saturation pressures follow Murphy & Koop (2005); the sulfuric-acid gas
//! fraction uses the Kulmala & Laaksonen (1990) vapour-pressure fit. All
//! temperatures in Kelvin, pressures in Pascal.

use crate::constants;

/// Saturation vapour pressure of water over liquid [Pa].
///
/// Murphy & Koop (2005), eq. 10; valid 123 K < T < 332 K.
pub fn psat_h2o_liquid(temperature_k: f64) -> f64 {
    let t = temperature_k;
    (54.842_763 - 6763.22 / t - 4.210 * t.ln()
        + 0.000_367 * t
        + (0.041_5 * (t - 218.8)).tanh()
            * (53.878 - 1331.22 / t - 9.445_23 * t.ln() + 0.014_025 * t))
        .exp()
}

/// Saturation vapour pressure of water over ice [Pa].
///
/// Murphy & Koop (2005), eq. 7.
pub fn psat_h2o_ice(temperature_k: f64) -> f64 {
    let t = temperature_k;
    (9.550_426 - 5723.265 / t + 3.530_68 * t.ln() - 0.007_283_32 * t).exp()
}

/// Equilibrium gas-phase mass fraction of total sulfate, f(T, [SO4]_total).
///
/// The fraction is the ratio of the H2SO4 saturation number density to the
/// total available sulfate; above saturation the excess condenses. Clamped
/// to [0, 1]. `so4_total` in molecules/cm^3.
pub fn h2so4_gas_fraction(temperature_k: f64, so4_total: f64) -> f64 {
    if so4_total <= 0.0 {
        return 1.0;
    }
    // Ayers et al. (1980) pure H2SO4 vapour pressure fit, p in atm.
    let t = temperature_k;
    let psat = 101_325.0 * (16.259 - 10_156.0 / t).exp();
    let nsat = psat / (constants::K_B * t) * 1.0e-6; // molecules/cm^3
    (nsat / so4_total).min(1.0)
}

/// Dynamic viscosity of air [Pa s], Sutherland's law.
pub fn air_viscosity(temperature_k: f64) -> f64 {
    let t = temperature_k;
    1.458e-6 * t.powf(1.5) / (t + 110.4)
}

/// Mean free path of air molecules [m].
pub fn mean_free_path(temperature_k: f64, pressure_pa: f64) -> f64 {
    let mu = air_viscosity(temperature_k);
    let rho = pressure_pa * constants::MW_AIR / (constants::R_GAS * temperature_k);
    2.0 * mu
        / (rho
            * (8.0 * constants::R_GAS * temperature_k
                / (std::f64::consts::PI * constants::MW_AIR))
                .sqrt())
}

/// Cunningham slip-correction factor for a particle of radius `r` [m].
pub fn slip_correction(radius_m: f64, temperature_k: f64, pressure_pa: f64) -> f64 {
    let kn = mean_free_path(temperature_k, pressure_pa) / radius_m;
    1.0 + kn * (1.257 + 0.4 * (-1.1 / kn).exp())
}

/// Air number density [molecules/cm^3] from the ideal gas law.
pub fn air_number_density(temperature_k: f64, pressure_pa: f64) -> f64 {
    pressure_pa / (constants::K_B * temperature_k) * 1.0e-6
}

/// Brownian diffusivity of a particle [m^2/s].
pub fn particle_diffusivity(radius_m: f64, temperature_k: f64, pressure_pa: f64) -> f64 {
    constants::K_B * temperature_k * slip_correction(radius_m, temperature_k, pressure_pa)
        / (6.0 * std::f64::consts::PI * air_viscosity(temperature_k) * radius_m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_pressures_cross_at_triple_point() {
        // Liquid and ice saturation agree near 273.16 K.
        let pl = psat_h2o_liquid(273.16);
        let pi = psat_h2o_ice(273.16);
        assert!(
            ((pl - pi) / pl).abs() < 0.01,
            "triple point mismatch: liquid {pl} Pa vs ice {pi} Pa"
        );
        // ~611 Pa at the triple point.
        assert!((pl - 611.7).abs() < 5.0, "got {pl} Pa");
    }

    #[test]
    fn ice_saturation_below_liquid_when_supercooled() {
        let t = 220.0;
        assert!(psat_h2o_ice(t) < psat_h2o_liquid(t));
    }

    #[test]
    fn gas_fraction_bounds() {
        for &t in &[200.0, 220.0, 240.0] {
            for &c in &[1.0, 1e6, 1e12] {
                let f = h2so4_gas_fraction(t, c);
                assert!((0.0..=1.0).contains(&f), "f = {f} at T = {t}, c = {c}");
            }
        }
        // Dilute limit is all-gas.
        assert_eq!(h2so4_gas_fraction(220.0, 0.0), 1.0);
    }

    #[test]
    fn gas_fraction_decreases_with_loading() {
        let t = 220.0;
        let lo = h2so4_gas_fraction(t, 1e4);
        let hi = h2so4_gas_fraction(t, 1e10);
        assert!(hi <= lo);
    }

    #[test]
    fn slip_correction_grows_for_small_particles() {
        let t = 220.0;
        let p = 24000.0;
        let small = slip_correction(1e-8, t, p);
        let large = slip_correction(1e-5, t, p);
        assert!(small > large);
        assert!(large > 1.0);
    }
}
