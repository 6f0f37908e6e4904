//! Gravitational settling of aerosol particles.

use crate::constants;
use crate::physics::thermo;

/// Stokes terminal fall speed with Cunningham slip correction [m/s],
/// positive downward, for a sphere of radius `radius_m` and material
/// density `rho_p` at ambient (T, P). Buoyancy of air is negligible at
/// upper-troposphere densities but kept for form.
#[must_use]
pub fn terminal_velocity(radius_m: f64, rho_p: f64, temperature_k: f64, pressure_pa: f64) -> f64 {
    let mu = thermo::air_viscosity(temperature_k);
    let rho_air = pressure_pa * constants::MW_AIR / (constants::R_GAS * temperature_k);
    let slip = thermo::slip_correction(radius_m, temperature_k, pressure_pa);
    2.0 * radius_m * radius_m * constants::G0 * (rho_p - rho_air) * slip / (9.0 * mu)
}

/// Per-bin fall speeds for a set of bin-centre radii [m/s downward].
#[must_use]
pub fn settling_velocities(
    bin_centres_m: &[f64],
    rho_p: f64,
    temperature_k: f64,
    pressure_pa: f64,
) -> Vec<f64> {
    bin_centres_m
        .iter()
        .map(|&r| terminal_velocity(r, rho_p, temperature_k, pressure_pa))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn larger_particles_fall_faster() {
        let v_small = terminal_velocity(1e-6, constants::RHO_ICE, 220.0, 24000.0);
        let v_large = terminal_velocity(1e-5, constants::RHO_ICE, 220.0, 24000.0);
        assert!(v_large > v_small);
        assert!(v_small > 0.0);
    }

    #[test]
    fn micron_ice_falls_slowly() {
        // A 1 um ice sphere at cruise conditions falls well under 1 mm/s.
        let v = terminal_velocity(1e-6, constants::RHO_ICE, 220.0, 24000.0);
        assert!(v < 1e-3, "v = {v} m/s");
    }
}
