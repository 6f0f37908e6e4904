//! Heterogeneous reaction rates.
//!
//! First-order uptake onto four aerosol categories: ice or NAT, stratospheric
//! liquid, tropospheric sulfate, and soot. The rate for a species with uptake
//! coefficient gamma on a surface of area density A and particle radius r is
//! the standard diffusion-kinetic expression
//! `k = A / (r / Dg + 4 / (vbar gamma))`, in cgs units (A in cm^2/cm^3, r in
//! cm, Dg in cm^2/s, vbar in cm/s).

use crate::constants;
use crate::core_types::species::ind;

use super::context::ChemContext;

/// Aerosol categories seen by the heterogeneous chemistry.
pub const N_AEROSOL_CATEGORIES: usize = 4;
pub const CAT_ICE_NAT: usize = 0;
pub const CAT_STRAT_LIQUID: usize = 1;
pub const CAT_TROP_SULFATE: usize = 2;
pub const CAT_SOOT: usize = 3;

/// Surface properties per category, gathered from the aerosol state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AerosolSurface {
    /// Surface area density per category [cm^2/cm^3].
    pub area: [f64; N_AEROSOL_CATEGORIES],
    /// Mean particle radius per category [cm].
    pub radius: [f64; N_AEROSOL_CATEGORIES],
}

/// Gas-phase diffusivity estimate [cm^2/s]: ~0.1 cm^2/s for a mid-weight
/// molecule at 1 atm and 298 K, scaled by the Fuller temperature and
/// pressure dependences and a square-root mass factor.
fn gas_diffusivity(molar_mass_g: f64, temperature_k: f64, pressure_pa: f64) -> f64 {
    0.1 * (101_325.0 / pressure_pa)
        * (temperature_k / 298.0).powf(1.75)
        * (50.0 / molar_mass_g).sqrt()
}

/// Mean molecular speed [cm/s].
fn mean_speed(molar_mass_g: f64, temperature_k: f64) -> f64 {
    (8.0 * constants::R_GAS * temperature_k
        / (std::f64::consts::PI * molar_mass_g * 1.0e-3))
        .sqrt()
        * 100.0
}

/// First-order uptake rate [1/s].
fn uptake_rate(
    gamma: f64,
    molar_mass_g: f64,
    surface: &AerosolSurface,
    category: usize,
    temperature_k: f64,
    pressure_pa: f64,
) -> f64 {
    let area = surface.area[category];
    if gamma <= 0.0 || area <= 0.0 {
        return 0.0;
    }
    let radius = surface.radius[category].max(1e-7);
    let dg = gas_diffusivity(molar_mass_g, temperature_k, pressure_pa);
    let vbar = mean_speed(molar_mass_g, temperature_k);
    area / (radius / dg + 4.0 / (vbar * gamma))
}

/// Evaluate heterogeneous rates into the context. Channel 0 collects the
/// always-on uptake over liquid and soot surfaces; channels 1 and 2 are the
/// polar-stratospheric-cloud pathways and stay zero unless `state_psc` is
/// set. Rates are cleared first.
#[allow(clippy::too_many_arguments)]
pub fn update_het_rates(
    ctx: &mut ChemContext,
    temperature_k: f64,
    pressure_pa: f64,
    _airdens: f64,
    rel_humidity: f64,
    state_psc: bool,
    surface: &AerosolSurface,
    iwc: f64,
) {
    ctx.clear_het();

    // Water on sulfate makes N2O5 hydrolysis more efficient when moist.
    let rh_factor = (rel_humidity / 100.0).clamp(0.0, 1.0);
    let gamma_n2o5 = 0.01 + 0.03 * rh_factor;

    let sulfate_cats = [CAT_STRAT_LIQUID, CAT_TROP_SULFATE];

    // N2O5 -> 2 HNO3 on liquid sulfate (channel 0) and on ice (channel 1).
    for cat in sulfate_cats {
        ctx.het[ind::N2O5][0] +=
            uptake_rate(gamma_n2o5, 108.0, surface, cat, temperature_k, pressure_pa);
    }
    ctx.het[ind::N2O5][1] =
        uptake_rate(0.02, 108.0, surface, CAT_ICE_NAT, temperature_k, pressure_pa);

    // HO2, NO2, NO3 uptake on every surface, dominated by sulfate and soot.
    for cat in 0..N_AEROSOL_CATEGORIES {
        ctx.het[ind::HO2][0] +=
            uptake_rate(0.2, 33.0, surface, cat, temperature_k, pressure_pa);
        ctx.het[ind::NO2][0] +=
            uptake_rate(1.0e-4, 46.0, surface, cat, temperature_k, pressure_pa);
        ctx.het[ind::NO3][0] +=
            uptake_rate(1.0e-3, 62.0, surface, cat, temperature_k, pressure_pa);
    }

    // Halogen nitrate hydrolysis on liquid surfaces.
    for cat in sulfate_cats {
        ctx.het[ind::CLNO3][0] += uptake_rate(
            ctx.kheti_sla[0].max(1.0e-4),
            97.0,
            surface,
            cat,
            temperature_k,
            pressure_pa,
        );
        ctx.het[ind::BRNO3][0] +=
            uptake_rate(0.8, 142.0, surface, cat, temperature_k, pressure_pa);
    }

    if state_psc {
        // Chlorine/bromine activation on PSC ice; rates scale with the ice
        // surface and, through IWC, with how much condensate is present.
        let iwc_factor = (iwc / 1.0e-6).clamp(0.0, 1.0);
        ctx.het[ind::CLNO3][1] = iwc_factor
            * uptake_rate(0.3, 97.0, surface, CAT_ICE_NAT, temperature_k, pressure_pa);
        ctx.het[ind::HOCL][1] = iwc_factor
            * uptake_rate(0.2, 52.0, surface, CAT_ICE_NAT, temperature_k, pressure_pa);
        ctx.het[ind::HOBR][1] = iwc_factor
            * uptake_rate(0.3, 97.0, surface, CAT_ICE_NAT, temperature_k, pressure_pa);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::mechanism::Mechanism;

    fn surface() -> AerosolSurface {
        AerosolSurface {
            area: [1.0e-7, 5.0e-8, 1.0e-7, 1.0e-8],
            radius: [5.0e-4, 1.0e-5, 1.0e-5, 2.0e-6],
        }
    }

    #[test]
    fn no_surface_no_rates() {
        let mech = Mechanism::new();
        let mut ctx = ChemContext::new(&mech);
        let empty = AerosolSurface::default();
        update_het_rates(&mut ctx, 220.0, 24000.0, 7.9e18, 60.0, false, &empty, 0.0);
        assert!(ctx.het.iter().flatten().all(|&k| k == 0.0));
    }

    #[test]
    fn psc_channels_gated_by_flag() {
        let mech = Mechanism::new();
        let mut ctx = ChemContext::new(&mech);
        let s = surface();
        update_het_rates(&mut ctx, 195.0, 24000.0, 7.9e18, 60.0, false, &s, 1.0e-5);
        assert_eq!(ctx.het[ind::CLNO3][1], 0.0);
        update_het_rates(&mut ctx, 195.0, 24000.0, 7.9e18, 60.0, true, &s, 1.0e-5);
        assert!(ctx.het[ind::CLNO3][1] > 0.0);
    }

    #[test]
    fn n2o5_uptake_scales_with_area() {
        let mech = Mechanism::new();
        let mut ctx = ChemContext::new(&mech);
        let mut s = surface();
        update_het_rates(&mut ctx, 220.0, 24000.0, 7.9e18, 60.0, false, &s, 0.0);
        let base = ctx.het[ind::N2O5][0];
        for a in &mut s.area {
            *a *= 10.0;
        }
        update_het_rates(&mut ctx, 220.0, 24000.0, 7.9e18, 60.0, false, &s, 0.0);
        assert!((ctx.het[ind::N2O5][0] / base - 10.0).abs() < 1e-6);
    }

    #[test]
    fn humidity_raises_n2o5_hydrolysis() {
        let mech = Mechanism::new();
        let mut ctx = ChemContext::new(&mech);
        let s = surface();
        update_het_rates(&mut ctx, 220.0, 24000.0, 7.9e18, 20.0, false, &s, 0.0);
        let dry = ctx.het[ind::N2O5][0];
        update_het_rates(&mut ctx, 220.0, 24000.0, 7.9e18, 90.0, false, &s, 0.0);
        assert!(ctx.het[ind::N2O5][0] > dry);
    }
}
