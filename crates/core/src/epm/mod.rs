//! Early plume microphysics.
//!
//! A single Lagrangian parcel is advanced from engine exit through wake
//! vortex roll-up and break-up. The jet phase follows the Schumann bulk
//! dilution law; during the vortex phase the plume is trapped by the
//! downwash and dilution stalls while water keeps partitioning between
//! vapour, binary H2SO4/H2O droplets on soot cores, and ice nucleated on
//! the activated cores. The output is the initial condition the gridded
//! simulation starts from.

use std::sync::Arc;

use tracing::{debug, info};

use crate::aerosol::{AerosolDistribution, BinGrid};
use crate::constants;
use crate::core_types::units::{Kelvin, Pascals};
use crate::emission::{Aircraft, EmissionIndex};
use crate::physics::thermo;

/// End of the jet regime: the wake vortex has rolled up and the plume is
/// trapped in the descending vortex pair [s].
const VORTEX_ROLLUP_S: f64 = 4.0;

/// Wake vortex break-up, the end of the parcel integration [s].
const VORTEX_BREAKUP_S: f64 = 180.0;

/// Combustion heat release per kilogram of fuel, spread over the dilution
/// air, expressed as a temperature excess [K kg_air/kg_fuel].
const COMBUSTION_DT: f64 = 3.0e4;

/// Schumann (1998) bulk dilution: kilograms of air entrained per kilogram
/// of fuel after `t` seconds of plume age.
fn dilution(t_s: f64) -> f64 {
    7000.0 * t_s.powf(0.8).max(1.0e-2)
}

/// Volatile (sulfate) particle number emission index [particles/kg fuel].
const VOLATILE_NUMBER_EI: f64 = 1.0e15;

/// Homogeneous freezing threshold for the solution droplets [K].
const FREEZING_T: f64 = 235.0;

/// Parcel state at the end of the early-plume integration, in plume-mean
/// concentrations over the output cross-section.
#[derive(Debug, Clone)]
pub struct EpmOutput {
    /// Ice crystal number density [#/cm^3].
    pub ice_density: f64,
    /// Ice crystal volume-mean radius [m].
    pub ice_radius: f64,
    /// Soot (interstitial plus ice-core) number density [#/cm^3].
    pub soot_density: f64,
    /// Gas-phase water [molecules/cm^3].
    pub h2o_gas: f64,
    /// Gas-phase sulfate [molecules/cm^3].
    pub so4_gas: f64,
    /// Liquid (condensed) sulfate [molecules/cm^3].
    pub so4_liquid: f64,
    /// Liquid sulfate aerosol on the LA bin grid.
    pub liquid_aerosol: AerosolDistribution,
    /// Ice crystals on the PA bin grid.
    pub ice_aerosol: AerosolDistribution,
    /// Plume cross-sectional area per engine pair member [m^2].
    pub area: f64,
}

/// Advance the parcel from engine exit to vortex break-up.
///
/// The returned area is for ONE engine's plume; the driver doubles it for
/// the two unmerged half-wing plumes and rescales densities by `n_eng / 2`
/// when the engine count differs from two.
#[must_use]
pub fn integrate(
    ambient_t: Kelvin,
    ambient_p: Pascals,
    rel_humidity_w: f64,
    aircraft: &Aircraft,
    ei: &EmissionIndex,
    la_bins: &Arc<BinGrid>,
    pa_bins: &Arc<BinGrid>,
) -> EpmOutput {
    let t_amb = ambient_t.value();
    let p_amb = ambient_p.value();
    let rho_air = p_amb * constants::MW_AIR / (constants::R_GAS * t_amb);
    let airdens = thermo::air_number_density(t_amb, p_amb);

    // Ambient water partial pressure [Pa].
    let p_h2o_amb = rel_humidity_w / 100.0 * thermo::psat_h2o_liquid(t_amb);

    // Fuel burned per metre of flight path, per engine [kg/m].
    let fuel_per_m = aircraft.engine.fuel_flow / aircraft.flight_speed;

    let soot_per_kg_fuel = ei.soot_number();

    // Parcel bookkeeping.
    let mut activated_frac: f64 = 0.0;
    let mut frozen_frac: f64 = 0.0;
    // Condensed water as a molar mixing ratio against fuel: mol H2O per
    // kg fuel locked in ice.
    let mut ice_water_mol_per_kg = 0.0_f64;
    let mut s_w_max: f64 = 0.0;

    // Logarithmic time march through the jet phase, then the vortex hold.
    let n_steps = 120;
    let t_start: f64 = 0.1;
    let ratio = (VORTEX_BREAKUP_S / t_start).powf(1.0 / n_steps as f64);
    let mut t = t_start;
    for _ in 0..=n_steps {
        // Dilution stalls once the vortex traps the plume.
        let n_dilution = dilution(t.min(VORTEX_ROLLUP_S));
        let temp = t_amb + COMBUSTION_DT / n_dilution;

        // Gas-phase water: ambient plus emitted minus what froze out.
        // EI/MW gives mol per kg fuel; over N kg of air that is a molar
        // mixing ratio of mol/kg / N * MW_air.
        let x_emit =
            (ei.h2o / 18.02 - ice_water_mol_per_kg) * constants::MW_AIR / n_dilution;
        let p_h2o = p_h2o_amb + x_emit * p_amb;
        let s_w = p_h2o / thermo::psat_h2o_liquid(temp);
        let s_i = p_h2o / thermo::psat_h2o_ice(temp);
        s_w_max = s_w_max.max(s_w);

        // Droplet activation of the soot cores: supersaturation with
        // respect to liquid water wets them; once wetted they stay wet.
        if s_w > 1.0 {
            let f = 1.0 - (-(s_w - 1.0) / 0.1).exp();
            activated_frac = activated_frac.max(f);
        }

        // Homogeneous freezing of the activated solution droplets.
        if temp < FREEZING_T && s_i > 1.0 {
            frozen_frac = frozen_frac.max(activated_frac);
            // Deposit the vapour excess over ice saturation.
            let p_excess = p_h2o - thermo::psat_h2o_ice(temp);
            if p_excess > 0.0 {
                let x_excess = p_excess / p_amb;
                ice_water_mol_per_kg += x_excess * n_dilution / constants::MW_AIR;
            }
        }

        t *= ratio;
    }

    // Output cross-section per engine from the roll-up dilution.
    let n_final = dilution(VORTEX_ROLLUP_S);
    let area = n_final * fuel_per_m / rho_air;

    // Per-cm^3 conversion for a per-kg-fuel quantity over that area.
    let per_cm3 = |per_kg_fuel: f64| per_kg_fuel * fuel_per_m / (area * 1.0e6);

    let soot_density = per_cm3(soot_per_kg_fuel);
    let ice_density = soot_density * frozen_frac;

    // Ice mass from the deposited water.
    let ice_radius = if ice_density > 0.0 {
        let mol_per_cm3 = per_cm3(ice_water_mol_per_kg);
        let kg_per_crystal = mol_per_cm3 * constants::MW_H2O / ice_density;
        let v = kg_per_crystal / constants::RHO_ICE;
        (3.0 * v / (4.0 * std::f64::consts::PI)).cbrt()
    } else {
        0.0
    };

    // Sulfur: engine + early-plume conversion to SO4, then equilibrium
    // partitioning between gas and the volatile liquid particles.
    // g/kg over the molar mass gives mol/kg fuel, then molecules.
    let so4_molecules = per_cm3(ei.so2 * ei.so2_to_so4 / 64.06 * constants::NA);
    let gas_frac = thermo::h2so4_gas_fraction(t_amb, so4_molecules);
    let so4_gas = gas_frac * so4_molecules;
    let so4_liquid = so4_molecules - so4_gas;

    // Volatile liquid particles: number from the particle emission index,
    // median radius from the condensed sulfate volume.
    let n_volatile = per_cm3(VOLATILE_NUMBER_EI);
    let liquid_aerosol = if n_volatile > 0.0 && so4_liquid > 0.0 {
        // Condensed sulfate volume per cm^3 of air [m^3/cm^3].
        let vol = so4_liquid * 98.08 / constants::NA * 1.0e-3 / constants::RHO_SULFATE;
        let r_mean_m = (3.0 * vol / (4.0 * std::f64::consts::PI * n_volatile)).cbrt();
        let r_median = r_mean_m.clamp(la_bins.centres()[0], 5.0e-8);
        AerosolDistribution::lognormal(Arc::clone(la_bins), n_volatile, r_median, 1.6)
    } else {
        AerosolDistribution::empty(Arc::clone(la_bins))
    };

    let ice_aerosol = if ice_density > 0.0 {
        let r_median = ice_radius.clamp(pa_bins.centres()[0], *pa_bins.centres().last().unwrap());
        AerosolDistribution::lognormal(Arc::clone(pa_bins), ice_density, r_median, 1.5)
    } else {
        AerosolDistribution::empty(Arc::clone(pa_bins))
    };

    // Remaining vapour at break-up: ambient plus whatever emission did not
    // freeze out, plume-mean.
    let x_emit_final =
        (ei.h2o / 18.02 - ice_water_mol_per_kg) * constants::MW_AIR / n_final;
    let h2o_gas = (p_h2o_amb / p_amb + x_emit_final).max(0.0) * airdens;

    debug!(
        s_w_max,
        activated_frac, frozen_frac, "early plume parcel integrated"
    );
    info!(
        ice_density,
        ice_radius_um = ice_radius * 1.0e6,
        soot_density,
        area_m2 = area,
        "EPM output"
    );

    EpmOutput {
        ice_density,
        ice_radius,
        soot_density,
        h2o_gas,
        so4_gas,
        so4_liquid,
        liquid_aerosol,
        ice_aerosol,
        area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::{EmissionIndex, Fuel};

    fn bins() -> (Arc<BinGrid>, Arc<BinGrid>) {
        (
            Arc::new(BinGrid::geometric(1.0e-9, 1.0e-6, 32)),
            Arc::new(BinGrid::geometric(5.0e-8, 5.0e-4, 32)),
        )
    }

    fn run(t_k: f64, rh_w: f64) -> EpmOutput {
        let aircraft = Aircraft::b747();
        let ei = EmissionIndex::new(&Fuel::jet_a(), &aircraft.engine, 0.02);
        let (la, pa) = bins();
        integrate(
            Kelvin::new(t_k),
            Pascals::new(24000.0),
            rh_w,
            &aircraft,
            &ei,
            &la,
            &pa,
        )
    }

    #[test]
    fn cold_supersaturated_case_forms_a_contrail() {
        let out = run(210.0, 120.0);
        assert!(out.ice_density > 1.0e4, "ice density {}", out.ice_density);
        assert!(out.ice_radius > 1.0e-7, "ice radius {}", out.ice_radius);
        // Cross-section far exceeds the engine exit disk (~3 m^2).
        assert!(out.area > 2.0 * 3.0, "area {}", out.area);
    }

    #[test]
    fn warm_dry_case_stays_ice_free() {
        let out = run(240.0, 20.0);
        assert_eq!(out.ice_density, 0.0);
        assert_eq!(out.ice_aerosol.number(), 0.0);
    }

    #[test]
    fn ice_number_non_decreasing_in_humidity() {
        let mut last = 0.0;
        for rh in [40.0, 60.0, 80.0, 100.0, 120.0] {
            let out = run(215.0, rh);
            assert!(
                out.ice_density >= last,
                "ice density fell from {last} at RH {rh}"
            );
            last = out.ice_density;
        }
    }

    #[test]
    fn sulfate_partitioning_is_consistent() {
        let out = run(215.0, 80.0);
        let total = out.so4_gas + out.so4_liquid;
        assert!(total > 0.0);
        assert!(out.so4_gas >= 0.0 && out.so4_liquid >= 0.0);
        // Liquid particles exist whenever condensed sulfate does.
        if out.so4_liquid > 0.0 {
            assert!(out.liquid_aerosol.number() > 0.0);
        }
    }
}
