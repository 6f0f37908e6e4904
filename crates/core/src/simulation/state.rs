//! The mutable solution state of one case.
//!
//! Owns every gridded field: variable-species concentrations, the SO4
//! total/gas/liquid triple, water vapour, the monodisperse soot fields and
//! both sectional aerosol populations. Fields are mutated only by the
//! subsystem the driver is currently running.

use std::sync::Arc;

use crate::aerosol::{
    AerosolDistribution, AerosolPopulation, BinGrid, CoagulationKernel, MicrophysicsLevel,
};
use crate::ambient::AmbientSample;
use crate::chem::het::{
    AerosolSurface, CAT_ICE_NAT, CAT_SOOT, CAT_STRAT_LIQUID, CAT_TROP_SULFATE,
};
use crate::constants;
use crate::core_types::species::{ind, ind::NVAR};
use crate::epm::EpmOutput;
use crate::grid::{Mesh, ScalarField};
use crate::physics::thermo;

/// Liquid-aerosol bin range [m].
const LA_BIN_RANGE: (f64, f64, usize) = (1.0e-9, 1.0e-6, 40);
/// Solid-aerosol bin range [m].
const PA_BIN_RANGE: (f64, f64, usize) = (5.0e-8, 5.0e-4, 40);

/// Gridded solution state.
pub struct SolutionState {
    /// One field per variable species [molecules/cm^3].
    pub species: Vec<ScalarField>,
    /// Total sulfate; the invariant `SO4T = SO4 + SO4L` is restored by
    /// every partitioning pass.
    pub so4t: ScalarField,
    /// Water vapour [molecules/cm^3].
    pub h2o: ScalarField,
    /// Monodisperse soot: number density [#/cm^3], mean radius [m], and
    /// surface area density [cm^2/cm^3].
    pub soot_dens: ScalarField,
    pub soot_radi: ScalarField,
    pub soot_area: ScalarField,
    /// Liquid sulfate population.
    pub liquid: AerosolPopulation,
    /// Solid (ice) population.
    pub solid: AerosolPopulation,
    pub la_level: MicrophysicsLevel,
    pub pa_level: MicrophysicsLevel,
    /// Background bulk liquid aerosol from the ambient file.
    pub la_background_ndens: f64,
    pub pa_background_ndens: f64,
    /// Polar-stratospheric-cloud state flag for the heterogeneous rates.
    pub state_psc: bool,
}

impl SolutionState {
    /// Allocate all fields at the ambient background.
    #[must_use]
    pub fn initialize(
        mesh: &Mesh,
        ambient: &AmbientSample,
        temperature_k: f64,
        pressure_pa: f64,
        airdens: f64,
        h2o_ambient: f64,
    ) -> Self {
        let concentrations = ambient.concentrations(airdens);
        let species: Vec<ScalarField> = concentrations
            .iter()
            .map(|&c| mesh.field_with(c))
            .collect();
        let so4t = mesh.field_with(
            concentrations[ind::SO4] + concentrations[ind::SO4L],
        );
        let h2o = mesh.field_with(h2o_ambient);

        let la_bins = Arc::new(BinGrid::geometric(
            LA_BIN_RANGE.0,
            LA_BIN_RANGE.1,
            LA_BIN_RANGE.2,
        ));
        let pa_bins = Arc::new(BinGrid::geometric(
            PA_BIN_RANGE.0,
            PA_BIN_RANGE.1,
            PA_BIN_RANGE.2,
        ));
        let la_kernel = CoagulationKernel::build(
            &la_bins,
            constants::RHO_SULFATE,
            temperature_k,
            pressure_pa,
        );
        let pa_kernel =
            CoagulationKernel::build(&pa_bins, constants::RHO_ICE, temperature_k, pressure_pa);
        let mut liquid =
            AerosolPopulation::new("LA", Arc::clone(&la_bins), constants::RHO_SULFATE, la_kernel, mesh);
        let solid =
            AerosolPopulation::new("PA", pa_bins, constants::RHO_ICE, pa_kernel, mesh);

        // Seed the liquid population with the background bulk aerosol.
        if ambient.liquid.n_dens > 0.0 && ambient.liquid.r_eff > 0.0 {
            let background = AerosolDistribution::lognormal(
                la_bins,
                ambient.liquid.n_dens,
                ambient.liquid.r_eff,
                1.6,
            );
            for (field, &n) in liquid.pdf_mut().iter_mut().zip(background.pdf()) {
                field.fill(n);
            }
        }

        // PSC state: cold enough for type-I clouds.
        let state_psc = temperature_k < 195.0;

        Self {
            species,
            so4t,
            h2o,
            soot_dens: mesh.field(),
            soot_radi: mesh.field(),
            soot_area: mesh.field(),
            liquid,
            solid,
            la_level: MicrophysicsLevel::Off,
            pa_level: MicrophysicsLevel::Off,
            la_background_ndens: ambient.liquid.n_dens,
            pa_background_ndens: ambient.solid.n_dens,
            state_psc,
        }
    }

    /// Inject the early-plume output and gaseous emissions over a cell
    /// patch. `epm_area` is the early-plume cross-section [m^2],
    /// `patch_area` the summed area of the target cells; concentrations
    /// dilute by their ratio as the plume is spread over the patch.
    pub fn add_emission(
        &mut self,
        epm: &EpmOutput,
        gas_columns: &[(usize, f64)],
        cells: &[(usize, usize)],
        epm_area: f64,
        patch_area: f64,
    ) {
        let dilution = epm_area / patch_area;
        for &(i, j) in cells {
            self.soot_dens
                .add(i, j, (epm.soot_density - epm.ice_density).max(0.0) * dilution);
            self.soot_radi.set(i, j, 2.0e-8);
            self.h2o.add(i, j, (epm.h2o_gas * dilution).max(0.0));
            self.species[ind::SO4].add(i, j, epm.so4_gas * dilution);
            self.species[ind::SO4L].add(i, j, epm.so4_liquid * dilution);
            for &(s, c) in gas_columns {
                self.species[s].add(i, j, c * dilution);
            }
        }
        // Soot area field follows the monodisperse assumption.
        self.refresh_soot_area();
        self.liquid.deposit(&epm.liquid_aerosol, cells, dilution);
        self.solid.deposit(&epm.ice_aerosol, cells, dilution);
        self.sync_so4_total();

        // Emitted particles demand the full microphysics; a
        // background-only population gets the uniform treatment.
        self.la_level = if epm.liquid_aerosol.number() > 0.0 {
            MicrophysicsLevel::Full
        } else if self.la_background_ndens > 0.0 {
            MicrophysicsLevel::UniformBackground
        } else {
            MicrophysicsLevel::Off
        };
        self.pa_level = if epm.ice_density > 0.0 {
            MicrophysicsLevel::Full
        } else if self.pa_background_ndens > 0.0 {
            MicrophysicsLevel::UniformBackground
        } else {
            MicrophysicsLevel::Off
        };
    }

    /// Partition total sulfate into gas and liquid per cell from the
    /// row temperature: liquid takes `(1 - f)` of the total, gas the exact
    /// remainder, so `SO4 + SO4L = SO4T` holds to the last bit.
    pub fn partition_so4(&mut self, met: &crate::met::Meteorology, mesh: &Mesh) {
        for j in 0..mesh.ny() {
            let t_row = met.temperature(j);
            for i in 0..mesh.nx() {
                let total = self.so4t.get(i, j);
                let f_gas = thermo::h2so4_gas_fraction(t_row, total);
                let liquid = (1.0 - f_gas) * total;
                self.species[ind::SO4L].set(i, j, liquid);
                self.species[ind::SO4].set(i, j, total - liquid);
            }
        }
    }

    /// Restore `SO4T = SO4 + SO4L` after chemistry or injection.
    pub fn sync_so4_total(&mut self) {
        let gas = self.species[ind::SO4].as_slice().to_vec();
        for ((t, &g), &l) in self
            .so4t
            .as_mut_slice()
            .iter_mut()
            .zip(&gas)
            .zip(self.species[ind::SO4L].as_slice())
        {
            *t = g + l;
        }
    }

    /// Recompute the soot surface-area field from number and radius.
    pub fn refresh_soot_area(&mut self) {
        for idx in 0..self.soot_area.as_slice().len() {
            let n = self.soot_dens.as_slice()[idx];
            let r_cm = self.soot_radi.as_slice()[idx] * 100.0;
            self.soot_area.as_mut_slice()[idx] = 4.0 * std::f64::consts::PI * r_cm * r_cm * n;
        }
    }

    /// Gather one cell's variable species into a chemistry input vector.
    #[must_use]
    pub fn gather_cell(&self, i: usize, j: usize) -> Vec<f64> {
        self.species.iter().map(|f| f.get(i, j)).collect()
    }

    /// Scatter a chemistry output vector back into one cell.
    pub fn scatter_cell(&mut self, var: &[f64], i: usize, j: usize) {
        for (field, &c) in self.species.iter_mut().zip(var) {
            field.set(i, j, c);
        }
    }

    /// Aerosol surface properties seen by the heterogeneous chemistry for
    /// a set of cells (one ring, or one cell), in cgs units, plus the ice
    /// water content [kg/cm^3].
    #[must_use]
    pub fn aerosol_surfaces(&self, cells: &[(usize, usize)], mesh: &Mesh) -> (AerosolSurface, f64) {
        let mut surface = AerosolSurface::default();
        if cells.is_empty() {
            return (surface, 0.0);
        }

        let la = self.liquid.mean_over_cells(cells, mesh);
        let pa = self.solid.mean_over_cells(cells, mesh);

        // Liquid sulfate doubles as the stratospheric and tropospheric
        // category depending on the PSC state; here it is split evenly.
        let la_area_cgs = la.surface_area_density() * 1.0e4; // m^2 -> cm^2
        surface.area[CAT_STRAT_LIQUID] = 0.5 * la_area_cgs;
        surface.area[CAT_TROP_SULFATE] = 0.5 * la_area_cgs;
        let la_r_cm = la.effective_radius() * 100.0;
        surface.radius[CAT_STRAT_LIQUID] = la_r_cm;
        surface.radius[CAT_TROP_SULFATE] = la_r_cm;

        surface.area[CAT_ICE_NAT] = pa.surface_area_density() * 1.0e4;
        surface.radius[CAT_ICE_NAT] = pa.effective_radius() * 100.0;

        // Soot, averaged over the cells.
        let total_area: f64 = cells.iter().map(|&(i, j)| mesh.areas().get(i, j)).sum();
        let mut soot_area = 0.0;
        let mut soot_r = 0.0;
        for &(i, j) in cells {
            let w = mesh.areas().get(i, j) / total_area;
            soot_area += w * self.soot_area.get(i, j);
            soot_r += w * self.soot_radi.get(i, j);
        }
        surface.area[CAT_SOOT] = soot_area;
        surface.radius[CAT_SOOT] = soot_r * 100.0;

        // IWC from the third moment of the solid population [kg/cm^3].
        let iwc = pa.moment(3) * 4.0 / 3.0 * std::f64::consts::PI * constants::RHO_ICE;
        (surface, iwc)
    }

    /// Mean relative humidity proxy for the het update: water vapour over
    /// liquid saturation at the given temperature.
    #[must_use]
    pub fn rel_humidity_at(&self, cells: &[(usize, usize)], mesh: &Mesh, temperature_k: f64) -> f64 {
        let total_area: f64 = cells.iter().map(|&(i, j)| mesh.areas().get(i, j)).sum();
        if total_area == 0.0 {
            return 0.0;
        }
        let mean_h2o: f64 = cells
            .iter()
            .map(|&(i, j)| self.h2o.get(i, j) * mesh.areas().get(i, j))
            .sum::<f64>()
            / total_area;
        let nsat = thermo::psat_h2o_liquid(temperature_k)
            / (constants::K_B * temperature_k)
            * 1.0e-6;
        100.0 * mean_h2o / nsat
    }

    /// Area-weighted mean concentrations over a set of cells.
    #[must_use]
    pub fn mean_over_cells(&self, cells: &[(usize, usize)], mesh: &Mesh) -> Vec<f64> {
        let total_area: f64 = cells.iter().map(|&(i, j)| mesh.areas().get(i, j)).sum();
        let mut out = vec![0.0; NVAR];
        if total_area == 0.0 {
            return out;
        }
        for (s, field) in self.species.iter().enumerate() {
            out[s] = cells
                .iter()
                .map(|&(i, j)| field.get(i, j) * mesh.areas().get(i, j))
                .sum::<f64>()
                / total_area;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::AmbientProfile;

    fn state() -> (Mesh, SolutionState) {
        let mesh = Mesh::new(8, 8, 800.0, 800.0);
        let ambient = AmbientProfile::builtin().sample(24000.0);
        let airdens = thermo::air_number_density(220.0, 24000.0);
        let state =
            SolutionState::initialize(&mesh, &ambient, 220.0, 24000.0, airdens, 1.0e14);
        (mesh, state)
    }

    #[test]
    fn initial_so4_total_is_consistent() {
        let (_, state) = state();
        for idx in 0..state.so4t.as_slice().len() {
            let t = state.so4t.as_slice()[idx];
            let g = state.species[ind::SO4].as_slice()[idx];
            let l = state.species[ind::SO4L].as_slice()[idx];
            assert!((t - g - l).abs() <= 1e-12 * t.abs().max(1.0));
        }
    }

    #[test]
    fn gather_scatter_round_trips() {
        let (_, mut state) = state();
        let mut var = state.gather_cell(3, 4);
        var[ind::O3] *= 2.0;
        state.scatter_cell(&var, 3, 4);
        assert_eq!(state.species[ind::O3].get(3, 4), var[ind::O3]);
        assert_eq!(state.gather_cell(3, 4), var);
    }

    #[test]
    fn background_liquid_seeds_population() {
        let (mesh, state) = state();
        assert!(state.liquid.moment_total(0, &mesh) > 0.0);
        assert_eq!(state.solid.moment_total(0, &mesh), 0.0);
    }
}
