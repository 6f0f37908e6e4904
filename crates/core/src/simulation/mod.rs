//! The coupled plume-evolution driver.
//!
//! One invocation advances one case from emission to `duration_h` hours of
//! plume age. The split order within a step is fixed: transport, SO4
//! partitioning, solar zenith and photolysis update, chemistry, coagulation,
//! ice growth, diagnostics, snapshots. The driver owns every cadence
//! decision; the last step forces all deferred subsystems to fire.

pub mod diagnostics;
pub mod state;
pub mod time_grid;

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::aerosol::grow_ice;
use crate::ambient::{AmbientProfile, AmbientRecord};
use crate::chem::het::AerosolSurface;
use crate::chem::{
    integrate, update_het_rates, update_rconst, ChemContext, Mechanism, PhotolysisTable,
};
use crate::config::{CaseInput, SimulationConfig};
use crate::constants;
use crate::core_types::species::{fix, ind, ind::NVAR, var_name};
use crate::core_types::units::{Kelvin, Pascals};
use crate::emission::{Aircraft, EmissionIndex, Fuel};
use crate::epm;
use crate::errors::{ChemistryError, SimulationError};
use crate::grid::{AxisSymmetry, Mesh, RingCluster};
use crate::met::{Meteorology, SolarZenith};
use crate::output;
use crate::physics::thermo;
use crate::transport::{
    diffusion_parameters, global_advection, settling_velocities, SpectralSolver,
};

use diagnostics::{co2_check, noy_check, MassCheck};
use state::SolutionState;
use time_grid::build_time_grid;

/// Floor value used when refilling aerosol fields after transport.
const AEROSOL_FILL: f64 = 1.0e-50;

/// What one case hands back to the sweep loop.
#[derive(Debug, Clone)]
pub struct CaseSummary {
    pub n_steps: usize,
    /// Final NOy and CO2 budgets.
    pub noy: MassCheck,
    pub co2: MassCheck,
    /// Wall-clock spent in transport and chemistry [s].
    pub transport_wall_s: f64,
    pub chemistry_wall_s: f64,
}

/// Run one case to completion.
#[allow(clippy::too_many_lines)]
pub fn run_case(
    case: &CaseInput,
    config: &SimulationConfig,
) -> Result<CaseSummary, SimulationError> {
    let t_k = case.temperature_k;
    let p_pa = case.pressure_pa;
    let airdens = thermo::air_number_density(t_k, p_pa);
    let rel_humidity_i =
        case.rel_humidity_w * thermo::psat_h2o_liquid(t_k) / thermo::psat_h2o_ice(t_k);
    let is_contrail = rel_humidity_i > 100.0;

    let mut sun = SolarZenith::new(case.latitude_deg, case.day_of_year);

    let mesh = Mesh::new(
        config.transport.nx,
        config.transport.ny,
        config.transport.x_extent_m,
        config.transport.y_extent_m,
    );
    let met = Meteorology::new(&mesh, t_k, p_pa, case.rel_humidity_w, &config.met);

    // Time grid with sunrise/sunset breakpoints.
    let t0 = case.emission_hour * constants::HOUR;
    let t1 = t0 + case.duration_h * constants::HOUR;
    let grid = build_time_grid(
        t0,
        t1,
        sun.sunrise_h * constants::HOUR,
        sun.sunset_h * constants::HOUR,
        config.transport.timestep_s,
    );
    let n_points = grid.len();

    // Background state. The species ordering is validated against an
    // override file when one is configured.
    let species_table = match &config.simulation.species_file {
        Some(path) => crate::core_types::species::SpeciesTable::from_file(path)?,
        None => crate::core_types::species::SpeciesTable::builtin(),
    };
    let profile = match &config.simulation.background_file {
        Some(path) => AmbientProfile::from_file(path, &species_table)?,
        None => AmbientProfile::builtin(),
    };
    let sample = profile.sample(p_pa);
    let mut state = SolutionState::initialize(
        &mesh,
        &sample,
        t_k,
        p_pa,
        airdens,
        met.h2o(mesh.ny() / 2),
    );
    // Water vapour follows the meteorological profile row by row.
    for j in 0..mesh.ny() {
        for i in 0..mesh.nx() {
            state.h2o.set(i, j, met.h2o(j));
        }
    }
    let mut ambient = AmbientRecord::new(n_points, &sample.concentrations(airdens));

    // Ambient aerosol surfaces for the background chemistry solve.
    let ambient_surface = {
        let mut s = AerosolSurface::default();
        s.area[crate::chem::het::CAT_TROP_SULFATE] = sample.liquid.sad;
        s.radius[crate::chem::het::CAT_TROP_SULFATE] = sample.liquid.r_eff * 100.0;
        s.area[crate::chem::het::CAT_ICE_NAT] = sample.solid.sad;
        s.radius[crate::chem::het::CAT_ICE_NAT] = sample.solid.r_eff * 100.0;
        s
    };

    // Transport operators; the microphysics one refills harder.
    let fill_gas = config.transport.fill.then_some(config.transport.fill_value);
    let fill_aero = config.transport.fill.then_some(AEROSOL_FILL);
    let mut sands_gas = SpectralSolver::new(&mesh, fill_gas);
    let mut sands_micro = SpectralSolver::new(&mesh, fill_aero);
    if config.transport.wisdom {
        debug!("warming FFT plans ahead of the time loop");
    }
    sands_gas.warm_up();
    sands_micro.warm_up();

    // Emissions and the early plume.
    let aircraft = Aircraft::b747();
    let fuel = Fuel::jet_a();
    let ei = EmissionIndex::new(&fuel, &aircraft.engine, case.so2_to_so4);
    let mut epm_out = epm::integrate(
        Kelvin::new(t_k),
        Pascals::new(p_pa),
        case.rel_humidity_w,
        &aircraft,
        &ei,
        state.liquid.bins(),
        state.solid.bins(),
    );

    // Two unmerged half-wing plumes; same-wing plumes have merged.
    let mut area_total = 2.0 * epm_out.area;
    if aircraft.n_engines != 2 {
        let scale = f64::from(aircraft.n_engines) / 2.0;
        epm_out.ice_density *= scale;
        epm_out.soot_density *= scale;
        epm_out.liquid_aerosol.scale_pdf(scale);
        epm_out.ice_aerosol.scale_pdf(scale);
    }

    let semi_y = 0.5 * aircraft.vortex_delta_z;
    let semi_x = area_total / (std::f64::consts::PI * semi_y);

    banner(case, &ei, &aircraft, &sun, rel_humidity_i, airdens, &epm_out);

    // Ring cluster and the injection patch.
    let rings = config
        .chemistry
        .rings
        .then(|| RingCluster::new(config.chemistry.n_ring, is_contrail, semi_x, semi_y, &mesh));
    let injection_cells: Vec<(usize, usize)> = {
        let mut cells = match &rings {
            Some(cluster) => cluster.members(0).to_vec(),
            None => {
                // Cells inside the plume ellipse.
                let mut cells = Vec::new();
                for j in 0..mesh.ny() {
                    for i in 0..mesh.nx() {
                        let e =
                            (mesh.x()[i] / semi_x).powi(2) + (mesh.y()[j] / semi_y).powi(2);
                        if e <= 1.0 {
                            cells.push((i, j));
                        }
                    }
                }
                cells
            }
        };
        // A plume smaller than one cell lands on the centre block; a
        // single cell would break the mirror symmetry the coagulation
        // update relies on.
        if cells.is_empty() {
            let (ic, jc) = (mesh.nx() / 2, mesh.ny() / 2);
            cells.extend_from_slice(&[
                (ic - 1, jc - 1),
                (ic, jc - 1),
                (ic - 1, jc),
                (ic, jc),
            ]);
        }
        cells
    };
    let patch_area: f64 = injection_cells
        .iter()
        .map(|&(i, j)| mesh.areas().get(i, j))
        .sum();
    area_total = area_total.min(patch_area);

    // Gaseous emission columns at plume concentration [molecules/cm^3].
    let per_cm3 = |ei_g_per_kg: f64, mw: f64| {
        ei_g_per_kg * aircraft.fuel_per_metre() / mw * constants::NA / (area_total * 1.0e6)
    };
    let gas_columns = vec![
        (ind::CO2, per_cm3(ei.co2, 44.01)),
        (ind::CO, per_cm3(ei.co, 28.01)),
        (ind::NO, per_cm3(ei.no, 30.01)),
        (ind::NO2, per_cm3(ei.no2, 46.01)),
        (ind::HNO2, per_cm3(ei.hno2, 47.01)),
        (ind::SO2, per_cm3(ei.so2 * (1.0 - ei.so2_to_so4), 64.06)),
    ];
    state.add_emission(&epm_out, &gas_columns, &injection_cells, area_total, patch_area);

    // Settling velocities per solid bin, slip-corrected.
    let vfall = if config.aerosol.grav_settling {
        settling_velocities(state.solid.bins().centres(), state.solid.rho_p(), t_k, p_pa)
    } else {
        vec![0.0; state.solid.bins().nbin()]
    };
    let transport_la = state.la_level.transported();
    let transport_pa = state.pa_level.transported();

    // Chemistry scaffolding.
    let mechanism = Arc::new(Mechanism::new());
    let photolysis = match (&config.chemistry.j_rates_dir, config.chemistry.read_j_rates) {
        (Some(dir), true) => PhotolysisTable::from_dir(dir)?,
        _ => PhotolysisTable::builtin(),
    };
    let base_ctx = ChemContext::new(&mechanism);
    let fixc_template = {
        let mut fixc = vec![0.0; fix::NFIX];
        fixc[fix::CH4] = 1.8e-6 * airdens;
        fixc[fix::H2] = 5.0e-7 * airdens;
        fixc[fix::N2] = 0.79 * airdens;
        fixc[fix::O2] = 0.21 * airdens;
        fixc
    };

    // Cadence bookkeeping.
    let mut last_liq_coag = t0;
    let mut last_ice_coag = t0;
    let mut la_snapshots: Vec<(f64, Vec<Vec<f64>>)> = Vec::new();
    let mut pa_snapshots: Vec<(f64, Vec<Vec<f64>>)> = Vec::new();
    let mut last_la_save = t0;
    let mut last_pa_save = t0;
    if config.timeseries.save_aerosol {
        la_snapshots.push((t0, snapshot_pdf(&state.liquid)));
        pa_snapshots.push((t0, snapshot_pdf(&state.solid)));
    }

    // Per-ring species means, saved on the species-timeseries cadence.
    let mut ring_series: Vec<(f64, Vec<Vec<f64>>)> = Vec::new();
    let mut last_ring_save = t0;
    let record_rings = config.timeseries.save_species && rings.is_some();
    if record_rings {
        ring_series.push((t0, ring_means(&state, rings.as_ref().expect("rings"), &mesh)));
    }

    let mut noy_series = Vec::with_capacity(n_points);
    let mut co2_series = Vec::with_capacity(n_points);
    let mut transport_wall = 0.0;
    let mut chemistry_wall = 0.0;

    for n in 0..n_points - 1 {
        let t = grid[n];
        let dt = grid[n + 1] - grid[n];
        let last_step = n + 2 == n_points;
        debug!(
            step = n,
            of = n_points - 1,
            solar_h = (t / constants::HOUR) % 24.0,
            dt,
            "advancing"
        );

        // --- Transport --------------------------------------------------
        if config.transport.enabled {
            let clock = Instant::now();
            let (d_x, d_y) =
                diffusion_parameters(t - t0, config.transport.d_x, config.transport.d_y);
            let updraft = if config.aerosol.plume_updraft {
                config.transport.updraft_m_s
            } else {
                0.0
            };
            let (v_x, v_y, _, _) = global_advection(t - t0, updraft);

            sands_gas.update_time_step(dt);
            sands_gas.update_diffusion(d_x, d_y);
            sands_gas.update_advection(v_x, v_y);
            sands_micro.update_time_step(dt);
            sands_micro.update_diffusion(d_x, d_y);
            sands_micro.update_advection(v_x, v_y);

            state
                .species
                .par_iter_mut()
                .for_each(|field| sands_gas.solve(field));
            sands_gas.solve(&mut state.so4t);
            sands_gas.solve(&mut state.h2o);
            sands_micro.solve(&mut state.soot_dens);
            sands_micro.solve(&mut state.soot_radi);
            sands_micro.solve(&mut state.soot_area);

            if transport_la {
                state
                    .liquid
                    .pdf_mut()
                    .par_iter_mut()
                    .for_each(|field| sands_micro.solve(field));
            }
            if transport_pa {
                state
                    .solid
                    .pdf_mut()
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(bin, field)| {
                        sands_micro.solve_with_velocity(field, v_x, v_y - vfall[bin]);
                    });
            }
            transport_wall += clock.elapsed().as_secs_f64();
        }

        // --- SO4 partitioning --------------------------------------------
        state.partition_so4(&met, &mesh);

        // --- Solar zenith and photolysis ---------------------------------
        sun.update(t);
        ambient.cos_sza[n] = sun.csza;
        let j_rates = photolysis.rates_at(sun.csza);

        // --- Chemistry ---------------------------------------------------
        if config.chemistry.enabled {
            let clock = Instant::now();
            let mut ctx = base_ctx.clone();
            ctx.photol = j_rates;
            run_chemistry(
                &mechanism,
                &ctx,
                &mut state,
                &mesh,
                &met,
                rings.as_ref(),
                &fixc_template,
                t_k,
                p_pa,
                airdens,
                t,
                dt,
                config,
            )?;
            // Ambient chemistry against the declared ambient temperature.
            let mut amb_var = ambient.get(n);
            let mut amb_ctx = ctx.clone();
            let mut fixc = fixc_template.clone();
            fixc[fix::H2O] = met.h2o(mesh.ny() / 2);
            let rel_hum = fixc[fix::H2O] * constants::K_B * t_k * 1.0e6
                / thermo::psat_h2o_liquid(t_k)
                * 100.0;
            update_het_rates(
                &mut amb_ctx,
                t_k,
                p_pa,
                airdens,
                rel_hum,
                state.state_psc,
                &ambient_surface,
                0.0,
            );
            update_rconst(&mechanism, &mut amb_ctx, t_k, p_pa, airdens, fixc[fix::H2O]);
            let pre = amb_var.clone();
            integrate(
                &mechanism,
                &amb_ctx,
                &mut amb_var,
                &fixc,
                dt,
                config.chemistry.rtol,
                config.chemistry.atol,
            )
            .map_err(|reason| chemistry_failure(&amb_ctx, &amb_var, airdens, t, None, reason))?;
            ambient.fill_in(&amb_var, n + 1);
            // Cells beyond the outermost ring follow the ambient solve.
            if let Some(cluster) = &rings {
                apply_outside_rings(&mut state, &mesh, cluster, &pre, &amb_var);
            }
            state.sync_so4_total();
            chemistry_wall += clock.elapsed().as_secs_f64();
        } else {
            let row = ambient.get(n);
            ambient.fill_in(&row, n + 1);
        }

        // --- Coagulation -------------------------------------------------
        if config.aerosol.coagulation {
            let t_next = grid[n + 1];
            // An imposed updraft shifts every field off the x axis; only
            // the cross-wind mirror survives it.
            let base_sym = if config.aerosol.plume_updraft {
                AxisSymmetry::X
            } else {
                AxisSymmetry::XY
            };
            if state.la_level.coagulates()
                && (t_next - last_liq_coag >= config.aerosol.liq_coag_timestep_s || last_step)
            {
                let dt_coag = t_next - last_liq_coag;
                last_liq_coag = t_next;
                state.liquid.coagulate(dt_coag, base_sym, &mesh);
            }
            if state.pa_level.coagulates()
                && (t_next - last_ice_coag >= config.aerosol.ice_coag_timestep_s || last_step)
            {
                let dt_coag = t_next - last_ice_coag;
                last_ice_coag = t_next;
                // Settling breaks the vertical symmetry of a contrail.
                let sym = if is_contrail {
                    AxisSymmetry::X
                } else {
                    base_sym
                };
                state.solid.coagulate(dt_coag, sym, &mesh);
            }
        }

        // --- Ice growth --------------------------------------------------
        if config.aerosol.ice_growth && state.pa_level.transported() {
            grow_ice(&mut state.solid, &mut state.h2o, &met, &mesh);
        }

        // --- Diagnostics -------------------------------------------------
        let noy = noy_check(&state, &ambient, &mesh, rings.as_ref(), n + 1);
        let co2 = co2_check(&state, &ambient, &mesh, rings.as_ref(), n + 1);
        info!(
            step = n,
            emitted_noy = noy.emitted,
            ring_fraction = noy.ring_fraction,
            emitted_co2 = co2.emitted,
            "mass check"
        );
        noy_series.push(noy.emitted);
        co2_series.push(co2.emitted);

        // --- Ring time series --------------------------------------------
        if record_rings {
            let t_next = grid[n + 1];
            if t_next - last_ring_save >= config.timeseries.species_dt_s || last_step {
                last_ring_save = t_next;
                ring_series
                    .push((t_next, ring_means(&state, rings.as_ref().expect("rings"), &mesh)));
            }
        }

        // --- Aerosol snapshots -------------------------------------------
        if config.timeseries.save_aerosol {
            let t_next = grid[n + 1];
            if t_next - last_la_save >= config.timeseries.aerosol_dt_s || last_step {
                last_la_save = t_next;
                la_snapshots.push((t_next, snapshot_pdf(&state.liquid)));
            }
            if t_next - last_pa_save >= config.timeseries.aerosol_dt_s || last_step {
                last_pa_save = t_next;
                pa_snapshots.push((t_next, snapshot_pdf(&state.solid)));
            }
        }
    }

    sun.update(t1);
    ambient.cos_sza[n_points - 1] = sun.csza;

    info!(
        transport_wall,
        chemistry_wall,
        total = transport_wall + chemistry_wall,
        "clock breakdown [s]"
    );

    // --- Output ----------------------------------------------------------
    output::write_case_outputs(
        config,
        case,
        &mesh,
        &state,
        &ambient,
        &grid,
        &noy_series,
        &co2_series,
        &la_snapshots,
        &pa_snapshots,
        rings
            .as_ref()
            .filter(|_| record_rings)
            .map(|cluster| (cluster.areas(), ring_series.as_slice())),
    )?;

    let noy = noy_check(&state, &ambient, &mesh, rings.as_ref(), n_points - 1);
    let co2 = co2_check(&state, &ambient, &mesh, rings.as_ref(), n_points - 1);
    Ok(CaseSummary {
        n_steps: n_points - 1,
        noy,
        co2,
        transport_wall_s: transport_wall,
        chemistry_wall_s: chemistry_wall,
    })
}

/// Flatten a population's pdf fields for a snapshot.
fn snapshot_pdf(pop: &crate::aerosol::AerosolPopulation) -> Vec<Vec<f64>> {
    pop.pdf().iter().map(|f| f.as_slice().to_vec()).collect()
}

/// Area-weighted species means per ring, inner to outer.
fn ring_means(state: &SolutionState, cluster: &RingCluster, mesh: &Mesh) -> Vec<Vec<f64>> {
    (0..cluster.n_ring())
        .map(|r| state.mean_over_cells(cluster.members(r), mesh))
        .collect()
}

/// Per-cell or per-ring chemistry dispatch.
#[allow(clippy::too_many_arguments)]
fn run_chemistry(
    mechanism: &Arc<Mechanism>,
    base_ctx: &ChemContext,
    state: &mut SolutionState,
    mesh: &Mesh,
    met: &Meteorology,
    rings: Option<&RingCluster>,
    fixc_template: &[f64],
    t_case: f64,
    p_case: f64,
    airdens: f64,
    time_s: f64,
    dt: f64,
    config: &SimulationConfig,
) -> Result<(), SimulationError> {
    if let Some(cluster) = rings {
        // Rings are visited inner to outer; determinism requires it.
        for r in 0..cluster.n_ring() {
            let cells = cluster.members(r);
            if cells.is_empty() {
                continue;
            }
            let mut var = state.mean_over_cells(cells, mesh);
            let pre = var.clone();
            let (surface, iwc) = state.aerosol_surfaces(cells, mesh);
            let rel_hum = state.rel_humidity_at(cells, mesh, t_case);
            let mut ctx = base_ctx.clone();
            update_het_rates(
                &mut ctx,
                t_case,
                p_case,
                airdens,
                rel_hum,
                state.state_psc,
                &surface,
                iwc,
            );
            let mut fixc = fixc_template.to_vec();
            fixc[fix::H2O] = mean_h2o(state, cells, mesh);
            update_rconst(mechanism, &mut ctx, t_case, p_case, airdens, fixc[fix::H2O]);
            integrate(
                mechanism,
                &ctx,
                &mut var,
                &fixc,
                dt,
                config.chemistry.rtol,
                config.chemistry.atol,
            )
            .map_err(|reason| chemistry_failure(&ctx, &var, airdens, time_s, None, reason))?;
            apply_ring(state, cells, &pre, &var);
        }
        Ok(())
    } else {
        // Every cell independently; the loop fans out over the pool.
        let cells: Vec<(usize, usize)> = (0..mesh.ny())
            .flat_map(|j| (0..mesh.nx()).map(move |i| (i, j)))
            .collect();
        let state_ref: &SolutionState = state;
        let results: Vec<Result<(usize, usize, Vec<f64>), ChemistryError>> = cells
            .par_iter()
            .map(|&(i, j)| {
                let mut var = state_ref.gather_cell(i, j);
                let (surface, iwc) = state_ref.aerosol_surfaces(&[(i, j)], mesh);
                let t_cell = met.temperature(j);
                let p_cell = met.pressure(j);
                let h2o = state_ref.h2o.get(i, j);
                let rel_hum = h2o * constants::K_B * t_cell * 1.0e6
                    / thermo::psat_h2o_liquid(t_cell)
                    * 100.0;
                let mut ctx = base_ctx.clone();
                update_het_rates(
                    &mut ctx,
                    t_cell,
                    p_cell,
                    airdens,
                    rel_hum,
                    state_ref.state_psc,
                    &surface,
                    iwc,
                );
                let mut fixc = fixc_template.to_vec();
                fixc[fix::H2O] = h2o;
                update_rconst(mechanism, &mut ctx, t_cell, p_cell, airdens, h2o);
                integrate(
                    mechanism,
                    &ctx,
                    &mut var,
                    &fixc,
                    dt,
                    config.chemistry.rtol,
                    config.chemistry.atol,
                )
                .map_err(|reason| {
                    chemistry_failure(&ctx, &var, airdens, time_s, Some((i, j)), reason)
                })?;
                Ok((i, j, var))
            })
            .collect();
        for result in results {
            let (i, j, var) = result?;
            state.scatter_cell(&var, i, j);
        }
        Ok(())
    }
}

fn mean_h2o(state: &SolutionState, cells: &[(usize, usize)], mesh: &Mesh) -> f64 {
    let total_area: f64 = cells.iter().map(|&(i, j)| mesh.areas().get(i, j)).sum();
    cells
        .iter()
        .map(|&(i, j)| state.h2o.get(i, j) * mesh.areas().get(i, j))
        .sum::<f64>()
        / total_area
}

/// Apply a ring-mean chemistry update to the member cells by the post/pre
/// ratio per species; a zero pre-mean falls back to the additive delta.
pub fn apply_ring(state: &mut SolutionState, cells: &[(usize, usize)], pre: &[f64], post: &[f64]) {
    for s in 0..NVAR {
        if pre[s] > 0.0 {
            let ratio = post[s] / pre[s];
            if (ratio - 1.0).abs() < f64::EPSILON {
                continue;
            }
            for &(i, j) in cells {
                let v = state.species[s].get(i, j);
                state.species[s].set(i, j, v * ratio);
            }
        } else {
            let delta = post[s] - pre[s];
            if delta != 0.0 {
                for &(i, j) in cells {
                    state.species[s].add(i, j, delta);
                }
            }
        }
    }
}

/// Cells beyond the outermost ring follow the ambient chemistry.
fn apply_outside_rings(
    state: &mut SolutionState,
    mesh: &Mesh,
    cluster: &RingCluster,
    pre: &[f64],
    post: &[f64],
) {
    let mut in_ring = vec![false; mesh.nx() * mesh.ny()];
    for r in 0..cluster.n_ring() {
        for &(i, j) in cluster.members(r) {
            in_ring[j * mesh.nx() + i] = true;
        }
    }
    let outside: Vec<(usize, usize)> = (0..mesh.ny())
        .flat_map(|j| (0..mesh.nx()).map(move |i| (i, j)))
        .filter(|&(i, j)| !in_ring[j * mesh.nx() + i])
        .collect();
    apply_ring(state, &outside, pre, post);
}

/// Dump every rate constant and concentration for post-mortem analysis,
/// then wrap the error.
fn chemistry_failure(
    ctx: &ChemContext,
    var: &[f64],
    airdens: f64,
    time_s: f64,
    cell: Option<(usize, usize)>,
    reason: String,
) -> ChemistryError {
    error!(time_s, ?cell, reason, "chemistry integration failed");
    for (r, k) in ctx.rconst.iter().enumerate() {
        error!("reaction {r}: RCONST = {k:.6e}");
    }
    for (s, &c) in var.iter().enumerate() {
        error!(
            "species {} ({}): {:.6e} ppb",
            s,
            var_name(s),
            c / airdens * 1.0e9
        );
    }
    ChemistryError {
        time: time_s,
        cell,
        reason,
    }
}

/// Start-of-run banner: atmospheric conditions, per-kilometre emissions,
/// aerosol properties and background mixing ratios.
fn banner(
    case: &CaseInput,
    ei: &EmissionIndex,
    aircraft: &Aircraft,
    sun: &SolarZenith,
    rel_humidity_i: f64,
    airdens: f64,
    epm_out: &epm::EpmOutput,
) {
    // g/kg times kg/m gives g/m, numerically equal to kg/km.
    let per_km = |ei_g: f64| ei_g * aircraft.fuel_per_metre();
    info!(
        temperature_k = case.temperature_k,
        pressure_hpa = case.pressure_pa * 1.0e-2,
        rh_i = rel_humidity_i,
        latitude = case.latitude_deg,
        csza_max = sun.csza_max,
        "atmospheric conditions"
    );
    info!(
        e_co2_kg_km = per_km(ei.co2),
        e_nox_g_km = per_km(ei.nox_as_nitrogen()) * 1.0e3,
        e_so2_g_km = per_km(ei.so2) * 1.0e3,
        soot_g_km = per_km(ei.soot) * 1.0e3,
        "emissions"
    );
    info!(
        ice_per_cm3 = epm_out.ice_density,
        ice_radius_um = epm_out.ice_radius * 1.0e6,
        liquid_per_cm3 = epm_out.liquid_aerosol.number(),
        area_m2 = epm_out.area,
        "early plume"
    );
    info!(airdens, "background air density [molec/cm3]");
}
