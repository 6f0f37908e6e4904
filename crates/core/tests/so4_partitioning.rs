//! Sulfate partitioning invariant: gas plus liquid reconstructs the total
//! exactly, cell by cell.

use plume_sim_core::ambient::AmbientProfile;
use plume_sim_core::core_types::species::ind;
use plume_sim_core::grid::Mesh;
use plume_sim_core::met::{MetConfig, Meteorology};
use plume_sim_core::physics::thermo;
use plume_sim_core::simulation::state::SolutionState;

#[test]
fn partition_reconstructs_total_everywhere() {
    let mesh = Mesh::new(16, 16, 1.6e3, 1.6e3);
    let met = Meteorology::new(&mesh, 220.0, 24000.0, 60.0, &MetConfig::default());
    let sample = AmbientProfile::builtin().sample(24000.0);
    let airdens = thermo::air_number_density(220.0, 24000.0);
    let mut state = SolutionState::initialize(&mesh, &sample, 220.0, 24000.0, airdens, 1.0e14);

    // A strongly non-uniform total: heavy plume core, clean edge.
    for j in 0..mesh.ny() {
        for i in 0..mesh.nx() {
            let r2 = (mesh.x()[i] / 300.0).powi(2) + (mesh.y()[j] / 300.0).powi(2);
            state.so4t.set(i, j, 1.0e10 * (-r2).exp() + 1.0e4);
        }
    }
    state.partition_so4(&met, &mesh);

    let mut worst: f64 = 0.0;
    for j in 0..mesh.ny() {
        for i in 0..mesh.nx() {
            let total = state.so4t.get(i, j);
            let gas = state.species[ind::SO4].get(i, j);
            let liquid = state.species[ind::SO4L].get(i, j);
            assert!(gas >= 0.0 && liquid >= 0.0);
            worst = worst.max(((gas + liquid) - total).abs() / total);
        }
    }
    assert!(worst < 1e-12, "worst relative closure error {worst:.3e}");
}

#[test]
fn cold_heavy_loading_condenses() {
    let mesh = Mesh::new(4, 4, 400.0, 400.0);
    let met = Meteorology::new(&mesh, 215.0, 24000.0, 60.0, &MetConfig::default());
    let sample = AmbientProfile::builtin().sample(24000.0);
    let airdens = thermo::air_number_density(215.0, 24000.0);
    let mut state = SolutionState::initialize(&mesh, &sample, 215.0, 24000.0, airdens, 1.0e14);
    state.so4t.fill(1.0e10);
    state.partition_so4(&met, &mesh);
    // Nearly everything condenses at cruise temperatures.
    let liquid = state.species[ind::SO4L].get(2, 2);
    let total = state.so4t.get(2, 2);
    assert!(liquid / total > 0.9, "liquid fraction {}", liquid / total);
}
