//! Ring-cluster properties and the per-ring/per-cell chemistry agreement.

use plume_sim_core::ambient::AmbientProfile;
use plume_sim_core::chem::{integrate, update_rconst, ChemContext, Mechanism};
use plume_sim_core::core_types::species::{fix, ind, ind::NVAR};
use plume_sim_core::grid::{Mesh, RingCluster};
use plume_sim_core::physics::thermo;
use plume_sim_core::simulation::apply_ring;
use plume_sim_core::simulation::state::SolutionState;

fn mesh() -> Mesh {
    Mesh::new(32, 32, 3.2e3, 1.6e3)
}

/// Every cell inside the outermost ellipse belongs to exactly one ring and
/// the ring areas sum to the contained-cell area.
#[test]
fn ring_map_is_a_partition() {
    let m = mesh();
    let cluster = RingCluster::new(8, true, 120.0, 30.0, &m);
    let mut owner = vec![None::<usize>; m.nx() * m.ny()];
    for r in 0..cluster.n_ring() {
        for &(i, j) in cluster.members(r) {
            let idx = j * m.nx() + i;
            assert!(owner[idx].is_none(), "cell ({i}, {j}) owned twice");
            owner[idx] = Some(r);
        }
    }
    let outer = cluster.rings().last().unwrap();
    let mut contained = 0.0;
    for j in 0..m.ny() {
        for i in 0..m.nx() {
            let inside =
                (m.x()[i] / outer.a_x).powi(2) + (m.y()[j] / outer.a_y).powi(2) <= 1.0;
            assert_eq!(
                inside,
                owner[j * m.nx() + i].is_some(),
                "membership mismatch at ({i}, {j})"
            );
            if inside {
                contained += m.areas().get(i, j);
            }
        }
    }
    let total: f64 = cluster.areas().iter().sum();
    assert!((total - contained).abs() < 1e-9 * contained.max(1.0));
}

fn uniform_state(m: &Mesh) -> (SolutionState, Vec<f64>, f64) {
    let sample = AmbientProfile::builtin().sample(24000.0);
    let airdens = thermo::air_number_density(220.0, 24000.0);
    let state = SolutionState::initialize(m, &sample, 220.0, 24000.0, airdens, 1.0e14);
    let fixc = {
        let mut f = vec![0.0; fix::NFIX];
        f[fix::H2O] = 1.0e14;
        f[fix::CH4] = 1.8e-6 * airdens;
        f[fix::H2] = 5.0e-7 * airdens;
        f[fix::N2] = 0.79 * airdens;
        f[fix::O2] = 0.21 * airdens;
        f
    };
    (state, fixc, airdens)
}

/// With a single ring covering the whole mesh and uniform initial
/// conditions, solving the ring mean and scaling matches solving every
/// cell, to 1e-8 relative.
#[test]
fn single_ring_matches_per_cell_on_uniform_fields() {
    let m = Mesh::new(8, 8, 3.2e3, 1.6e3);
    // One huge ring containing every cell.
    let cluster = RingCluster::new(1, false, 1.0e5, 1.0e5, &m);
    assert_eq!(cluster.members(0).len(), m.nx() * m.ny());

    let (mut ring_state, fixc, airdens) = uniform_state(&m);
    let (mut cell_state, _, _) = uniform_state(&m);

    let mechanism = Mechanism::new();
    let mut ctx = ChemContext::new(&mechanism);
    // Daytime photolysis for a stiff, active system.
    ctx.photol = plume_sim_core::chem::PhotolysisTable::builtin().rates_at(0.6);
    update_rconst(&mechanism, &mut ctx, 220.0, 24000.0, airdens, 1.0e14);

    // Ring path: one solve on the area-weighted mean, applied by ratio.
    // Tight tolerance keeps any divergence between the two step
    // sequences well under the agreement gate.
    let (rtol, atol) = (1.0e-9, 1.0);
    let cells: Vec<(usize, usize)> = cluster.members(0).to_vec();
    let pre = ring_state.mean_over_cells(&cells, &m);
    let mut post = pre.clone();
    integrate(&mechanism, &ctx, &mut post, &fixc, 600.0, rtol, atol).unwrap();
    apply_ring(&mut ring_state, &cells, &pre, &post);

    // Per-cell path: identical inputs per cell.
    for j in 0..m.ny() {
        for i in 0..m.nx() {
            let mut var = cell_state.gather_cell(i, j);
            integrate(&mechanism, &ctx, &mut var, &fixc, 600.0, rtol, atol).unwrap();
            cell_state.scatter_cell(&var, i, j);
        }
    }

    for s in 0..NVAR {
        for j in 0..m.ny() {
            for i in 0..m.nx() {
                let a = ring_state.species[s].get(i, j);
                let b = cell_state.species[s].get(i, j);
                let scale = a.abs().max(b.abs()).max(1.0e-30);
                assert!(
                    (a - b).abs() / scale < 1e-8,
                    "species {s} differs at ({i}, {j}): ring {a}, cell {b}"
                );
            }
        }
    }
    // The chemistry actually did something.
    assert!(
        (ring_state.species[ind::NO].get(0, 0) - pre[ind::NO]).abs() > 0.0,
        "inert test is vacuous"
    );
}

/// Ring scaling preserves in-ring gradients and positivity.
#[test]
fn ring_scaling_is_multiplicative() {
    let m = mesh();
    let (mut state, _, _) = uniform_state(&m);
    let cells = vec![(0, 0), (1, 0), (2, 0)];
    state.species[ind::O3].set(0, 0, 2.0e11);
    state.species[ind::O3].set(1, 0, 4.0e11);
    state.species[ind::O3].set(2, 0, 6.0e11);
    let mut pre = vec![0.0; NVAR];
    pre[ind::O3] = 4.0e11;
    let mut post = pre.clone();
    post[ind::O3] = 2.0e11; // the solve halved the mean
    apply_ring(&mut state, &cells, &pre, &post);
    assert!((state.species[ind::O3].get(0, 0) - 1.0e11).abs() < 1.0);
    assert!((state.species[ind::O3].get(1, 0) - 2.0e11).abs() < 1.0);
    assert!((state.species[ind::O3].get(2, 0) - 3.0e11).abs() < 1.0);
}
