//! Conserved-marker mass diagnostics.
//!
//! Every step the driver checks the emitted columns of NOy (nitrogen
//! weighted, N2O and N2O5 counting twice) and CO2 against the ambient,
//! and, when rings are on, how much of the emitted mass the rings still
//! contain.

use crate::ambient::AmbientRecord;
use crate::core_types::species::{ind, ind::NVAR, noy_weight};
use crate::grid::{Mesh, RingCluster};
use crate::simulation::state::SolutionState;

/// One marker's column budget at a time index.
#[derive(Debug, Clone, Copy)]
pub struct MassCheck {
    /// Ambient column concentration [molecules/cm^3].
    pub ambient: f64,
    /// Plume-excess column over the mesh [molecules/cm^3 m^2].
    pub emitted: f64,
    /// Fraction of the emitted mass inside the ring cluster, if rings are
    /// on.
    pub ring_fraction: Option<f64>,
}

/// NOy budget: nitrogen-weighted sum over the member species.
#[must_use]
pub fn noy_check(
    state: &SolutionState,
    ambient: &AmbientRecord,
    mesh: &Mesh,
    rings: Option<&RingCluster>,
    n_time: usize,
) -> MassCheck {
    let weights: Vec<f64> = (0..NVAR).map(|s| f64::from(noy_weight(s))).collect();
    let ambient_noy: f64 = (0..NVAR)
        .map(|s| weights[s] * ambient.species(s, n_time))
        .sum();

    let mut emitted = 0.0;
    for j in 0..mesh.ny() {
        for i in 0..mesh.nx() {
            let mut noy = 0.0;
            for s in 0..NVAR {
                if weights[s] > 0.0 {
                    noy += weights[s] * state.species[s].get(i, j);
                }
            }
            emitted += (noy - ambient_noy) * mesh.areas().get(i, j);
        }
    }

    let ring_fraction = rings.map(|cluster| {
        let mut in_rings = 0.0;
        for r in 0..cluster.n_ring() {
            for &(i, j) in cluster.members(r) {
                let mut noy = 0.0;
                for s in 0..NVAR {
                    if weights[s] > 0.0 {
                        noy += weights[s] * state.species[s].get(i, j);
                    }
                }
                in_rings += (noy - ambient_noy) * mesh.areas().get(i, j);
            }
        }
        if emitted != 0.0 {
            in_rings / emitted
        } else {
            0.0
        }
    });

    MassCheck {
        ambient: ambient_noy,
        emitted,
        ring_fraction,
    }
}

/// CO2 budget. Not exactly conserved once chemistry runs (CO oxidation
/// feeds it), which is the point of watching it.
#[must_use]
pub fn co2_check(
    state: &SolutionState,
    ambient: &AmbientRecord,
    mesh: &Mesh,
    rings: Option<&RingCluster>,
    n_time: usize,
) -> MassCheck {
    let ambient_co2 = ambient.species(ind::CO2, n_time);
    let mut emitted = 0.0;
    for j in 0..mesh.ny() {
        for i in 0..mesh.nx() {
            emitted += (state.species[ind::CO2].get(i, j) - ambient_co2) * mesh.areas().get(i, j);
        }
    }
    let ring_fraction = rings.map(|cluster| {
        let mut in_rings = 0.0;
        for r in 0..cluster.n_ring() {
            for &(i, j) in cluster.members(r) {
                in_rings +=
                    (state.species[ind::CO2].get(i, j) - ambient_co2) * mesh.areas().get(i, j);
            }
        }
        if emitted != 0.0 {
            in_rings / emitted
        } else {
            0.0
        }
    });
    MassCheck {
        ambient: ambient_co2,
        emitted,
        ring_fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::AmbientProfile;
    use crate::physics::thermo;
    use crate::simulation::state::SolutionState;

    fn setup() -> (Mesh, SolutionState, AmbientRecord) {
        let mesh = Mesh::new(8, 8, 800.0, 800.0);
        let sample = AmbientProfile::builtin().sample(24000.0);
        let airdens = thermo::air_number_density(220.0, 24000.0);
        let state = SolutionState::initialize(&mesh, &sample, 220.0, 24000.0, airdens, 1.0e14);
        let record = AmbientRecord::new(3, &sample.concentrations(airdens));
        (mesh, state, record)
    }

    #[test]
    fn unperturbed_state_has_zero_emitted_mass() {
        let (mesh, state, record) = setup();
        let noy = noy_check(&state, &record, &mesh, None, 0);
        let co2 = co2_check(&state, &record, &mesh, None, 0);
        assert!(noy.ambient > 0.0);
        assert!(noy.emitted.abs() < 1e-6 * noy.ambient * mesh.total_area());
        assert!(co2.emitted.abs() < 1e-6 * co2.ambient * mesh.total_area());
    }

    #[test]
    fn injected_no_shows_up_weighted_once() {
        let (mesh, mut state, record) = setup();
        state.species[ind::NO].add(4, 4, 1.0e10);
        state.species[ind::N2O5].add(4, 4, 1.0e9);
        let noy = noy_check(&state, &record, &mesh, None, 0);
        let cell_area = mesh.areas().get(4, 4);
        let expected = (1.0e10 + 2.0 * 1.0e9) * cell_area;
        assert!(
            (noy.emitted - expected).abs() / expected < 1e-9,
            "emitted {} vs {expected}",
            noy.emitted
        );
    }
}
