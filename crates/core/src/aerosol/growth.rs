//! Depositional growth and sublimation of the solid population.
//!
//! Water vapour in excess of ice saturation deposits onto the crystals;
//! sub-saturated air sublimates them. The sectional form moves number
//! between adjacent bins and debits the realised volume change from the
//! vapour field exactly, so total water is conserved by construction.

use crate::constants;
use crate::grid::{Mesh, ScalarField};
use crate::met::Meteorology;
use crate::physics::thermo;

use super::population::AerosolPopulation;

/// Fraction of the vapour excess relaxed per growth call. Deposition onto
/// a dense crystal population is fast compared to the transport step, but
/// taking the full excess in one call overshoots where crystals are sparse.
const RELAXATION: f64 = 0.5;

/// Molecules of water per m^3 of ice.
fn molecules_per_m3_ice() -> f64 {
    constants::RHO_ICE / constants::MW_H2O * constants::NA
}

/// Run one deposition/sublimation pass. `h2o` is the gridded water-vapour
/// field [molecules/cm^3], updated in place alongside the population.
pub fn grow_ice(
    pop: &mut AerosolPopulation,
    h2o: &mut ScalarField,
    met: &Meteorology,
    mesh: &Mesh,
) {
    let nbin = pop.bins().nbin();
    let volumes = pop.bins().volumes().to_vec();
    let centres = pop.bins().centres().to_vec();
    let per_m3 = molecules_per_m3_ice();

    for j in 0..mesh.ny() {
        let t = met.temperature(j);
        let nsat = thermo::psat_h2o_ice(t) / (constants::K_B * t) * 1.0e-6;
        for i in 0..mesh.nx() {
            let vapour = h2o.get(i, j);
            let excess = (vapour - nsat) * RELAXATION;
            if excess == 0.0 {
                continue;
            }

            // Crystal surface weighting: diffusional uptake scales with r n.
            let weights: Vec<f64> = (0..nbin)
                .map(|k| centres[k] * pop.pdf()[k].get(i, j))
                .collect();
            let total_w: f64 = weights.iter().sum();
            if total_w == 0.0 {
                continue;
            }

            // Target ice-volume change per cm^3 of air [m^3/cm^3].
            let dv_total = excess / per_m3;
            let mut realised_molecules = 0.0;

            if dv_total > 0.0 {
                // Deposition: shift number up-bin, largest demand first.
                for k in 0..nbin - 1 {
                    let n_k = pop.pdf()[k].get(i, j);
                    if n_k == 0.0 {
                        continue;
                    }
                    let dv_k = dv_total * weights[k] / total_w;
                    let dv_bin = volumes[k + 1] - volumes[k];
                    let moved = (dv_k / dv_bin).min(n_k);
                    if moved > 0.0 {
                        pop.pdf_mut()[k].add(i, j, -moved);
                        pop.pdf_mut()[k + 1].add(i, j, moved);
                        realised_molecules += moved * dv_bin * per_m3;
                    }
                }
            } else {
                // Sublimation: shift number down-bin; the smallest bin
                // evaporates entirely.
                for k in 0..nbin {
                    let n_k = pop.pdf()[k].get(i, j);
                    if n_k == 0.0 {
                        continue;
                    }
                    let dv_k = dv_total * weights[k] / total_w; // negative
                    if k == 0 {
                        let per_particle = volumes[0];
                        let moved = ((-dv_k) / per_particle).min(n_k);
                        if moved > 0.0 {
                            pop.pdf_mut()[0].add(i, j, -moved);
                            realised_molecules -= moved * per_particle * per_m3;
                        }
                    } else {
                        let dv_bin = volumes[k] - volumes[k - 1];
                        let moved = ((-dv_k) / dv_bin).min(n_k);
                        if moved > 0.0 {
                            pop.pdf_mut()[k].add(i, j, -moved);
                            pop.pdf_mut()[k - 1].add(i, j, moved);
                            realised_molecules -= moved * dv_bin * per_m3;
                        }
                    }
                }
            }

            if realised_molecules != 0.0 {
                h2o.set(i, j, vapour - realised_molecules);
            }
        }
    }
}
