//! Gridded sectional aerosol population.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::grid::{AxisSymmetry, Mesh, ScalarField};

use super::bins::BinGrid;
use super::coagulation::CoagulationKernel;
use super::distribution::AerosolDistribution;

/// Engagement level of a population's microphysics: none, a uniform
/// background treated once, or the full per-cell treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicrophysicsLevel {
    Off,
    UniformBackground,
    Full,
}

impl MicrophysicsLevel {
    /// Whether per-bin transport runs for this population.
    #[must_use]
    pub fn transported(self) -> bool {
        matches!(self, MicrophysicsLevel::Full)
    }

    /// Whether coagulation runs at all.
    #[must_use]
    pub fn coagulates(self) -> bool {
        !matches!(self, MicrophysicsLevel::Off)
    }
}

/// A sectional population on the mesh: one 2-D number-density field per
/// size bin, the material density, and the precomputed coagulation kernel.
pub struct AerosolPopulation {
    name: &'static str,
    bins: Arc<BinGrid>,
    /// `pdf[k]` is the field of bin `k` [particles/cm^3].
    pdf: Vec<ScalarField>,
    /// Particle material density [kg/m^3].
    rho_p: f64,
    kernel: CoagulationKernel,
}

impl AerosolPopulation {
    #[must_use]
    pub fn new(
        name: &'static str,
        bins: Arc<BinGrid>,
        rho_p: f64,
        kernel: CoagulationKernel,
        mesh: &Mesh,
    ) -> Self {
        let pdf = (0..bins.nbin()).map(|_| mesh.field()).collect();
        Self {
            name,
            bins,
            pdf,
            rho_p,
            kernel,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn bins(&self) -> &Arc<BinGrid> {
        &self.bins
    }

    #[must_use]
    pub fn rho_p(&self) -> f64 {
        self.rho_p
    }

    #[must_use]
    pub fn kernel(&self) -> &CoagulationKernel {
        &self.kernel
    }

    #[must_use]
    pub fn pdf(&self) -> &[ScalarField] {
        &self.pdf
    }

    pub fn pdf_mut(&mut self) -> &mut [ScalarField] {
        &mut self.pdf
    }

    /// Deposit a 0-D distribution into a set of cells, adding `weight`
    /// times the parcel pdf to each.
    pub fn deposit(&mut self, parcel: &AerosolDistribution, cells: &[(usize, usize)], weight: f64) {
        for (field, &n) in self.pdf.iter_mut().zip(parcel.pdf()) {
            for &(i, j) in cells {
                field.add(i, j, n * weight);
            }
        }
    }

    /// Radius-moment field of order `k`: `sum_i r_i^k pdf_i[j][x]`.
    #[must_use]
    pub fn moment_field(&self, order: i32, mesh: &Mesh) -> ScalarField {
        let mut out = mesh.field();
        for (k, field) in self.pdf.iter().enumerate() {
            let w = self.bins.centres()[k].powi(order);
            for (dst, &src) in out.as_mut_slice().iter_mut().zip(field.as_slice()) {
                *dst += w * src;
            }
        }
        out
    }

    /// Area-integrated radius moment over the whole mesh.
    #[must_use]
    pub fn moment_total(&self, order: i32, mesh: &Mesh) -> f64 {
        self.pdf
            .iter()
            .enumerate()
            .map(|(k, field)| self.bins.centres()[k].powi(order) * field.integrate(mesh.areas()))
            .sum()
    }

    /// Mean bin vector over a set of cells, area-weighted.
    #[must_use]
    pub fn mean_over_cells(&self, cells: &[(usize, usize)], mesh: &Mesh) -> AerosolDistribution {
        let mut out = AerosolDistribution::empty(Arc::clone(&self.bins));
        let total_area: f64 = cells.iter().map(|&(i, j)| mesh.areas().get(i, j)).sum();
        if total_area == 0.0 {
            return out;
        }
        for (k, field) in self.pdf.iter().enumerate() {
            let sum: f64 = cells
                .iter()
                .map(|&(i, j)| field.get(i, j) * mesh.areas().get(i, j))
                .sum();
            out.pdf_mut()[k] = sum / total_area;
        }
        out
    }

    /// Run one coagulation pass of length `dt` over the mesh. `sym`
    /// declares the mirror symmetry of the fields: the update is computed
    /// on the reduced set of cells and copied to their mirrors.
    pub fn coagulate(&mut self, dt: f64, sym: AxisSymmetry, mesh: &Mesh) {
        let nx = mesh.nx();
        let ny = mesh.ny();
        let (i_max, j_max) = match sym {
            AxisSymmetry::XY => (nx / 2, ny / 2),
            AxisSymmetry::X => (nx / 2, ny),
            AxisSymmetry::None => (nx, ny),
        };

        let cells: Vec<(usize, usize)> = (0..j_max)
            .flat_map(|j| (0..i_max).map(move |i| (i, j)))
            .collect();

        let volumes = self.bins.volumes().to_vec();
        let kernel = &self.kernel;
        let pdf = &self.pdf;
        let updated: Vec<Vec<f64>> = cells
            .par_iter()
            .map(|&(i, j)| {
                let mut n: Vec<f64> = pdf.iter().map(|f| f.get(i, j)).collect();
                kernel.advance(&mut n, &volumes, dt);
                n
            })
            .collect();

        for (&(i, j), n) in cells.iter().zip(&updated) {
            let im = mesh.mirror_x(i);
            let jm = mesh.mirror_y(j);
            for (k, field) in self.pdf.iter_mut().enumerate() {
                field.set(i, j, n[k]);
                match sym {
                    AxisSymmetry::XY => {
                        field.set(im, j, n[k]);
                        field.set(i, jm, n[k]);
                        field.set(im, jm, n[k]);
                    }
                    AxisSymmetry::X => {
                        field.set(im, j, n[k]);
                    }
                    AxisSymmetry::None => {}
                }
            }
        }
        debug!(
            population = self.name,
            dt,
            cells = cells.len(),
            "coagulation pass complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    fn setup() -> (Mesh, AerosolPopulation) {
        let mesh = Mesh::new(8, 8, 800.0, 800.0);
        let bins = Arc::new(BinGrid::geometric(5e-9, 5e-6, 16));
        let kernel = CoagulationKernel::build(&bins, constants::RHO_SULFATE, 220.0, 24000.0);
        let pop = AerosolPopulation::new("LA", bins, constants::RHO_SULFATE, kernel, &mesh);
        (mesh, pop)
    }

    /// Fill bin `k` with a symmetric blob.
    fn seed(pop: &mut AerosolPopulation, mesh: &Mesh, k: usize) {
        let mut field = mesh.field();
        for j in 0..mesh.ny() {
            for i in 0..mesh.nx() {
                let r2 = mesh.x()[i].powi(2) + mesh.y()[j].powi(2);
                field.set(i, j, 1.0e5 * (-r2 / 2.0e4).exp());
            }
        }
        pop.pdf_mut()[k] = field;
    }

    #[test]
    fn symmetric_update_matches_full_update() {
        let (mesh, mut pop_sym) = setup();
        let (_, mut pop_full) = setup();
        seed(&mut pop_sym, &mesh, 6);
        seed(&mut pop_full, &mesh, 6);
        pop_sym.coagulate(3600.0, AxisSymmetry::XY, &mesh);
        pop_full.coagulate(3600.0, AxisSymmetry::None, &mesh);
        for k in 0..pop_sym.bins().nbin() {
            for (a, b) in pop_sym.pdf()[k]
                .as_slice()
                .iter()
                .zip(pop_full.pdf()[k].as_slice())
            {
                assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn grid_coagulation_conserves_volume() {
        let (mesh, mut pop) = setup();
        seed(&mut pop, &mesh, 5);
        let v0 = pop.moment_total(3, &mesh);
        let n0 = pop.moment_total(0, &mesh);
        for _ in 0..4 {
            pop.coagulate(1800.0, AxisSymmetry::XY, &mesh);
        }
        let v1 = pop.moment_total(3, &mesh);
        let n1 = pop.moment_total(0, &mesh);
        assert!((v1 - v0).abs() / v0 < 1e-6, "volume {v0} -> {v1}");
        assert!(n1 < n0, "number {n0} -> {n1}");
    }
}
