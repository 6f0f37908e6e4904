//! Sectional size grid.

/// Geometrically spaced radius bins shared by a population's fields,
/// kernel and moments.
#[derive(Debug, Clone)]
pub struct BinGrid {
    /// Bin-centre radii [m], ascending.
    centres: Vec<f64>,
    /// Bin-edge radii [m], length `nbin + 1`.
    edges: Vec<f64>,
    /// Single-particle volume at each bin centre [m^3].
    volumes: Vec<f64>,
}

impl BinGrid {
    /// Build `nbin` bins spanning `[r_min, r_max]` with constant radius
    /// ratio between edges; centres are the geometric means of the edges.
    ///
    /// # Panics
    /// Panics on a non-positive radius range or zero bins.
    #[must_use]
    pub fn geometric(r_min_m: f64, r_max_m: f64, nbin: usize) -> Self {
        assert!(nbin > 0, "need at least one bin");
        assert!(
            r_min_m > 0.0 && r_max_m > r_min_m,
            "bin range must be positive and increasing"
        );
        let ratio = (r_max_m / r_min_m).powf(1.0 / nbin as f64);
        let edges: Vec<f64> = (0..=nbin).map(|k| r_min_m * ratio.powi(k as i32)).collect();
        let centres: Vec<f64> = edges.windows(2).map(|e| (e[0] * e[1]).sqrt()).collect();
        let volumes = centres
            .iter()
            .map(|&r| 4.0 / 3.0 * std::f64::consts::PI * r.powi(3))
            .collect();
        Self {
            centres,
            edges,
            volumes,
        }
    }

    #[inline]
    #[must_use]
    pub fn nbin(&self) -> usize {
        self.centres.len()
    }

    #[must_use]
    pub fn centres(&self) -> &[f64] {
        &self.centres
    }

    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    #[must_use]
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Bin holding radius `r`, or None outside the grid.
    #[must_use]
    pub fn bin_of(&self, r_m: f64) -> Option<usize> {
        if r_m < self.edges[0] || r_m >= *self.edges.last().unwrap() {
            return None;
        }
        // Edges are geometric, so the index is logarithmic in r.
        let ratio = self.edges[1] / self.edges[0];
        let idx = ((r_m / self.edges[0]).ln() / ratio.ln()).floor() as usize;
        Some(idx.min(self.nbin() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centres_sit_between_edges() {
        let bins = BinGrid::geometric(1e-9, 1e-6, 30);
        assert_eq!(bins.nbin(), 30);
        for k in 0..bins.nbin() {
            assert!(bins.edges()[k] < bins.centres()[k]);
            assert!(bins.centres()[k] < bins.edges()[k + 1]);
        }
    }

    #[test]
    fn bin_of_inverts_the_grid() {
        let bins = BinGrid::geometric(1e-9, 1e-6, 24);
        for k in 0..bins.nbin() {
            assert_eq!(bins.bin_of(bins.centres()[k]), Some(k), "bin {k}");
        }
        assert_eq!(bins.bin_of(1e-10), None);
        assert_eq!(bins.bin_of(1e-3), None);
    }
}
