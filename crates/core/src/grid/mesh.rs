//! Cross-stream mesh.
//!
//! Rectangular grid of `nx x ny` cells with uniform spacing, cell-centred
//! coordinates and the plume centre at (0, 0). x is the cross-wind
//! horizontal axis, y the vertical. Cell areas are fixed at construction.

use serde::{Deserialize, Serialize};

use super::field::ScalarField;

/// Mirror-symmetry convention of a field on the mesh, used by coagulation to
/// reduce the number of cells it visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSymmetry {
    /// No mirror symmetry; every cell is visited.
    None,
    /// Even in x only; one half is computed and mirrored.
    X,
    /// Even in both x and y; one quadrant is computed and mirrored.
    XY,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    /// Cell-centre x coordinates [m], ascending, antisymmetric about 0.
    x: Vec<f64>,
    /// Cell-centre y coordinates [m], ascending, antisymmetric about 0.
    y: Vec<f64>,
    /// Per-cell area [m^2], constant for a uniform mesh but stored as a
    /// field so diagnostics integrate the same way everywhere.
    areas: ScalarField,
}

impl Mesh {
    /// Build a mesh spanning `[-x_extent/2, x_extent/2]` by
    /// `[-y_extent/2, y_extent/2]` metres.
    ///
    /// # Panics
    /// Panics if a dimension is zero or odd; mirror symmetry needs matched
    /// cell pairs on both sides of each axis.
    #[must_use]
    pub fn new(nx: usize, ny: usize, x_extent_m: f64, y_extent_m: f64) -> Self {
        assert!(nx > 0 && ny > 0, "mesh dimensions must be positive");
        assert!(
            nx % 2 == 0 && ny % 2 == 0,
            "mesh dimensions must be even for axis symmetry"
        );
        let dx = x_extent_m / nx as f64;
        let dy = y_extent_m / ny as f64;
        let x = (0..nx)
            .map(|i| (i as f64 + 0.5) * dx - x_extent_m / 2.0)
            .collect();
        let y = (0..ny)
            .map(|j| (j as f64 + 0.5) * dy - y_extent_m / 2.0)
            .collect();
        let areas = ScalarField::with_value(nx, ny, dx * dy);
        Self {
            nx,
            ny,
            dx,
            dy,
            x,
            y,
            areas,
        }
    }

    #[inline]
    #[must_use]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline]
    #[must_use]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    #[must_use]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    #[inline]
    #[must_use]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[must_use]
    pub fn areas(&self) -> &ScalarField {
        &self.areas
    }

    /// Total meshed area [m^2].
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.dx * self.dy * (self.nx * self.ny) as f64
    }

    /// Mirror cell of `i` across the y axis.
    #[inline]
    #[must_use]
    pub fn mirror_x(&self, i: usize) -> usize {
        self.nx - 1 - i
    }

    /// Mirror cell of `j` across the x axis.
    #[inline]
    #[must_use]
    pub fn mirror_y(&self, j: usize) -> usize {
        self.ny - 1 - j
    }

    /// A zero field shaped like this mesh.
    #[must_use]
    pub fn field(&self) -> ScalarField {
        ScalarField::new(self.nx, self.ny)
    }

    /// A uniform field shaped like this mesh.
    #[must_use]
    pub fn field_with(&self, value: f64) -> ScalarField {
        ScalarField::with_value(self.nx, self.ny, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centres_are_antisymmetric() {
        let m = Mesh::new(8, 4, 800.0, 200.0);
        for i in 0..m.nx() {
            let mirrored = m.x()[m.mirror_x(i)];
            assert!(
                (m.x()[i] + mirrored).abs() < 1e-12,
                "x centres not mirrored: {} vs {}",
                m.x()[i],
                mirrored
            );
        }
        assert!((m.y()[0] + m.y()[3]).abs() < 1e-12);
    }

    #[test]
    fn areas_sum_to_domain() {
        let m = Mesh::new(16, 8, 1600.0, 400.0);
        let total: f64 = m.areas().as_slice().iter().sum();
        assert!((total - 1600.0 * 400.0).abs() / (1600.0 * 400.0) < 1e-12);
    }

    #[test]
    #[should_panic(expected = "even")]
    fn odd_dimension_rejected() {
        let _ = Mesh::new(5, 4, 100.0, 100.0);
    }
}
