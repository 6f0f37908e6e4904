//! 2-D scalar field storage.

use serde::{Deserialize, Serialize};

/// A 2-D field of non-negative reals on the cross-stream mesh, stored as a
/// flat `Vec<f64>` in row-major order (`j * nx + i`, with `j` the vertical
/// index). Concentrations are in molecules/cm^3, number densities in
/// particles/cm^3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarField {
    data: Vec<f64>,
    nx: usize,
    ny: usize,
}

impl ScalarField {
    /// New field initialised to zero.
    #[must_use]
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            data: vec![0.0; nx * ny],
            nx,
            ny,
        }
    }

    /// New field initialised to a uniform value.
    #[must_use]
    pub fn with_value(nx: usize, ny: usize, value: f64) -> Self {
        Self {
            data: vec![value; nx * ny],
            nx,
            ny,
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

    /// Value at column `i`, row `j`.
    ///
    /// # Panics
    /// Panics if the indices are out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.nx && j < self.ny, "field index out of bounds");
        self.data[j * self.nx + i]
    }

    /// Set the value at column `i`, row `j`.
    ///
    /// # Panics
    /// Panics if the indices are out of bounds.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < self.nx && j < self.ny, "field index out of bounds");
        self.data[j * self.nx + i] = value;
    }

    #[inline]
    pub fn add(&mut self, i: usize, j: usize, delta: f64) {
        assert!(i < self.nx && j < self.ny, "field index out of bounds");
        self.data[j * self.nx + i] += delta;
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Multiply every cell by a constant.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Area-weighted total over the mesh: sum of value times cell area.
    /// `areas` must come from the same mesh.
    #[must_use]
    pub fn integrate(&self, areas: &ScalarField) -> f64 {
        debug_assert_eq!(self.data.len(), areas.data.len());
        self.data
            .iter()
            .zip(&areas.data)
            .map(|(v, a)| v * a)
            .sum()
    }

    /// Largest value in the field.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Replace every value below zero with `floor`, returning how many cells
    /// were touched.
    pub fn fill_negatives(&mut self, floor: f64) -> usize {
        let mut touched = 0;
        for v in &mut self.data {
            if *v < 0.0 {
                *v = floor;
                touched += 1;
            }
        }
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let mut f = ScalarField::new(4, 3);
        f.set(2, 1, 7.5);
        assert_eq!(f.as_slice()[1 * 4 + 2], 7.5);
        assert_eq!(f.get(2, 1), 7.5);
    }

    #[test]
    fn integrate_weights_by_area() {
        let f = ScalarField::with_value(2, 2, 3.0);
        let areas = ScalarField::with_value(2, 2, 0.5);
        assert_eq!(f.integrate(&areas), 6.0);
    }

    #[test]
    fn fill_negatives_counts_and_floors() {
        let mut f = ScalarField::new(2, 1);
        f.set(0, 0, -1.0);
        f.set(1, 0, 2.0);
        let touched = f.fill_negatives(1e-50);
        assert_eq!(touched, 1);
        assert_eq!(f.get(0, 0), 1e-50);
        assert_eq!(f.get(1, 0), 2.0);
    }

    #[test]
    #[should_panic(expected = "field index out of bounds")]
    fn bounds_are_checked() {
        let f = ScalarField::new(4, 3);
        let _ = f.get(4, 0);
    }
}
