//! Mesh, fields and the optional ring partition.

mod field;
mod mesh;
mod rings;

pub use field::ScalarField;
pub use mesh::{AxisSymmetry, Mesh};
pub use rings::{Ring, RingCluster};
