//! Core types and registries shared across the engine.

pub mod species;
pub mod units;

pub use species::{SpeciesInfo, SpeciesKind, SpeciesTable};
pub use units::{Kelvin, Meters, MetersPerSecond, Pascals, Seconds};
