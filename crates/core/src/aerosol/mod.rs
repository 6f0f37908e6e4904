//! Sectional aerosol microphysics: bins, distributions, coagulation,
//! settling interplay and depositional growth.

mod bins;
mod coagulation;
mod distribution;
mod growth;
mod population;

pub use bins::BinGrid;
pub use coagulation::CoagulationKernel;
pub use distribution::AerosolDistribution;
pub use growth::grow_ice;
pub use population::{AerosolPopulation, MicrophysicsLevel};
