//! Gas-phase and heterogeneous chemistry.
//!
//! The mechanism tables, the explicit chemistry context (no process
//! globals), rate-constant and heterogeneous-rate updates, the photolysis
//! table, and the stiff Rosenbrock integrator.

pub mod context;
pub mod het;
pub mod mechanism;
pub mod photolysis;
pub mod rconst;
pub mod rosenbrock;

pub use context::ChemContext;
pub use het::{update_het_rates, AerosolSurface};
pub use mechanism::{jind, Mechanism};
pub use photolysis::PhotolysisTable;
pub use rconst::update_rconst;
pub use rosenbrock::{integrate, IntegrationStats};
