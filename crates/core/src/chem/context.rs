//! Explicit chemistry context.
//!
//! RCONST, HET, PHOTOL and KHETI_SLA live in a value that is cloned per
//! worker and threaded into the integrator, so any number of cells can be
//! solved concurrently.

use super::mechanism::{jind, Mechanism};
use crate::core_types::species::ind::NVAR;

/// Number of uptake coefficients carried for stratospheric liquid aerosol.
pub const N_KHETI_SLA: usize = 11;

/// Per-solve chemistry state: rate constants, heterogeneous first-order
/// rates per species and channel, and the current photolysis vector.
#[derive(Debug, Clone)]
pub struct ChemContext {
    /// One rate constant per reaction [cm^3/s or 1/s].
    pub rconst: Vec<f64>,
    /// `het[species][channel]` first-order loss rates [1/s].
    pub het: Vec<[f64; 3]>,
    /// Photolysis rates [1/s], indexed by `jind`.
    pub photol: [f64; jind::NPHOTOL],
    /// Uptake coefficients for stratospheric liquid aerosol, threaded to
    /// the heterogeneous update.
    pub kheti_sla: [f64; N_KHETI_SLA],
}

impl ChemContext {
    #[must_use]
    pub fn new(mech: &Mechanism) -> Self {
        Self {
            rconst: vec![0.0; mech.n_react()],
            het: vec![[0.0; 3]; NVAR],
            photol: [0.0; jind::NPHOTOL],
            kheti_sla: [0.0; N_KHETI_SLA],
        }
    }

    /// Zero the heterogeneous rates ahead of re-evaluation.
    pub fn clear_het(&mut self) {
        for row in &mut self.het {
            *row = [0.0; 3];
        }
    }
}
