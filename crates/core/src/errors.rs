//! Error types surfaced at the component boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Input-validation failures. These abort a run before the time loop starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("missing required entry `{label}` in {path:?}")]
    MissingEntry { path: PathBuf, label: String },
    #[error("entry `{label}`: {reason}")]
    BadValue { label: String, reason: String },
}

/// Ambient initial-condition file failures.
#[derive(Error, Debug)]
pub enum AmbientError {
    #[error("cannot read ambient file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ambient file {path:?}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("ambient profile is empty")]
    Empty,
}

/// Stiff-integrator failure. Carries the forensics the driver dumps.
#[derive(Error, Debug)]
#[error("chemistry integration failed at t = {time} s (cell {cell:?}): {reason}")]
pub struct ChemistryError {
    pub time: f64,
    /// (i, j) for the per-cell path, None for a ring or the ambient solve.
    pub cell: Option<(usize, usize)>,
    pub reason: String,
}

/// Snapshot-write failures. Partial files are left on disk.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("cannot write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode snapshot: {0}")]
    Encode(String),
}

/// Umbrella error for one simulation case.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ambient(#[from] AmbientError),
    #[error(transparent)]
    Chemistry(#[from] ChemistryError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Driver-level status, mapped onto process exit codes by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    Success,
    GenericFail,
    ChemistryFail,
    SaveFail,
}

impl SimulationStatus {
    /// Process exit code for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            SimulationStatus::Success => 0,
            SimulationStatus::GenericFail => 1,
            SimulationStatus::ChemistryFail => 2,
            SimulationStatus::SaveFail => 3,
        }
    }

    /// Classify a case error into the driver status.
    pub fn from_error(err: &SimulationError) -> Self {
        match err {
            SimulationError::Chemistry(_) => SimulationStatus::ChemistryFail,
            SimulationError::Output(_) => SimulationStatus::SaveFail,
            _ => SimulationStatus::GenericFail,
        }
    }
}
