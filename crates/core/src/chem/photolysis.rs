//! Photolysis-rate lookup.
//!
//! J-values are tabulated against the cosine of the solar zenith angle and
//! linearly interpolated. A non-positive CSZA returns the zero vector. The
//! built-in table is a clear-sky upper-troposphere climatology; a run
//! directory may substitute its own table file.

use std::path::Path;

use tracing::debug;

use super::mechanism::jind::{self, NPHOTOL};
use crate::errors::ConfigError;

/// Overhead-sun J values [1/s] and the CSZA exponent shaping each entry's
/// falloff toward the terminator. UV-driven entries fall off harder.
#[rustfmt::skip]
static BUILTIN: [(usize, f64, f64); NPHOTOL] = [
    (jind::O3_TO_O1D,      3.0e-5, 2.5),
    (jind::O3_TO_O,        4.5e-4, 1.2),
    (jind::NO2,            1.0e-2, 1.2),
    (jind::NO3_TO_NO2,     1.9e-1, 1.0),
    (jind::NO3_TO_NO,      2.4e-2, 1.0),
    (jind::H2O2,           8.0e-6, 1.5),
    (jind::CH2O_RADICAL,   3.2e-5, 1.4),
    (jind::CH2O_MOLECULAR, 4.6e-5, 1.3),
    (jind::HNO3,           7.0e-7, 2.0),
    (jind::HNO2,           2.0e-3, 1.2),
    (jind::HNO4,           6.0e-6, 1.6),
    (jind::N2O5,           4.0e-5, 1.7),
    (jind::CL2,            2.4e-3, 1.1),
    (jind::HOCL,           3.0e-4, 1.3),
    (jind::CLNO3,          5.0e-5, 1.5),
    (jind::HOBR,           2.0e-3, 1.2),
    (jind::BRNO3,          1.1e-3, 1.3),
    (jind::CL2O2,          2.0e-3, 1.3),
    (jind::CH3OOH,         6.0e-6, 1.5),
];

const N_GRID: usize = 21;

/// Tabulated J-values keyed by CSZA.
#[derive(Debug, Clone)]
pub struct PhotolysisTable {
    /// Ascending CSZA grid in (0, 1].
    csza: Vec<f64>,
    /// One NPHOTOL-long row per grid point.
    rates: Vec<[f64; NPHOTOL]>,
}

impl PhotolysisTable {
    /// Built-in clear-sky climatology.
    #[must_use]
    pub fn builtin() -> Self {
        let csza: Vec<f64> = (1..=N_GRID).map(|i| i as f64 / N_GRID as f64).collect();
        let rates = csza
            .iter()
            .map(|&mu| {
                let mut row = [0.0; NPHOTOL];
                for &(slot, j_max, exponent) in &BUILTIN {
                    row[slot] = j_max * mu.powf(exponent);
                }
                row
            })
            .collect();
        Self { csza, rates }
    }

    /// Read `jrates.dat` from a photolysis directory: one line per CSZA
    /// grid point, `CSZA J0 J1 ... J18`, ascending in CSZA.
    pub fn from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join("jrates.dat");
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let mut csza = Vec::new();
        let mut rates = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let values: Result<Vec<f64>, _> =
                line.split_whitespace().map(str::parse::<f64>).collect();
            let values = values.map_err(|e| ConfigError::Malformed {
                path: path.clone(),
                line: lineno + 1,
                reason: format!("bad number: {e}"),
            })?;
            if values.len() != NPHOTOL + 1 {
                return Err(ConfigError::Malformed {
                    path: path.clone(),
                    line: lineno + 1,
                    reason: format!("expected {} columns, got {}", NPHOTOL + 1, values.len()),
                });
            }
            if let Some(&last) = csza.last() {
                if values[0] <= last {
                    return Err(ConfigError::Malformed {
                        path: path.clone(),
                        line: lineno + 1,
                        reason: "CSZA grid must ascend".into(),
                    });
                }
            }
            csza.push(values[0]);
            let mut row = [0.0; NPHOTOL];
            row.copy_from_slice(&values[1..]);
            rates.push(row);
        }
        if csza.is_empty() {
            return Err(ConfigError::Malformed {
                path,
                line: 0,
                reason: "photolysis table is empty".into(),
            });
        }
        debug!(points = csza.len(), "photolysis table loaded");
        Ok(Self { csza, rates })
    }

    /// J-vector at the given zenith cosine. Zero or negative CSZA is night:
    /// all rates vanish.
    #[must_use]
    pub fn rates_at(&self, csza: f64) -> [f64; NPHOTOL] {
        if csza <= 0.0 {
            return [0.0; NPHOTOL];
        }
        let n = self.csza.len();
        if csza >= self.csza[n - 1] {
            return self.rates[n - 1];
        }
        // First grid point at or above csza.
        let hi = self.csza.partition_point(|&g| g < csza);
        if hi == 0 {
            // Below the table: scale the first row toward zero at the
            // terminator.
            let mut row = self.rates[0];
            let w = csza / self.csza[0];
            for v in &mut row {
                *v *= w;
            }
            return row;
        }
        let lo = hi - 1;
        let w = (csza - self.csza[lo]) / (self.csza[hi] - self.csza[lo]);
        let mut row = [0.0; NPHOTOL];
        for s in 0..NPHOTOL {
            row[s] = self.rates[lo][s] * (1.0 - w) + self.rates[hi][s] * w;
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_is_dark() {
        let table = PhotolysisTable::builtin();
        assert!(table.rates_at(0.0).iter().all(|&j| j == 0.0));
        assert!(table.rates_at(-0.3).iter().all(|&j| j == 0.0));
    }

    #[test]
    fn rates_increase_toward_noon() {
        let table = PhotolysisTable::builtin();
        let low = table.rates_at(0.2);
        let high = table.rates_at(0.9);
        for s in 0..NPHOTOL {
            assert!(high[s] > low[s], "slot {s}");
        }
    }

    #[test]
    fn interpolation_is_exact_on_grid_points() {
        let table = PhotolysisTable::builtin();
        let mu = table.csza[7];
        let row = table.rates_at(mu);
        for s in 0..NPHOTOL {
            assert!((row[s] - table.rates[7][s]).abs() < 1e-18);
        }
    }

    #[test]
    fn no2_photolysis_has_the_expected_magnitude() {
        let table = PhotolysisTable::builtin();
        let j = table.rates_at(1.0)[jind::NO2];
        assert!(j > 5e-3 && j < 2e-2, "J(NO2) = {j}");
    }
}
