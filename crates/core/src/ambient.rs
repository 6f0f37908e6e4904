//! Ambient (background) state.
//!
//! The undisturbed atmosphere against which plume excess is measured: a
//! pressure-keyed vertical profile of species mixing ratios and bulk
//! aerosol properties, and the time-indexed record the driver updates as
//! the ambient chemistry evolves alongside the plume.

use std::path::Path;

use tracing::debug;

use crate::core_types::species::{ind, ind::NVAR, SpeciesTable};
use crate::errors::AmbientError;

/// Bulk aerosol properties of one background category.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkAerosol {
    /// Number density [#/cm^3].
    pub n_dens: f64,
    /// Effective radius [m].
    pub r_eff: f64,
    /// Surface area density [cm^2/cm^3].
    pub sad: f64,
}

/// The ambient state interpolated to one pressure level.
#[derive(Debug, Clone)]
pub struct AmbientSample {
    /// Mixing ratios [mol/mol] per variable species.
    pub mixing_ratio: Vec<f64>,
    /// Liquid (sulfate) background aerosol.
    pub liquid: BulkAerosol,
    /// Solid (ice/soot) background aerosol.
    pub solid: BulkAerosol,
}

impl AmbientSample {
    /// Concentrations [molecules/cm^3] at the given air density.
    #[must_use]
    pub fn concentrations(&self, airdens: f64) -> Vec<f64> {
        self.mixing_ratio.iter().map(|&x| x * airdens).collect()
    }
}

/// Pressure-keyed background profile.
#[derive(Debug, Clone)]
pub struct AmbientProfile {
    /// Pressure levels [Pa], descending (ground first).
    pressure: Vec<f64>,
    samples: Vec<AmbientSample>,
}

impl AmbientProfile {
    /// A mid-latitude upper-troposphere climatology, used when no ambient
    /// file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        let mut x = vec![0.0; NVAR];
        x[ind::NO] = 5.0e-11;
        x[ind::NO2] = 3.0e-11;
        x[ind::HNO3] = 3.0e-10;
        x[ind::N2O] = 3.2e-7;
        x[ind::O3] = 1.0e-7;
        x[ind::CO] = 1.0e-7;
        x[ind::CO2] = 4.1e-4;
        x[ind::H2O2] = 5.0e-10;
        x[ind::CH2O] = 1.0e-10;
        x[ind::SO2] = 5.0e-11;
        x[ind::SO4] = 5.0e-12;
        x[ind::HCL] = 1.0e-10;
        x[ind::HBR] = 2.0e-12;
        x[ind::PAN] = 5.0e-11;
        let sample = AmbientSample {
            mixing_ratio: x,
            liquid: BulkAerosol {
                n_dens: 50.0,
                r_eff: 8.0e-8,
                sad: 5.0e-8,
            },
            solid: BulkAerosol::default(),
        };
        // One sample per decade of the UT/LS pressure range; the mixing
        // ratios are held constant, which is adequate for a climatology.
        let pressure = vec![40000.0, 30000.0, 24000.0, 18000.0, 12000.0];
        let samples = vec![sample; pressure.len()];
        Self { pressure, samples }
    }

    /// Read a tabulated profile. The first non-comment line is a header,
    /// `PRESSURE <species names...> LA_N LA_R LA_SAD PA_N PA_R PA_SAD`;
    /// data rows follow in the same column order, pressures in Pa,
    /// mixing ratios in mol/mol.
    pub fn from_file(path: &Path, species: &SpeciesTable) -> Result<Self, AmbientError> {
        let text = std::fs::read_to_string(path).map_err(|source| AmbientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut header: Option<Vec<String>> = None;
        let mut pressure = Vec::new();
        let mut samples = Vec::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let columns: Vec<&str> = line.split_whitespace().collect();
            let Some(ref names) = header else {
                // Species names keep their case; the bookkeeping columns
                // are matched case-insensitively below.
                header = Some(columns.iter().map(|s| s.to_string()).collect());
                continue;
            };
            if columns.len() != names.len() {
                return Err(AmbientError::Malformed {
                    path: path.to_path_buf(),
                    line: lineno + 1,
                    reason: format!(
                        "expected {} columns per the header, got {}",
                        names.len(),
                        columns.len()
                    ),
                });
            }
            let parse = |idx: usize| -> Result<f64, AmbientError> {
                columns[idx].parse().map_err(|_| AmbientError::Malformed {
                    path: path.to_path_buf(),
                    line: lineno + 1,
                    reason: format!("`{}` is not a number", columns[idx]),
                })
            };
            let mut mixing_ratio = vec![0.0; NVAR];
            let mut liquid = BulkAerosol::default();
            let mut solid = BulkAerosol::default();
            let mut p = None;
            for (c, name) in names.iter().enumerate() {
                let value = parse(c)?;
                match name.to_uppercase().as_str() {
                    "PRESSURE" => p = Some(value),
                    "LA_N" => liquid.n_dens = value,
                    "LA_R" => liquid.r_eff = value,
                    "LA_SAD" => liquid.sad = value,
                    "PA_N" => solid.n_dens = value,
                    "PA_R" => solid.r_eff = value,
                    "PA_SAD" => solid.sad = value,
                    _ => {
                        if let Some(info) = species.variable(name) {
                            mixing_ratio[info.index] = value;
                        }
                        // Unknown columns are tolerated; the table may
                        // carry more species than the mechanism uses.
                    }
                }
            }
            let p = p.ok_or_else(|| AmbientError::Malformed {
                path: path.to_path_buf(),
                line: lineno + 1,
                reason: "no PRESSURE column".into(),
            })?;
            pressure.push(p);
            samples.push(AmbientSample {
                mixing_ratio,
                liquid,
                solid,
            });
        }
        if pressure.is_empty() {
            return Err(AmbientError::Empty);
        }
        debug!(levels = pressure.len(), "ambient profile loaded");
        Ok(Self { pressure, samples })
    }

    /// Sample at a pressure level; linear interpolation between the two
    /// bracketing rows, clamped at the table ends.
    #[must_use]
    pub fn sample(&self, pressure_pa: f64) -> AmbientSample {
        let n = self.pressure.len();
        if n == 1 || pressure_pa >= self.pressure[0] {
            return self.samples[0].clone();
        }
        if pressure_pa <= self.pressure[n - 1] {
            return self.samples[n - 1].clone();
        }
        let hi = self.pressure.partition_point(|&p| p > pressure_pa);
        let lo = hi - 1;
        let w = (self.pressure[lo] - pressure_pa) / (self.pressure[lo] - self.pressure[hi]);
        let a = &self.samples[lo];
        let b = &self.samples[hi];
        let mix = |x: f64, y: f64| x * (1.0 - w) + y * w;
        AmbientSample {
            mixing_ratio: a
                .mixing_ratio
                .iter()
                .zip(&b.mixing_ratio)
                .map(|(&x, &y)| mix(x, y))
                .collect(),
            liquid: BulkAerosol {
                n_dens: mix(a.liquid.n_dens, b.liquid.n_dens),
                r_eff: mix(a.liquid.r_eff, b.liquid.r_eff),
                sad: mix(a.liquid.sad, b.liquid.sad),
            },
            solid: BulkAerosol {
                n_dens: mix(a.solid.n_dens, b.solid.n_dens),
                r_eff: mix(a.solid.r_eff, b.solid.r_eff),
                sad: mix(a.solid.sad, b.solid.sad),
            },
        }
    }
}

/// Time-indexed ambient record: one concentration row per time-grid point,
/// evolved by the ambient chemistry solve, plus the zenith-cosine series.
#[derive(Debug, Clone)]
pub struct AmbientRecord {
    /// `var[s][n]` concentration of species `s` at time index `n`
    /// [molecules/cm^3].
    var: Vec<Vec<f64>>,
    /// Cosine of the solar zenith angle per time index.
    pub cos_sza: Vec<f64>,
}

impl AmbientRecord {
    /// Allocate for `n_steps + 1` grid points, seeding every index with
    /// the initial concentrations.
    #[must_use]
    pub fn new(n_points: usize, initial: &[f64]) -> Self {
        let var = initial.iter().map(|&c| vec![c; n_points]).collect();
        Self {
            var,
            cos_sza: vec![0.0; n_points],
        }
    }

    /// Concentration row at a time index.
    #[must_use]
    pub fn get(&self, n: usize) -> Vec<f64> {
        self.var.iter().map(|series| series[n]).collect()
    }

    /// Store a concentration row at a time index.
    pub fn fill_in(&mut self, var: &[f64], n: usize) {
        for (series, &c) in self.var.iter_mut().zip(var) {
            series[n] = c;
        }
    }

    /// Concentration of one species at a time index.
    #[must_use]
    pub fn species(&self, s: usize, n: usize) -> f64 {
        self.var[s][n]
    }

    #[must_use]
    pub fn n_points(&self) -> usize {
        self.cos_sza.len()
    }
}
