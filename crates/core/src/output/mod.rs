//! Snapshot output.
//!
//! The default writer serialises the snapshot records to JSON. With the
//! `netcdf` cargo feature the same records go to NetCDF files instead,
//! keeping the conventional file stems (`APCEMM_Case_*`, `ts_aerosol_*`).
//! A write failure aborts the case; partial files are left on disk.

#[cfg(feature = "netcdf")]
mod netcdf_writer;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ambient::AmbientRecord;
use crate::config::{CaseInput, SimulationConfig};
use crate::core_types::species::{ind::NVAR, var_name};
use crate::errors::OutputError;
use crate::grid::Mesh;
use crate::simulation::state::SolutionState;

/// Final per-case record: grids, zenith series, mass-check series and the
/// final concentration fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case: CaseInput,
    pub nx: usize,
    pub ny: usize,
    pub x_centres_m: Vec<f64>,
    pub y_centres_m: Vec<f64>,
    pub time_s: Vec<f64>,
    pub cos_sza: Vec<f64>,
    pub emitted_noy: Vec<f64>,
    pub emitted_co2: Vec<f64>,
    /// `species[s]` is the flattened final field of variable species `s`.
    pub species_names: Vec<String>,
    pub species: Vec<Vec<f64>>,
    /// Final ambient concentrations per species.
    pub ambient_final: Vec<f64>,
}

/// Per-ring species time series: area-weighted mean concentrations per
/// ring at every saved time.
#[derive(Debug, Serialize, Deserialize)]
pub struct RingSeriesRecord {
    pub time_s: Vec<f64>,
    pub ring_areas_m2: Vec<f64>,
    pub species_names: Vec<String>,
    /// `mean[t][ring][species]` in molecules/cm^3.
    pub mean: Vec<Vec<Vec<f64>>>,
}

/// Sectional-aerosol time series: one flattened 2-D field per bin per
/// saved time.
#[derive(Debug, Serialize, Deserialize)]
pub struct MicrophysicsRecord {
    pub population: String,
    pub bin_centres_m: Vec<f64>,
    pub time_s: Vec<f64>,
    /// `pdf[t][bin]` flattened field.
    pub pdf: Vec<Vec<Vec<f64>>>,
}

fn write_json<T: Serialize>(path: &Path, record: &T) -> Result<(), OutputError> {
    let text = serde_json::to_string(record).map_err(|e| OutputError::Encode(e.to_string()))?;
    std::fs::write(path, text).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn output_path(config: &SimulationConfig, name: &str) -> Result<PathBuf, OutputError> {
    let dir = &config.simulation.output_folder;
    std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.clone(),
        source,
    })?;
    Ok(dir.join(name))
}

#[cfg(feature = "netcdf")]
fn extension() -> &'static str {
    "nc"
}

#[cfg(not(feature = "netcdf"))]
fn extension() -> &'static str {
    "json"
}

/// Write every end-of-run product for one case.
#[allow(clippy::too_many_arguments)]
pub fn write_case_outputs(
    config: &SimulationConfig,
    case: &CaseInput,
    mesh: &Mesh,
    state: &SolutionState,
    ambient: &AmbientRecord,
    time_grid: &[f64],
    noy_series: &[f64],
    co2_series: &[f64],
    la_snapshots: &[(f64, Vec<Vec<f64>>)],
    pa_snapshots: &[(f64, Vec<Vec<f64>>)],
    ring_series: Option<(&[f64], &[(f64, Vec<Vec<f64>>)])>,
) -> Result<(), OutputError> {
    let record = CaseRecord {
        case: case.clone(),
        nx: mesh.nx(),
        ny: mesh.ny(),
        x_centres_m: mesh.x().to_vec(),
        y_centres_m: mesh.y().to_vec(),
        time_s: time_grid.to_vec(),
        cos_sza: ambient.cos_sza.clone(),
        emitted_noy: noy_series.to_vec(),
        emitted_co2: co2_series.to_vec(),
        species_names: (0..NVAR).map(|s| var_name(s).to_string()).collect(),
        species: state
            .species
            .iter()
            .map(|f| f.as_slice().to_vec())
            .collect(),
        ambient_final: ambient.get(ambient.n_points() - 1),
    };
    let case_name = format!(
        "{}{:03}.{}",
        config.simulation.case_stem,
        case.case_index,
        extension()
    );
    let path = output_path(config, &case_name)?;
    write_record(&path, &record)?;
    info!(path = %path.display(), "case file written");

    if let Some((ring_areas, series)) = ring_series {
        if !series.is_empty() {
            let record = RingSeriesRecord {
                time_s: series.iter().map(|(t, _)| *t).collect(),
                ring_areas_m2: ring_areas.to_vec(),
                species_names: (0..NVAR).map(|s| var_name(s).to_string()).collect(),
                mean: series.iter().map(|(_, rows)| rows.clone()).collect(),
            };
            let name = format!(
                "{}{:03}.json",
                config.timeseries.species_stem, case.case_index
            );
            let path = output_path(config, &name)?;
            write_json(&path, &record)?;
            info!(path = %path.display(), "ring time series written");
        }
    }

    if config.timeseries.save_aerosol {
        for (population, snapshots, bins) in [
            ("LA", la_snapshots, state.liquid.bins()),
            ("PA", pa_snapshots, state.solid.bins()),
        ] {
            if snapshots.is_empty() {
                continue;
            }
            let micro = MicrophysicsRecord {
                population: population.to_string(),
                bin_centres_m: bins.centres().to_vec(),
                time_s: snapshots.iter().map(|(t, _)| *t).collect(),
                pdf: snapshots.iter().map(|(_, pdf)| pdf.clone()).collect(),
            };
            let name = format!(
                "{}{}_{:03}.{}",
                config.timeseries.aerosol_stem,
                population,
                case.case_index,
                extension()
            );
            let path = output_path(config, &name)?;
            write_micro_record(&path, &micro)?;
            info!(path = %path.display(), population, "aerosol time series written");
        }
    }
    Ok(())
}

#[cfg(not(feature = "netcdf"))]
fn write_record(path: &Path, record: &CaseRecord) -> Result<(), OutputError> {
    write_json(path, record)
}

#[cfg(not(feature = "netcdf"))]
fn write_micro_record(path: &Path, record: &MicrophysicsRecord) -> Result<(), OutputError> {
    write_json(path, record)
}

#[cfg(feature = "netcdf")]
fn write_record(path: &Path, record: &CaseRecord) -> Result<(), OutputError> {
    netcdf_writer::write_case(path, record)
}

#[cfg(feature = "netcdf")]
fn write_micro_record(path: &Path, record: &MicrophysicsRecord) -> Result<(), OutputError> {
    netcdf_writer::write_microphysics(path, record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_fields() {
        let record = MicrophysicsRecord {
            population: "LA".into(),
            bin_centres_m: vec![1e-9, 2e-9],
            time_s: vec![0.0, 3600.0],
            pdf: vec![vec![vec![1.0, 2.0]], vec![vec![3.0, 4.0]]],
        };
        let dir = std::env::temp_dir().join("plume_sim_output_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ts_aerosol_LA_000.json");
        write_json(&path, &record).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: MicrophysicsRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back.population, "LA");
        assert_eq!(back.pdf[1][0], vec![3.0, 4.0]);
        std::fs::remove_file(&path).ok();
    }
}
