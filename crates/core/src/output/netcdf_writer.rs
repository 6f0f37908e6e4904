//! NetCDF output backend, behind the `netcdf` feature.

use std::path::Path;

use crate::errors::OutputError;

use super::{CaseRecord, MicrophysicsRecord};

fn nc_err(path: &Path, e: netcdf::Error) -> OutputError {
    OutputError::Encode(format!("{}: {e}", path.display()))
}

pub fn write_case(path: &Path, record: &CaseRecord) -> Result<(), OutputError> {
    let mut file = netcdf::create(path).map_err(|e| nc_err(path, e))?;
    file.add_dimension("x", record.nx).map_err(|e| nc_err(path, e))?;
    file.add_dimension("y", record.ny).map_err(|e| nc_err(path, e))?;
    file.add_dimension("time", record.time_s.len())
        .map_err(|e| nc_err(path, e))?;
    file.add_dimension("step", record.emitted_noy.len())
        .map_err(|e| nc_err(path, e))?;

    let mut x = file
        .add_variable::<f64>("x", &["x"])
        .map_err(|e| nc_err(path, e))?;
    x.put_values(&record.x_centres_m, ..).map_err(|e| nc_err(path, e))?;
    let mut y = file
        .add_variable::<f64>("y", &["y"])
        .map_err(|e| nc_err(path, e))?;
    y.put_values(&record.y_centres_m, ..).map_err(|e| nc_err(path, e))?;
    let mut time = file
        .add_variable::<f64>("time", &["time"])
        .map_err(|e| nc_err(path, e))?;
    time.put_values(&record.time_s, ..).map_err(|e| nc_err(path, e))?;
    let mut csza = file
        .add_variable::<f64>("cos_sza", &["time"])
        .map_err(|e| nc_err(path, e))?;
    csza.put_values(&record.cos_sza, ..).map_err(|e| nc_err(path, e))?;
    let mut noy = file
        .add_variable::<f64>("emitted_noy", &["step"])
        .map_err(|e| nc_err(path, e))?;
    noy.put_values(&record.emitted_noy, ..)
        .map_err(|e| nc_err(path, e))?;
    let mut co2 = file
        .add_variable::<f64>("emitted_co2", &["step"])
        .map_err(|e| nc_err(path, e))?;
    co2.put_values(&record.emitted_co2, ..)
        .map_err(|e| nc_err(path, e))?;

    for (name, field) in record.species_names.iter().zip(&record.species) {
        let mut var = file
            .add_variable::<f64>(name, &["y", "x"])
            .map_err(|e| nc_err(path, e))?;
        var.put_values(field, ..).map_err(|e| nc_err(path, e))?;
    }
    Ok(())
}

pub fn write_microphysics(path: &Path, record: &MicrophysicsRecord) -> Result<(), OutputError> {
    let mut file = netcdf::create(path).map_err(|e| nc_err(path, e))?;
    let n_cells = record.pdf.first().and_then(|t| t.first()).map_or(0, Vec::len);
    file.add_dimension("time", record.time_s.len())
        .map_err(|e| nc_err(path, e))?;
    file.add_dimension("bin", record.bin_centres_m.len())
        .map_err(|e| nc_err(path, e))?;
    file.add_dimension("cell", n_cells).map_err(|e| nc_err(path, e))?;

    let mut time = file
        .add_variable::<f64>("time", &["time"])
        .map_err(|e| nc_err(path, e))?;
    time.put_values(&record.time_s, ..).map_err(|e| nc_err(path, e))?;
    let mut bins = file
        .add_variable::<f64>("bin_centre", &["bin"])
        .map_err(|e| nc_err(path, e))?;
    bins.put_values(&record.bin_centres_m, ..)
        .map_err(|e| nc_err(path, e))?;

    let flat: Vec<f64> = record
        .pdf
        .iter()
        .flat_map(|t| t.iter().flat_map(|b| b.iter().copied()))
        .collect();
    let mut pdf = file
        .add_variable::<f64>("pdf", &["time", "bin", "cell"])
        .map_err(|e| nc_err(path, e))?;
    pdf.put_values(&flat, ..).map_err(|e| nc_err(path, e))?;
    Ok(())
}
