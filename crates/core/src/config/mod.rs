//! Run configuration: the seven-section menu file and the parameter sweep.

mod menu;
mod sweep;

pub use menu::{MenuFile, ParamRange};
pub use sweep::{expand_sweep, CaseInput};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::met::MetConfig;

/// SIMULATION menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationMenu {
    pub output_folder: PathBuf,
    /// Empty selects the built-in climatological background.
    pub background_file: Option<PathBuf>,
    /// Optional `NAME INDEX` override of the species ordering; it must
    /// agree with the built-in table.
    pub species_file: Option<PathBuf>,
    pub parameter_sweep: bool,
    pub monte_carlo: bool,
    pub n_monte_carlo: usize,
    /// Output file stem, e.g. `APCEMM_Case_`.
    pub case_stem: String,
}

/// TRANSPORT menu, including the grid the fields live on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportMenu {
    pub enabled: bool,
    pub fill: bool,
    pub fill_value: f64,
    pub timestep_s: f64,
    pub nx: usize,
    pub ny: usize,
    pub x_extent_m: f64,
    pub y_extent_m: f64,
    /// Ambient horizontal diffusion [m^2/s].
    pub d_x: f64,
    /// Ambient vertical diffusion [m^2/s].
    pub d_y: f64,
    /// Imposed updraft [m/s], used when the AEROSOL menu turns plume
    /// updraft on.
    pub updraft_m_s: f64,
    /// Plan-cache warm-up toggle. The FFT backend has no on-disk plan
    /// format, so the configured directory is accepted and ignored.
    pub wisdom: bool,
}

/// CHEMISTRY menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemistryMenu {
    pub enabled: bool,
    pub rings: bool,
    pub n_ring: usize,
    pub read_j_rates: bool,
    pub j_rates_dir: Option<PathBuf>,
    pub rtol: f64,
    pub atol: f64,
}

/// AEROSOL menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AerosolMenu {
    pub grav_settling: bool,
    pub coagulation: bool,
    /// Liquid coagulation cadence [s of simulated time].
    pub liq_coag_timestep_s: f64,
    /// Ice coagulation cadence [s of simulated time].
    pub ice_coag_timestep_s: f64,
    pub ice_growth: bool,
    pub plume_updraft: bool,
}

/// TIMESERIES menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeseriesMenu {
    pub save_species: bool,
    pub species_dt_s: f64,
    pub species_stem: String,
    pub save_aerosol: bool,
    pub aerosol_dt_s: f64,
    pub aerosol_stem: String,
}

/// Everything the engine needs besides the per-case scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub simulation: SimulationMenu,
    pub transport: TransportMenu,
    pub chemistry: ChemistryMenu,
    pub aerosol: AerosolMenu,
    pub met: MetConfig,
    pub timeseries: TimeseriesMenu,
}

impl SimulationConfig {
    /// Assemble the typed configuration from a parsed menu file.
    pub fn from_menu(menu: &MenuFile) -> Result<Self, ConfigError> {
        let simulation = SimulationMenu {
            output_folder: PathBuf::from(menu.get_string("OUTPUT FOLDER")?),
            background_file: {
                let s = menu.get_string("INPUT BACKGROUND CONDITIONS")?;
                if s.is_empty() || s == "-" {
                    None
                } else {
                    Some(PathBuf::from(s))
                }
            },
            species_file: menu
                .get_string("SPECIES TABLE")
                .ok()
                .filter(|s| !s.is_empty() && s.as_str() != "-")
                .map(PathBuf::from),
            parameter_sweep: menu.get_bool("PARAMETER SWEEP")?,
            monte_carlo: menu.get_bool("MONTE CARLO")?,
            n_monte_carlo: menu.get_usize("MONTE CARLO RUNS").unwrap_or(1),
            case_stem: menu
                .get_string("CASE FILE STEM")
                .unwrap_or_else(|_| "APCEMM_Case_".to_string()),
        };
        let transport = TransportMenu {
            enabled: menu.get_bool("TRANSPORT")?,
            fill: menu.get_bool("FILL NEGATIVE VALUES")?,
            fill_value: menu.get_f64("FILL WITH").unwrap_or(0.0),
            timestep_s: menu.get_f64("TRANSPORT TIMESTEP")? * 60.0,
            nx: menu.get_usize("NX").unwrap_or(64),
            ny: menu.get_usize("NY").unwrap_or(64),
            x_extent_m: menu.get_f64("X EXTENT").unwrap_or(3.2e4),
            y_extent_m: menu.get_f64("Y EXTENT").unwrap_or(1.6e3),
            d_x: menu.get_f64("HORIZONTAL DIFFUSION").unwrap_or(15.0),
            d_y: menu.get_f64("VERTICAL DIFFUSION").unwrap_or(0.15),
            updraft_m_s: menu.get_f64("UPDRAFT VELOCITY").unwrap_or(0.0),
            wisdom: menu.get_bool("FFTW WISDOM").unwrap_or(false),
        };
        let chemistry = ChemistryMenu {
            enabled: menu.get_bool("CHEMISTRY")?,
            rings: menu.get_bool("USE RING STRUCTURE")?,
            n_ring: menu.get_usize("NUMBER OF RINGS").unwrap_or(15),
            read_j_rates: menu.get_bool("READ J-RATES")?,
            j_rates_dir: menu
                .get_string("J-RATES DIRECTORY")
                .ok()
                .filter(|s| !s.is_empty() && s.as_str() != "-")
                .map(PathBuf::from),
            rtol: menu.get_f64("RELATIVE TOLERANCE").unwrap_or(1.0e-3),
            atol: menu.get_f64("ABSOLUTE TOLERANCE").unwrap_or(1.0),
        };
        let aerosol = AerosolMenu {
            grav_settling: menu.get_bool("GRAVITATIONAL SETTLING")?,
            coagulation: menu.get_bool("COAGULATION")?,
            liq_coag_timestep_s: menu.get_f64("LIQUID COAGULATION TIMESTEP").unwrap_or(60.0)
                * 60.0,
            ice_coag_timestep_s: menu.get_f64("ICE COAGULATION TIMESTEP").unwrap_or(60.0)
                * 60.0,
            ice_growth: menu.get_bool("ICE GROWTH")?,
            plume_updraft: menu.get_bool("PLUME UPDRAFT")?,
        };
        let met = MetConfig {
            lapse_rate_k_per_m: menu.get_f64("TEMPERATURE LAPSE RATE").unwrap_or(-3.0e-3),
            rh_relaxation_depth_m: menu.get_f64("HUMIDITY RELAXATION DEPTH").unwrap_or(0.0),
        };
        let timeseries = TimeseriesMenu {
            save_species: menu.get_bool("SAVE SPECIES TIMESERIES")?,
            species_dt_s: menu.get_f64("SPECIES TIMESERIES FREQUENCY").unwrap_or(60.0) * 60.0,
            species_stem: menu
                .get_string("SPECIES TIMESERIES STEM")
                .unwrap_or_else(|_| "ts_".to_string()),
            save_aerosol: menu.get_bool("SAVE AEROSOL TIMESERIES")?,
            aerosol_dt_s: menu.get_f64("AEROSOL TIMESERIES FREQUENCY").unwrap_or(60.0) * 60.0,
            aerosol_stem: menu
                .get_string("AEROSOL TIMESERIES STEM")
                .unwrap_or_else(|_| "ts_aerosol_".to_string()),
        };
        Ok(Self {
            simulation,
            transport,
            chemistry,
            aerosol,
            met,
            timeseries,
        })
    }

    /// Parse `input.mnu` inside a run directory.
    pub fn from_run_dir(dir: &Path) -> Result<Self, ConfigError> {
        let menu = MenuFile::parse(&dir.join("input.mnu"))?;
        Self::from_menu(&menu)
    }

    /// A small, fully-featured configuration for tests and examples.
    #[must_use]
    pub fn test_default() -> Self {
        Self {
            simulation: SimulationMenu {
                output_folder: PathBuf::from("out"),
                background_file: None,
                species_file: None,
                parameter_sweep: false,
                monte_carlo: false,
                n_monte_carlo: 1,
                case_stem: "APCEMM_Case_".to_string(),
            },
            transport: TransportMenu {
                enabled: true,
                fill: false,
                fill_value: 0.0,
                timestep_s: 600.0,
                nx: 32,
                ny: 32,
                x_extent_m: 3.2e4,
                y_extent_m: 1.6e3,
                d_x: 15.0,
                d_y: 0.15,
                updraft_m_s: 0.0,
                wisdom: false,
            },
            chemistry: ChemistryMenu {
                enabled: false,
                rings: false,
                n_ring: 8,
                read_j_rates: false,
                j_rates_dir: None,
                rtol: 1.0e-3,
                atol: 1.0,
            },
            aerosol: AerosolMenu {
                grav_settling: true,
                coagulation: false,
                liq_coag_timestep_s: 3600.0,
                ice_coag_timestep_s: 3600.0,
                ice_growth: false,
                plume_updraft: false,
            },
            met: MetConfig::default(),
            timeseries: TimeseriesMenu {
                save_species: false,
                species_dt_s: 3600.0,
                species_stem: "ts_".to_string(),
                save_aerosol: false,
                aerosol_dt_s: 3600.0,
                aerosol_stem: "ts_aerosol_".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
%%% SIMULATION MENU %%%
Output Folder        : out
Input Background Conditions : -
Parameter Sweep      : T
Monte Carlo          : F
Monte Carlo Runs     : 1
%%% PARAMETER SWEEP %%%
Temperature          : 215 220
Relative Humidity    : 60
Pressure             : 24000
Latitude             : 60
Longitude            : -30
Emission Day         : 81
Emission Time        : 8
%%% TRANSPORT MENU %%%
Transport            : T
Fill Negative Values : T
Fill With            : 0.0
Transport Timestep   : 10
NX                   : 32
NY                   : 32
%%% CHEMISTRY MENU %%%
Chemistry            : T
Use Ring Structure   : T
Number of Rings      : 10
Read J-Rates         : F
%%% AEROSOL MENU %%%
Gravitational Settling : T
Coagulation          : T
Liquid Coagulation Timestep : 60
Ice Coagulation Timestep : 60
Ice Growth           : T
Plume Updraft        : F
%%% METEOROLOGY MENU %%%
Temperature Lapse Rate : -0.003
%%% TIMESERIES MENU %%%
Save Species Timeseries : F
Save Aerosol Timeseries : F
";

    #[test]
    fn sample_menu_round_trips() {
        let menu = MenuFile::parse_str(Path::new("input.mnu"), SAMPLE).unwrap();
        let config = SimulationConfig::from_menu(&menu).unwrap();
        assert!(config.transport.enabled);
        assert!(config.transport.fill);
        assert_eq!(config.transport.timestep_s, 600.0);
        assert_eq!(config.transport.nx, 32);
        assert!(config.chemistry.rings);
        assert_eq!(config.chemistry.n_ring, 10);
        assert_eq!(config.aerosol.liq_coag_timestep_s, 3600.0);
        assert_eq!(config.simulation.case_stem, "APCEMM_Case_");
    }

    #[test]
    fn missing_section_entry_fails_loudly() {
        let menu = MenuFile::parse_str(Path::new("input.mnu"), "Transport : T\n").unwrap();
        assert!(SimulationConfig::from_menu(&menu).is_err());
    }
}
