//! Headless front-end: load a run directory, expand the parameter sweep,
//! and run the plume engine once per case.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use plume_sim_core::config::{expand_sweep, MenuFile, SimulationConfig};
use plume_sim_core::{run_case, SimulationError, SimulationStatus};

#[derive(Parser)]
#[command(
    name = "plume-sim",
    about = "Aircraft exhaust plume chemistry and microphysics simulation"
)]
struct Cli {
    /// Run directory containing `input.mnu`.
    run_dir: PathBuf,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(status) => ExitCode::from(status.exit_code() as u8),
        Err(err) => {
            error!("{err}");
            ExitCode::from(SimulationStatus::GenericFail.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<SimulationStatus, SimulationError> {
    let menu = MenuFile::parse(&cli.run_dir.join("input.mnu"))?;
    let config = SimulationConfig::from_menu(&menu)?;

    let mut rng = rand::thread_rng();
    let cases = if config.simulation.parameter_sweep {
        expand_sweep(
            &menu,
            config.simulation.monte_carlo,
            config.simulation.n_monte_carlo,
            &mut rng,
        )?
    } else {
        let mut all = expand_sweep(&menu, false, 1, &mut rng)?;
        all.truncate(1);
        all
    };
    info!(n_cases = cases.len(), "sweep expanded");

    for case in &cases {
        info!(
            case = case.case_index,
            temperature_k = case.temperature_k,
            rh_w = case.rel_humidity_w,
            pressure_pa = case.pressure_pa,
            "running case"
        );
        match run_case(case, &config) {
            Ok(summary) => info!(
                case = case.case_index,
                steps = summary.n_steps,
                emitted_noy = summary.noy.emitted,
                transport_s = summary.transport_wall_s,
                chemistry_s = summary.chemistry_wall_s,
                "case complete"
            ),
            Err(err) => {
                error!(case = case.case_index, "{err}");
                // A chemistry or save failure aborts the whole sweep.
                return Ok(SimulationStatus::from_error(&err));
            }
        }
    }
    Ok(SimulationStatus::Success)
}
