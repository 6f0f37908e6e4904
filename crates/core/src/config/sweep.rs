//! Parameter-sweep expansion.
//!
//! A sweep is the cartesian product of the PARAMETER SWEEP menu ranges,
//! materialised up front; the core is then invoked once per case. In
//! Monte-Carlo mode each case draws every parameter uniformly from its
//! bounds instead.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

use super::menu::{MenuFile, ParamRange};

/// Scalar inputs of one simulation case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseInput {
    /// Position in the expanded sweep, used for output file naming.
    pub case_index: usize,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub rel_humidity_w: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub day_of_year: u32,
    /// Local emission hour [0, 24).
    pub emission_hour: f64,
    /// Simulation length [h].
    pub duration_h: f64,
    /// SO2 to SO4 conversion efficiency in the engine and early plume.
    pub so2_to_so4: f64,
}

impl CaseInput {
    /// Reference case used by tests: cruise conditions at 60 N.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            case_index: 0,
            temperature_k: 220.0,
            pressure_pa: 24000.0,
            rel_humidity_w: 60.0,
            latitude_deg: 60.0,
            longitude_deg: -30.0,
            day_of_year: 81,
            emission_hour: 8.0,
            duration_h: 24.0,
            so2_to_so4: 0.02,
        }
    }
}

/// The swept parameters in menu order.
const SWEEP_LABELS: [&str; 7] = [
    "TEMPERATURE",
    "RELATIVE HUMIDITY",
    "PRESSURE",
    "LATITUDE",
    "LONGITUDE",
    "EMISSION DAY",
    "EMISSION TIME",
];

/// Expand the PARAMETER SWEEP menu into concrete cases.
pub fn expand_sweep(
    menu: &MenuFile,
    monte_carlo: bool,
    n_monte_carlo: usize,
    rng: &mut impl Rng,
) -> Result<Vec<CaseInput>, ConfigError> {
    let ranges: Vec<ParamRange> = SWEEP_LABELS
        .iter()
        .map(|label| menu.get_range(label, monte_carlo))
        .collect::<Result<_, _>>()?;
    let duration_h = menu.get_f64("SIMULATION TIME").unwrap_or(24.0);
    let so2_to_so4 = menu.get_f64("SO2 TO SO4 CONVERSION").unwrap_or(0.02);

    let case_from = |values: &[f64]| CaseInput {
        case_index: 0,
        temperature_k: values[0],
        rel_humidity_w: values[1],
        pressure_pa: values[2],
        latitude_deg: values[3],
        longitude_deg: values[4],
        day_of_year: values[5].round().max(1.0) as u32,
        emission_hour: values[6].rem_euclid(24.0),
        duration_h,
        so2_to_so4,
    };

    if monte_carlo {
        let cases = (0..n_monte_carlo.max(1))
            .map(|k| {
                let draw: Vec<f64> = ranges
                    .iter()
                    .map(|r| match r {
                        ParamRange::Bounds { min, max } => {
                            if max > min {
                                rng.gen_range(*min..=*max)
                            } else {
                                *min
                            }
                        }
                        ParamRange::List(v) => v[0],
                    })
                    .collect();
                let mut case = case_from(&draw);
                case.case_index = k;
                case
            })
            .collect();
        return Ok(cases);
    }

    // Cartesian product, first label slowest, materialised up front.
    let lists: Vec<&[f64]> = ranges
        .iter()
        .map(|r| r.list().expect("deterministic sweep has lists"))
        .collect();
    let total: usize = lists.iter().map(|l| l.len()).product();
    let mut cases = Vec::with_capacity(total);
    let mut idx = vec![0usize; lists.len()];
    for case_index in 0..total {
        let values: Vec<f64> = lists.iter().zip(&idx).map(|(l, &i)| l[i]).collect();
        let mut case = case_from(&values);
        case.case_index = case_index;
        cases.push(case);
        for k in (0..idx.len()).rev() {
            idx[k] += 1;
            if idx[k] < lists[k].len() {
                break;
            }
            idx[k] = 0;
        }
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::Path;

    const SWEEP: &str = "\
Temperature       : 210 220
Relative Humidity : 40 60 80
Pressure          : 24000
Latitude          : 60
Longitude         : -30
Emission Day      : 81
Emission Time     : 8
Simulation Time   : 24
";

    #[test]
    fn cartesian_product_has_full_coverage() {
        let menu = MenuFile::parse_str(Path::new("input.mnu"), SWEEP).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let cases = expand_sweep(&menu, false, 1, &mut rng).unwrap();
        assert_eq!(cases.len(), 6);
        let pairs: Vec<(f64, f64)> = cases
            .iter()
            .map(|c| (c.temperature_k, c.rel_humidity_w))
            .collect();
        assert!(pairs.contains(&(210.0, 40.0)));
        assert!(pairs.contains(&(220.0, 80.0)));
        // All distinct.
        for (a, pair) in pairs.iter().enumerate() {
            assert!(!pairs[a + 1..].contains(pair));
        }
    }

    #[test]
    fn monte_carlo_draws_inside_bounds() {
        let mc = "\
Temperature       : 205 225
Relative Humidity : 30:90
Pressure          : 24000
Latitude          : 60
Longitude         : -30
Emission Day      : 81
Emission Time     : 8
";
        let menu = MenuFile::parse_str(Path::new("input.mnu"), mc).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let cases = expand_sweep(&menu, true, 20, &mut rng).unwrap();
        assert_eq!(cases.len(), 20);
        for c in &cases {
            assert!((205.0..=225.0).contains(&c.temperature_k));
            assert!((30.0..=90.0).contains(&c.rel_humidity_w));
            assert_eq!(c.pressure_pa, 24000.0);
        }
    }
}
