//! Time-grid construction: monotonicity, bounds and the sunrise/sunset
//! breakpoint contract.

use plume_sim_core::met::SolarZenith;
use plume_sim_core::simulation::time_grid::build_time_grid;

const H: f64 = 3600.0;

/// tInit = 4 h, tFinal = 20 h, sunrise 6 h, sunset 18 h; both crossings
/// must appear exactly.
#[test]
fn sunrise_and_sunset_appear_exactly() {
    let grid = build_time_grid(4.0 * H, 20.0 * H, 6.0 * H, 18.0 * H, 600.0);
    assert!(grid.contains(&(6.0 * H)), "6:00 missing from the grid");
    assert!(grid.contains(&(18.0 * H)), "18:00 missing from the grid");
}

#[test]
fn grid_is_strictly_increasing_and_bounded() {
    let grid = build_time_grid(4.0 * H, 20.0 * H, 6.0 * H, 18.0 * H, 612.0);
    assert_eq!(grid[0], 4.0 * H);
    assert_eq!(*grid.last().unwrap(), 20.0 * H);
    for pair in grid.windows(2) {
        assert!(pair[1] > pair[0], "grid not strictly increasing");
        assert!(pair[1] - pair[0] <= 612.0 + 1e-9, "step exceeds limit");
    }
}

/// The breakpoints the driver actually uses come from the solar
/// calculation; the computed sunrise/sunset land on the grid too.
#[test]
fn solar_crossings_are_grid_points() {
    let sun = SolarZenith::new(60.0, 81);
    let t0 = 8.0 * H;
    let t1 = t0 + 24.0 * H;
    let grid = build_time_grid(t0, t1, sun.sunrise_h * H, sun.sunset_h * H, 600.0);
    let on_grid = |t: f64| grid.iter().any(|&g| (g - t).abs() < 1e-6);
    assert!(on_grid(sun.sunset_h * H), "sunset not on the grid");
    // Next-day sunrise falls inside the window as well.
    assert!(
        on_grid((sun.sunrise_h + 24.0) * H),
        "next-day sunrise not on the grid"
    );
}
