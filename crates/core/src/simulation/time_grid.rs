//! Time-grid construction.
//!
//! The grid is strictly increasing from `t0` to `t1`, no interval exceeds
//! the transport timestep, and every sunrise and sunset crossing inside the
//! window lands exactly on a grid point so photolysis switches on a
//! breakpoint rather than mid-step.

/// Build the time grid [s]. `sunrise_s` and `sunset_s` are seconds since
/// local midnight; crossings recur every 24 h.
#[must_use]
pub fn build_time_grid(t0: f64, t1: f64, sunrise_s: f64, sunset_s: f64, dt_max: f64) -> Vec<f64> {
    assert!(t1 > t0, "empty time window");
    assert!(dt_max > 0.0, "non-positive timestep");
    let mut grid = vec![t0];
    let mut t = t0;
    // Relative tolerance for "already on the event".
    let eps = 1.0e-9 * dt_max;
    while t < t1 - eps {
        let mut dt = dt_max.min(t1 - t);
        if let Some(event) = next_event(t + eps, sunrise_s, sunset_s) {
            if event < t + dt - eps {
                dt = event - t;
            }
        }
        t += dt;
        grid.push(t);
    }
    // Snap the final point onto t1 exactly.
    *grid.last_mut().expect("grid is non-empty") = t1;
    grid
}

/// Earliest sunrise/sunset crossing at or after `t`.
fn next_event(t: f64, sunrise_s: f64, sunset_s: f64) -> Option<f64> {
    const DAY: f64 = 86400.0;
    let mut best: Option<f64> = None;
    for &base in &[sunrise_s, sunset_s] {
        let k = ((t - base) / DAY).ceil().max(0.0);
        let event = base + k * DAY;
        if best.map_or(true, |b| event < b) {
            best = Some(event);
        }
    }
    best
}

/// The interval to the next grid point, used by the driver's step loop.
#[must_use]
pub fn step_size(grid: &[f64], n: usize) -> f64 {
    grid[n + 1] - grid[n]
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f64 = 3600.0;

    #[test]
    fn grid_is_strictly_increasing_and_spans_the_window() {
        let grid = build_time_grid(4.0 * H, 20.0 * H, 6.0 * H, 18.0 * H, 600.0);
        assert_eq!(grid[0], 4.0 * H);
        assert_eq!(*grid.last().unwrap(), 20.0 * H);
        for pair in grid.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] - pair[0] <= 600.0 + 1e-6);
        }
    }

    #[test]
    fn sunrise_and_sunset_are_grid_points() {
        // Odd timestep so the events do not fall on multiples of it.
        let grid = build_time_grid(4.0 * H, 20.0 * H, 6.0 * H, 18.0 * H, 700.0);
        assert!(grid.iter().any(|&t| t == 6.0 * H), "sunrise missing");
        assert!(grid.iter().any(|&t| t == 18.0 * H), "sunset missing");
    }

    #[test]
    fn crossings_recur_on_the_next_day() {
        let grid = build_time_grid(8.0 * H, 32.0 * H, 6.0 * H, 18.0 * H, 1700.0);
        assert!(grid.iter().any(|&t| t == 18.0 * H));
        assert!(grid.iter().any(|&t| t == 30.0 * H), "next-day sunrise");
    }

    #[test]
    fn start_on_an_event_does_not_duplicate_it() {
        let grid = build_time_grid(6.0 * H, 8.0 * H, 6.0 * H, 18.0 * H, 600.0);
        assert_eq!(grid.iter().filter(|&&t| t == 6.0 * H).count(), 1);
    }
}
