//! Adaptive Rosenbrock integrator for the chemistry.
//!
//! Two-stage L-stable Rosenbrock scheme (Verwer et al. 1999) with the
//! analytic mechanism Jacobian, embedded first-order error estimate, and
//! step-size control. One call advances a cell's variable-species vector
//! over one transport step; failure to reach the end within the step-size
//! floor is the fatal chemistry error the driver aborts on.

use nalgebra::{DMatrix, DVector};

use crate::core_types::species::ind::NVAR;

use super::context::ChemContext;
use super::mechanism::Mechanism;

/// L-stability root of the two-stage scheme: 1 + 1/sqrt(2).
const GAMMA: f64 = 1.707_106_781_186_547_5;

/// Step-size controller limits.
const SHRINK_LIMIT: f64 = 0.2;
const GROW_LIMIT: f64 = 5.0;
const SAFETY: f64 = 0.9;

/// Smallest step as a fraction of the requested interval before the solve
/// is declared failed.
const H_MIN_FRAC: f64 = 1.0e-8;

/// Outcome bookkeeping for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrationStats {
    pub steps: usize,
    pub rejected: usize,
}

/// Advance `var` by `dt` seconds. `rtol`/`atol` are the relative and
/// absolute tolerances on every species. On failure returns a description;
/// the caller owns the forensics dump.
pub fn integrate(
    mech: &Mechanism,
    ctx: &ChemContext,
    var: &mut [f64],
    fixc: &[f64],
    dt: f64,
    rtol: f64,
    atol: f64,
) -> Result<IntegrationStats, String> {
    debug_assert_eq!(var.len(), NVAR);
    let n = NVAR;
    let h_min = dt * H_MIN_FRAC;

    let mut y = DVector::from_column_slice(var);
    let mut t = 0.0_f64;
    let mut h = (dt / 20.0).max(h_min);
    let mut stats = IntegrationStats::default();

    let mut f0 = vec![0.0; n];
    let mut f1 = vec![0.0; n];
    let mut jac = DMatrix::zeros(n, n);

    while t < dt {
        if h < h_min {
            return Err(format!(
                "step size {h:.3e} s below minimum {h_min:.3e} s at t + {t:.3} s"
            ));
        }
        h = h.min(dt - t);

        mech.fun(&ctx.rconst, y.as_slice(), fixc, &mut f0);
        mech.jac(&ctx.rconst, y.as_slice(), fixc, &mut jac);

        // System matrix (I - gamma h J), shared by both stages.
        let mut a = &jac * (-GAMMA * h);
        for d in 0..n {
            a[(d, d)] += 1.0;
        }
        let lu = a.lu();

        // Stage 1: (I - gamma h J) k1 = f(y).
        let k1 = match lu.solve(&DVector::from_column_slice(&f0)) {
            Some(k) => k,
            None => return Err("singular stage matrix in Rosenbrock solve".into()),
        };

        // Stage 2: (I - gamma h J) k2 = f(y + h k1) - 2 k1.
        let y1 = &y + &k1 * h;
        mech.fun(&ctx.rconst, y1.as_slice(), fixc, &mut f1);
        let rhs2 = DVector::from_column_slice(&f1) - &k1 * 2.0;
        let k2 = match lu.solve(&rhs2) {
            Some(k) => k,
            None => return Err("singular stage matrix in Rosenbrock solve".into()),
        };

        // Second-order solution and first-order error estimate.
        let y_new = &y + (&k1 * 1.5 + &k2 * 0.5) * h;
        let err_vec = (&k1 * 0.5 + &k2 * 0.5) * h;

        let mut err_norm = 0.0;
        for s in 0..n {
            let scale = atol + rtol * y[s].abs().max(y_new[s].abs());
            let e = err_vec[s] / scale;
            err_norm += e * e;
        }
        err_norm = (err_norm / n as f64).sqrt();

        if err_norm <= 1.0 {
            t += h;
            y = y_new;
            // The scheme is not positivity-preserving; clip the roundoff
            // undershoots so the next Jacobian stays physical.
            for s in 0..n {
                if y[s] < 0.0 {
                    y[s] = 0.0;
                }
            }
            stats.steps += 1;
        } else {
            stats.rejected += 1;
        }

        let factor = (SAFETY * err_norm.max(1e-10).powf(-0.5))
            .clamp(SHRINK_LIMIT, GROW_LIMIT);
        h *= factor;
    }

    var.copy_from_slice(y.as_slice());
    Ok(stats)
}
