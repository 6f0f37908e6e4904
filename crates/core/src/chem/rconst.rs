//! Rate-constant evaluation.
//!
//! `update_rconst` clears the context's RCONST vector and re-evaluates every
//! entry from the current (T, P, air density, H2O); it is a pure function of
//! its inputs plus the photolysis and heterogeneous tables already stored in
//! the context.

use super::context::ChemContext;
use super::mechanism::{Mechanism, RateLaw, Special};

/// JPL falloff expression with broadening factor 0.6.
fn troe(k0_300: f64, n: f64, kinf_300: f64, m: f64, t: f64, airdens: f64) -> f64 {
    let k0 = k0_300 * (300.0 / t).powf(n) * airdens;
    let kinf = kinf_300 * (300.0 / t).powf(m);
    let ratio = k0 / kinf;
    let log_ratio = ratio.log10();
    (k0 / (1.0 + ratio)) * 0.6_f64.powf(1.0 / (1.0 + log_ratio * log_ratio))
}

fn special(
    form: Special,
    t: f64,
    pressure_pa: f64,
    airdens: f64,
    h2o: f64,
) -> f64 {
    match form {
        Special::N2o5Decomposition => {
            // Formation falloff divided by the equilibrium constant.
            let kf = troe(2.4e-30, 3.0, 1.6e-12, -0.1, t, airdens);
            let keq = 2.7e-27 * (11000.0 / t).exp();
            kf / keq
        }
        Special::Hno4Decomposition => {
            let kf = troe(1.9e-31, 3.4, 4.0e-12, 0.3, t, airdens);
            let keq = 2.1e-27 * (10900.0 / t).exp();
            kf / keq
        }
        Special::OhCo => {
            // JPL pressure-dependent form, P in atmospheres.
            let p_atm = pressure_pa / 101_325.0;
            1.5e-13 * (1.0 + 0.6 * p_atm)
        }
        Special::Ho2Ho2 => {
            // Bimolecular plus termolecular term, enhanced by water vapour.
            let k = 3.0e-13 * (460.0 / t).exp() + 2.1e-33 * airdens * (920.0 / t).exp();
            let enh = 1.0 + 1.4e-21 * h2o * (2200.0 / t).exp();
            k * enh
        }
        Special::OO2M => 6.0e-34 * (300.0 / t).powf(2.4) * airdens,
        Special::OhHno3 => {
            // Three-term JPL expression.
            let k0 = 2.4e-14 * (460.0 / t).exp();
            let k2 = 2.7e-17 * (2199.0 / t).exp();
            let k3m = 6.5e-34 * (1335.0 / t).exp() * airdens;
            k0 + k3m / (1.0 + k3m / k2)
        }
        Special::PanDecomposition => 2.52e16 * (-13573.0 / t).exp(),
    }
}

/// Re-evaluate all rate constants in place.
pub fn update_rconst(
    mech: &Mechanism,
    ctx: &mut ChemContext,
    temperature_k: f64,
    pressure_pa: f64,
    airdens: f64,
    h2o: f64,
) {
    ctx.rconst.fill(0.0);
    for (r, reaction) in mech.reactions().iter().enumerate() {
        ctx.rconst[r] = match reaction.law {
            RateLaw::Arrhenius { a, b, c } => {
                a * (300.0 / temperature_k).powf(b) * (c / temperature_k).exp()
            }
            RateLaw::Troe {
                k0_300,
                n,
                kinf_300,
                m,
            } => troe(k0_300, n, kinf_300, m, temperature_k, airdens),
            RateLaw::Photolysis(j) => ctx.photol[j],
            RateLaw::Het { species, channel } => ctx.het[species][channel],
            RateLaw::Special(form) => {
                special(form, temperature_k, pressure_pa, airdens, h2o)
            }
        };
    }
}
