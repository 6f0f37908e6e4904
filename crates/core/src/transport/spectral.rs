//! Spectral advection–diffusion solver.
//!
//! Solves one explicit-coefficient step of
//! `dc/dt + v . grad c = div(D grad c)` on the doubly-periodic image of the
//! mesh by a Fourier split-step: forward 2-D FFT, multiply every mode by the
//! exact constant-coefficient propagator
//! `exp(-(Dx kx^2 + Dy ky^2) dt) * exp(-i (vx kx + vy ky) dt)`,
//! inverse FFT. The zero mode is untouched by the propagator, so total mass
//! is preserved to rounding when negative refill is off.

use std::sync::{Arc, OnceLock};

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use tracing::debug;

use crate::grid::{Mesh, ScalarField};

/// FFT plans and wavenumbers for one mesh shape. Built on the first solve
/// and reused until the solver is dropped.
struct Plan {
    fwd_x: Arc<dyn Fft<f64>>,
    inv_x: Arc<dyn Fft<f64>>,
    fwd_y: Arc<dyn Fft<f64>>,
    inv_y: Arc<dyn Fft<f64>>,
    /// Angular wavenumbers along x [rad/m], FFT ordering.
    kx: Vec<f64>,
    /// Angular wavenumbers along y [rad/m], FFT ordering.
    ky: Vec<f64>,
}

impl Plan {
    fn build(nx: usize, ny: usize, dx: f64, dy: f64) -> Self {
        let mut planner = FftPlanner::new();
        let fwd_x = planner.plan_fft_forward(nx);
        let inv_x = planner.plan_fft_inverse(nx);
        let fwd_y = planner.plan_fft_forward(ny);
        let inv_y = planner.plan_fft_inverse(ny);
        let kx = wavenumbers(nx, dx);
        let ky = wavenumbers(ny, dy);
        debug!(nx, ny, "spectral plan built");
        Self {
            fwd_x,
            inv_x,
            fwd_y,
            inv_y,
            kx,
            ky,
        }
    }
}

/// Angular wavenumbers in FFT ordering for `n` samples of spacing `d`.
fn wavenumbers(n: usize, d: f64) -> Vec<f64> {
    let length = n as f64 * d;
    (0..n)
        .map(|i| {
            let freq = if i <= n / 2 {
                i as f64
            } else {
                i as f64 - n as f64
            };
            2.0 * std::f64::consts::PI * freq / length
        })
        .collect()
}

/// Advection–diffusion stepper for scalar fields on a fixed mesh.
///
/// One instance serves many fields; the per-step coefficients are set by
/// `update_*` and an individual solve may override the advection velocity
/// (per-bin settling). Solves take `&self` so per-bin transport can fan out
/// over a worker pool.
pub struct SpectralSolver {
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    plan: OnceLock<Plan>,
    /// Refill value for negative cells, if filling is on.
    fill_with: Option<f64>,
    dt: f64,
    diff: (f64, f64),
    adv: (f64, f64),
}

impl SpectralSolver {
    /// `fill_with = Some(floor)` enables post-step negative refill.
    #[must_use]
    pub fn new(mesh: &Mesh, fill_with: Option<f64>) -> Self {
        Self {
            nx: mesh.nx(),
            ny: mesh.ny(),
            dx: mesh.dx(),
            dy: mesh.dy(),
            plan: OnceLock::new(),
            fill_with,
            dt: 0.0,
            diff: (0.0, 0.0),
            adv: (0.0, 0.0),
        }
    }

    /// Force plan construction ahead of the time loop. Stands in for FFTW
    /// wisdom: the cost of planning is paid once, here.
    pub fn warm_up(&self) {
        let _ = self.plan();
    }

    pub fn update_time_step(&mut self, dt: f64) {
        self.dt = dt;
    }

    /// Set the diffusion coefficients (Dx, Dy) [m^2/s] for this step.
    pub fn update_diffusion(&mut self, d_x: f64, d_y: f64) {
        self.diff = (d_x, d_y);
    }

    /// Set the advection velocity (vx, vy) [m/s] for this step; vy > 0 is
    /// upward.
    pub fn update_advection(&mut self, v_x: f64, v_y: f64) {
        self.adv = (v_x, v_y);
    }

    /// Advance one field by the configured step.
    pub fn solve(&self, field: &mut ScalarField) {
        self.solve_with_velocity(field, self.adv.0, self.adv.1);
    }

    /// Advance one field overriding the advection velocity, e.g. to add a
    /// bin's settling speed.
    pub fn solve_with_velocity(&self, field: &mut ScalarField, v_x: f64, v_y: f64) {
        assert_eq!(field.nx(), self.nx, "field does not match solver mesh");
        assert_eq!(field.ny(), self.ny, "field does not match solver mesh");
        let plan = self.plan();
        let (nx, ny) = (self.nx, self.ny);
        let dt = self.dt;
        let (d_x, d_y) = self.diff;

        let mut buf: Vec<Complex<f64>> = field
            .as_slice()
            .iter()
            .map(|&v| Complex::new(v, 0.0))
            .collect();
        let scratch_len = plan
            .fwd_x
            .get_inplace_scratch_len()
            .max(plan.inv_x.get_inplace_scratch_len())
            .max(plan.fwd_y.get_inplace_scratch_len())
            .max(plan.inv_y.get_inplace_scratch_len());
        let mut scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        // Forward transform: rows, then columns through a transpose.
        for row in buf.chunks_exact_mut(nx) {
            plan.fwd_x.process_with_scratch(row, &mut scratch);
        }
        let mut tbuf = transpose(&buf, nx, ny);
        for col in tbuf.chunks_exact_mut(ny) {
            plan.fwd_y.process_with_scratch(col, &mut scratch);
        }

        // Multiply by the analytic propagator. tbuf is column-major:
        // tbuf[i * ny + j] is mode (kx[i], ky[j]).
        for i in 0..nx {
            let kx = plan.kx[i];
            for j in 0..ny {
                let ky = plan.ky[j];
                let decay = (-(d_x * kx * kx + d_y * ky * ky) * dt).exp();
                let phase = -(v_x * kx + v_y * ky) * dt;
                let factor = Complex::from_polar(decay, phase);
                tbuf[i * ny + j] *= factor;
            }
        }

        // Inverse transform: columns, transpose back, rows.
        for col in tbuf.chunks_exact_mut(ny) {
            plan.inv_y.process_with_scratch(col, &mut scratch);
        }
        let mut buf = transpose(&tbuf, ny, nx);
        for row in buf.chunks_exact_mut(nx) {
            plan.inv_x.process_with_scratch(row, &mut scratch);
        }

        let norm = 1.0 / (nx * ny) as f64;
        for (dst, src) in field.as_mut_slice().iter_mut().zip(&buf) {
            *dst = src.re * norm;
        }

        if let Some(floor) = self.fill_with {
            let touched = field.fill_negatives(floor);
            if touched > 0 {
                debug!(touched, floor, "refilled negative cells after transport");
            }
        }
    }

    fn plan(&self) -> &Plan {
        self.plan
            .get_or_init(|| Plan::build(self.nx, self.ny, self.dx, self.dy))
    }
}

/// Out-of-place transpose of an `ncol x nrow` row-major matrix.
fn transpose(src: &[Complex<f64>], ncol: usize, nrow: usize) -> Vec<Complex<f64>> {
    let mut dst = vec![Complex::new(0.0, 0.0); src.len()];
    for j in 0..nrow {
        for i in 0..ncol {
            dst[i * nrow + j] = src[j * ncol + i];
        }
    }
    dst
}
