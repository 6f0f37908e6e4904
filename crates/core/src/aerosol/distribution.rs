//! Single-parcel (0-D) sectional size distribution.
//!
//! Used for the early-plume parcel and for ambient bulk aerosol; the
//! gridded populations carry one 2-D field per bin instead.

use std::sync::Arc;

use super::bins::BinGrid;

/// Number densities per bin [particles/cm^3] over a shared bin grid.
#[derive(Debug, Clone)]
pub struct AerosolDistribution {
    bins: Arc<BinGrid>,
    pdf: Vec<f64>,
}

impl AerosolDistribution {
    #[must_use]
    pub fn empty(bins: Arc<BinGrid>) -> Self {
        let pdf = vec![0.0; bins.nbin()];
        Self { bins, pdf }
    }

    /// Discretise a lognormal distribution with total number `n_total`
    /// [#/cm^3], median radius `r_median` [m] and geometric standard
    /// deviation `sigma_g` onto the bins.
    #[must_use]
    pub fn lognormal(bins: Arc<BinGrid>, n_total: f64, r_median_m: f64, sigma_g: f64) -> Self {
        assert!(sigma_g > 1.0, "geometric standard deviation must exceed 1");
        let ln_sigma = sigma_g.ln();
        let mut pdf = Vec::with_capacity(bins.nbin());
        for k in 0..bins.nbin() {
            let lo = bins.edges()[k];
            let hi = bins.edges()[k + 1];
            // Integral of the lognormal over [lo, hi] via the error function
            // of the log-transformed bounds.
            let z_lo = (lo / r_median_m).ln() / (std::f64::consts::SQRT_2 * ln_sigma);
            let z_hi = (hi / r_median_m).ln() / (std::f64::consts::SQRT_2 * ln_sigma);
            let frac = 0.5 * (erf(z_hi) - erf(z_lo));
            pdf.push(n_total * frac);
        }
        Self { bins, pdf }
    }

    #[must_use]
    pub fn bins(&self) -> &Arc<BinGrid> {
        &self.bins
    }

    #[must_use]
    pub fn pdf(&self) -> &[f64] {
        &self.pdf
    }

    pub fn pdf_mut(&mut self) -> &mut [f64] {
        &mut self.pdf
    }

    /// Radius moment of order `k`: `sum_i r_i^k pdf_i`. Order 0 is the
    /// total number density.
    #[must_use]
    pub fn moment(&self, order: i32) -> f64 {
        self.bins
            .centres()
            .iter()
            .zip(&self.pdf)
            .map(|(&r, &n)| r.powi(order) * n)
            .sum()
    }

    /// Total number density [#/cm^3].
    #[must_use]
    pub fn number(&self) -> f64 {
        self.moment(0)
    }

    /// Area-weighted effective radius `M3 / M2` [m]; zero for an empty
    /// distribution.
    #[must_use]
    pub fn effective_radius(&self) -> f64 {
        let m2 = self.moment(2);
        if m2 > 0.0 {
            self.moment(3) / m2
        } else {
            0.0
        }
    }

    /// Surface area density [m^2/cm^3].
    #[must_use]
    pub fn surface_area_density(&self) -> f64 {
        4.0 * std::f64::consts::PI * self.moment(2)
    }

    /// Scale every bin by a factor, e.g. the engine-count correction.
    pub fn scale_pdf(&mut self, factor: f64) {
        for n in &mut self.pdf {
            *n *= factor;
        }
    }
}

/// Abramowitz & Stegun 7.1.26 rational approximation, |error| < 1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bins() -> Arc<BinGrid> {
        Arc::new(BinGrid::geometric(1e-9, 1e-5, 40))
    }

    #[test]
    fn lognormal_recovers_total_number() {
        let d = AerosolDistribution::lognormal(bins(), 1.0e4, 5e-8, 1.6);
        // Grid spans the distribution comfortably, so the discretised
        // number is close to the analytic total.
        assert!((d.number() - 1.0e4).abs() / 1.0e4 < 1e-3, "{}", d.number());
    }

    #[test]
    fn effective_radius_tracks_the_median() {
        let d = AerosolDistribution::lognormal(bins(), 1.0e4, 1e-7, 1.6);
        let reff = d.effective_radius();
        // For a lognormal, reff = r_median * exp(2.5 ln^2 sigma) > median.
        assert!(reff > 1e-7 && reff < 1e-6, "reff = {reff}");
    }

    #[test]
    fn scale_pdf_scales_moments_linearly() {
        let mut d = AerosolDistribution::lognormal(bins(), 1.0e4, 5e-8, 1.6);
        let m3 = d.moment(3);
        d.scale_pdf(2.0);
        assert!((d.moment(3) - 2.0 * m3).abs() / m3 < 1e-12);
    }

    #[test]
    fn erf_matches_known_values() {
        assert!((erf(0.0)).abs() < 1e-12);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
    }
}
