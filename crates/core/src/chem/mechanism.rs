//! Gas-phase reaction mechanism.
//!
//! A reduced NOx-HOx-Ox-CO-CH4-SO2-halogen scheme for the upper
//! troposphere / lower stratosphere. Rate expressions follow the JPL 19-5
//! recommendation families: plain Arrhenius, pressure-falloff (Troe),
//! photolysis entries resolved through the photolysis table, heterogeneous
//! entries resolved through the per-category uptake rates, and a handful of
//! special forms that fit none of those.

use nalgebra::DMatrix;

use crate::core_types::species::{fix, ind};

/// Reference to a species in either concentration vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesRef {
    Var(usize),
    Fix(usize),
}

/// Special-form rate expressions that need more than one Arrhenius term.
#[derive(Debug, Clone, Copy)]
pub enum Special {
    /// N2O5 + M thermal decomposition: formation rate over the equilibrium
    /// constant.
    N2o5Decomposition,
    /// HNO4 + M thermal decomposition.
    Hno4Decomposition,
    /// OH + CO, pressure-dependent.
    OhCo,
    /// HO2 + HO2, with M and H2O enhancement.
    Ho2Ho2,
    /// O + O2 + M ozone formation.
    OO2M,
    /// OH + HNO3 three-term JPL form.
    OhHno3,
    /// PAN-family thermal decomposition (shared by PAN, PPN, MPN).
    PanDecomposition,
}

/// Rate law of one reaction.
#[derive(Debug, Clone, Copy)]
pub enum RateLaw {
    /// `k = a * (300/T)^b * exp(c/T)` [cm^3/s or 1/s]
    Arrhenius { a: f64, b: f64, c: f64 },
    /// JPL falloff: `k0 = k0_300 (300/T)^n M`, `kinf = kinf_300 (300/T)^m`,
    /// broadening factor 0.6.
    Troe {
        k0_300: f64,
        n: f64,
        kinf_300: f64,
        m: f64,
    },
    /// First-order photolysis; the index addresses the J-vector.
    Photolysis(usize),
    /// First-order heterogeneous loss of `species` through `channel`.
    Het { species: usize, channel: usize },
    Special(Special),
}

/// One elementary reaction. Reactant multiplicity is expressed by repeating
/// the species; products list variable species with their stoichiometric
/// yields (fixed products are dropped).
#[derive(Debug, Clone)]
pub struct Reaction {
    pub reactants: &'static [SpeciesRef],
    pub products: &'static [(usize, f64)],
    pub law: RateLaw,
}

/// The full mechanism: reaction list plus evaluation routines.
#[derive(Debug, Clone)]
pub struct Mechanism {
    reactions: Vec<Reaction>,
}

use RateLaw::{Arrhenius, Het, Photolysis, Troe};
use SpeciesRef::{Fix, Var};

/// Photolysis slot assignments. Order is the layout of the J-vector.
pub mod jind {
    pub const O3_TO_O1D: usize = 0;
    pub const O3_TO_O: usize = 1;
    pub const NO2: usize = 2;
    pub const NO3_TO_NO2: usize = 3;
    pub const NO3_TO_NO: usize = 4;
    pub const H2O2: usize = 5;
    pub const CH2O_RADICAL: usize = 6;
    pub const CH2O_MOLECULAR: usize = 7;
    pub const HNO3: usize = 8;
    pub const HNO2: usize = 9;
    pub const HNO4: usize = 10;
    pub const N2O5: usize = 11;
    pub const CL2: usize = 12;
    pub const HOCL: usize = 13;
    pub const CLNO3: usize = 14;
    pub const HOBR: usize = 15;
    pub const BRNO3: usize = 16;
    pub const CL2O2: usize = 17;
    pub const CH3OOH: usize = 18;

    /// Length of the photolysis-rate vector.
    pub const NPHOTOL: usize = 19;
}

macro_rules! rx {
    ([$($r:expr),+] => [$(($p:expr, $y:expr)),*], $law:expr) => {
        Reaction {
            reactants: &[$($r),+],
            products: &[$(($p, $y)),*],
            law: $law,
        }
    };
}

/// Build the built-in reaction table.
#[rustfmt::skip]
fn reaction_table() -> Vec<Reaction> {
    vec![
        // --- Ox / NOx ---------------------------------------------------
        rx!([Var(ind::NO), Var(ind::O3)] => [(ind::NO2, 1.0)],
            Arrhenius { a: 3.0e-12, b: 0.0, c: -1500.0 }),
        rx!([Var(ind::NO2), Var(ind::O3)] => [(ind::NO3, 1.0)],
            Arrhenius { a: 1.2e-13, b: 0.0, c: -2450.0 }),
        rx!([Var(ind::NO2), Var(ind::O)] => [(ind::NO, 1.0)],
            Arrhenius { a: 5.1e-12, b: 0.0, c: 210.0 }),
        rx!([Var(ind::NO), Var(ind::NO3)] => [(ind::NO2, 2.0)],
            Arrhenius { a: 1.5e-11, b: 0.0, c: 170.0 }),
        rx!([Var(ind::NO2), Var(ind::NO3)] => [(ind::N2O5, 1.0)],
            Troe { k0_300: 2.4e-30, n: 3.0, kinf_300: 1.6e-12, m: -0.1 }),
        rx!([Var(ind::N2O5)] => [(ind::NO2, 1.0), (ind::NO3, 1.0)],
            RateLaw::Special(Special::N2o5Decomposition)),
        rx!([Var(ind::NO3), Var(ind::NO3)] => [(ind::NO2, 2.0)],
            Arrhenius { a: 8.5e-13, b: 0.0, c: -2450.0 }),
        rx!([Var(ind::N), Var(ind::NO)] => [(ind::O, 1.0)],
            Arrhenius { a: 2.1e-11, b: 0.0, c: 100.0 }),
        rx!([Var(ind::N), Fix(fix::O2)] => [(ind::NO, 1.0), (ind::O, 1.0)],
            Arrhenius { a: 1.5e-11, b: 0.0, c: -3600.0 }),
        rx!([Var(ind::O), Fix(fix::O2)] => [(ind::O3, 1.0)],
            RateLaw::Special(Special::OO2M)),
        rx!([Var(ind::O), Var(ind::O3)] => [],
            Arrhenius { a: 8.0e-12, b: 0.0, c: -2060.0 }),
        rx!([Var(ind::O1D), Fix(fix::N2)] => [(ind::O, 1.0)],
            Arrhenius { a: 2.15e-11, b: 0.0, c: 110.0 }),
        rx!([Var(ind::O1D), Fix(fix::O2)] => [(ind::O, 1.0)],
            Arrhenius { a: 3.3e-11, b: 0.0, c: 55.0 }),
        rx!([Var(ind::O1D), Fix(fix::H2O)] => [(ind::OH, 2.0)],
            Arrhenius { a: 1.63e-10, b: 0.0, c: 60.0 }),
        // --- HOx --------------------------------------------------------
        rx!([Var(ind::OH), Var(ind::O3)] => [(ind::HO2, 1.0)],
            Arrhenius { a: 1.7e-12, b: 0.0, c: -940.0 }),
        rx!([Var(ind::HO2), Var(ind::O3)] => [(ind::OH, 1.0)],
            Arrhenius { a: 1.0e-14, b: 0.0, c: -490.0 }),
        rx!([Var(ind::HO2), Var(ind::NO)] => [(ind::NO2, 1.0), (ind::OH, 1.0)],
            Arrhenius { a: 3.3e-12, b: 0.0, c: 270.0 }),
        rx!([Var(ind::OH), Var(ind::HO2)] => [],
            Arrhenius { a: 4.8e-11, b: 0.0, c: 250.0 }),
        rx!([Var(ind::HO2), Var(ind::HO2)] => [(ind::H2O2, 1.0)],
            RateLaw::Special(Special::Ho2Ho2)),
        rx!([Var(ind::OH), Var(ind::H2O2)] => [(ind::HO2, 1.0)],
            Arrhenius { a: 1.8e-12, b: 0.0, c: 0.0 }),
        rx!([Var(ind::OH), Var(ind::OH)] => [(ind::H2O2, 1.0)],
            Troe { k0_300: 6.9e-31, n: 1.0, kinf_300: 2.6e-11, m: 0.0 }),
        rx!([Var(ind::OH), Fix(fix::H2)] => [(ind::HO2, 1.0)],
            Arrhenius { a: 2.8e-12, b: 0.0, c: -1800.0 }),
        // --- NOx reservoirs ---------------------------------------------
        rx!([Var(ind::OH), Var(ind::NO2)] => [(ind::HNO3, 1.0)],
            Troe { k0_300: 1.8e-30, n: 3.0, kinf_300: 2.8e-11, m: 0.0 }),
        rx!([Var(ind::OH), Var(ind::NO)] => [(ind::HNO2, 1.0)],
            Troe { k0_300: 7.0e-31, n: 2.6, kinf_300: 3.6e-11, m: 0.1 }),
        rx!([Var(ind::HO2), Var(ind::NO2)] => [(ind::HNO4, 1.0)],
            Troe { k0_300: 1.9e-31, n: 3.4, kinf_300: 4.0e-12, m: 0.3 }),
        rx!([Var(ind::HNO4)] => [(ind::HO2, 1.0), (ind::NO2, 1.0)],
            RateLaw::Special(Special::Hno4Decomposition)),
        rx!([Var(ind::OH), Var(ind::HNO3)] => [(ind::NO3, 1.0)],
            RateLaw::Special(Special::OhHno3)),
        rx!([Var(ind::OH), Var(ind::HNO2)] => [(ind::NO2, 1.0)],
            Arrhenius { a: 1.8e-11, b: 0.0, c: -390.0 }),
        rx!([Var(ind::OH), Var(ind::HNO4)] => [(ind::NO2, 1.0)],
            Arrhenius { a: 1.3e-12, b: 0.0, c: 380.0 }),
        rx!([Var(ind::PAN)] => [(ind::NO2, 1.0), (ind::CH3O2, 1.0)],
            RateLaw::Special(Special::PanDecomposition)),
        rx!([Var(ind::PPN)] => [(ind::NO2, 1.0), (ind::CH3O2, 1.0)],
            RateLaw::Special(Special::PanDecomposition)),
        rx!([Var(ind::MPN)] => [(ind::NO2, 1.0), (ind::CH3O2, 1.0)],
            RateLaw::Special(Special::PanDecomposition)),
        // --- CO / CH4 oxidation -----------------------------------------
        rx!([Var(ind::OH), Var(ind::CO)] => [(ind::HO2, 1.0), (ind::CO2, 1.0)],
            RateLaw::Special(Special::OhCo)),
        rx!([Var(ind::OH), Fix(fix::CH4)] => [(ind::CH3O2, 1.0)],
            Arrhenius { a: 2.45e-12, b: 0.0, c: -1775.0 }),
        rx!([Var(ind::CH3O2), Var(ind::NO)] => [(ind::CH2O, 1.0), (ind::HO2, 1.0), (ind::NO2, 1.0)],
            Arrhenius { a: 2.8e-12, b: 0.0, c: 300.0 }),
        rx!([Var(ind::CH3O2), Var(ind::HO2)] => [(ind::CH3OOH, 1.0)],
            Arrhenius { a: 4.1e-13, b: 0.0, c: 750.0 }),
        rx!([Var(ind::OH), Var(ind::CH3OOH)] => [(ind::CH3O2, 1.0)],
            Arrhenius { a: 2.7e-12, b: 0.0, c: 200.0 }),
        rx!([Var(ind::OH), Var(ind::CH2O)] => [(ind::CO, 1.0), (ind::HO2, 1.0)],
            Arrhenius { a: 5.5e-12, b: 0.0, c: 125.0 }),
        rx!([Var(ind::NO3), Var(ind::CH2O)] => [(ind::HNO3, 1.0), (ind::CO, 1.0), (ind::HO2, 1.0)],
            Arrhenius { a: 5.5e-16, b: 0.0, c: 0.0 }),
        // --- Sulfur -----------------------------------------------------
        rx!([Var(ind::OH), Var(ind::SO2)] => [(ind::SO4, 1.0), (ind::HO2, 1.0)],
            Troe { k0_300: 3.3e-31, n: 4.3, kinf_300: 1.6e-12, m: 0.0 }),
        // --- Chlorine ---------------------------------------------------
        rx!([Var(ind::CL), Var(ind::O3)] => [(ind::CLO, 1.0)],
            Arrhenius { a: 2.3e-11, b: 0.0, c: -200.0 }),
        rx!([Var(ind::CLO), Var(ind::NO)] => [(ind::CL, 1.0), (ind::NO2, 1.0)],
            Arrhenius { a: 6.4e-12, b: 0.0, c: 290.0 }),
        rx!([Var(ind::CLO), Var(ind::NO2)] => [(ind::CLNO3, 1.0)],
            Troe { k0_300: 1.8e-31, n: 3.4, kinf_300: 1.5e-11, m: 1.9 }),
        rx!([Var(ind::CLO), Var(ind::HO2)] => [(ind::HOCL, 1.0)],
            Arrhenius { a: 2.6e-12, b: 0.0, c: 290.0 }),
        rx!([Var(ind::OH), Var(ind::HCL)] => [(ind::CL, 1.0)],
            Arrhenius { a: 1.8e-12, b: 0.0, c: -250.0 }),
        rx!([Var(ind::CL), Fix(fix::CH4)] => [(ind::HCL, 1.0), (ind::CH3O2, 1.0)],
            Arrhenius { a: 7.1e-12, b: 0.0, c: -1270.0 }),
        rx!([Var(ind::CLO), Var(ind::CLO)] => [(ind::CL2O2, 1.0)],
            Troe { k0_300: 1.9e-32, n: 3.6, kinf_300: 3.7e-12, m: 1.6 }),
        // --- Bromine ----------------------------------------------------
        rx!([Var(ind::BR), Var(ind::O3)] => [(ind::BRO, 1.0)],
            Arrhenius { a: 1.6e-11, b: 0.0, c: -780.0 }),
        rx!([Var(ind::BRO), Var(ind::NO)] => [(ind::BR, 1.0), (ind::NO2, 1.0)],
            Arrhenius { a: 8.8e-12, b: 0.0, c: 260.0 }),
        rx!([Var(ind::BRO), Var(ind::NO2)] => [(ind::BRNO3, 1.0)],
            Troe { k0_300: 5.2e-31, n: 3.2, kinf_300: 6.9e-12, m: 2.9 }),
        rx!([Var(ind::BRO), Var(ind::HO2)] => [(ind::HOBR, 1.0)],
            Arrhenius { a: 4.5e-12, b: 0.0, c: 460.0 }),
        rx!([Var(ind::OH), Var(ind::HBR)] => [(ind::BR, 1.0)],
            Arrhenius { a: 5.5e-12, b: 0.0, c: 200.0 }),
        rx!([Var(ind::BRO), Var(ind::CLO)] => [(ind::BR, 1.0), (ind::OCLO, 1.0)],
            Arrhenius { a: 9.5e-13, b: 0.0, c: 550.0 }),
        rx!([Var(ind::BRO), Var(ind::CLO)] => [(ind::BRCL, 1.0)],
            Arrhenius { a: 4.1e-13, b: 0.0, c: 290.0 }),
        // --- Photolysis -------------------------------------------------
        rx!([Var(ind::O3)] => [(ind::O1D, 1.0)], Photolysis(jind::O3_TO_O1D)),
        rx!([Var(ind::O3)] => [(ind::O, 1.0)], Photolysis(jind::O3_TO_O)),
        rx!([Var(ind::NO2)] => [(ind::NO, 1.0), (ind::O, 1.0)], Photolysis(jind::NO2)),
        rx!([Var(ind::NO3)] => [(ind::NO2, 1.0), (ind::O, 1.0)], Photolysis(jind::NO3_TO_NO2)),
        rx!([Var(ind::NO3)] => [(ind::NO, 1.0)], Photolysis(jind::NO3_TO_NO)),
        rx!([Var(ind::H2O2)] => [(ind::OH, 2.0)], Photolysis(jind::H2O2)),
        rx!([Var(ind::CH2O)] => [(ind::CO, 1.0), (ind::HO2, 2.0)], Photolysis(jind::CH2O_RADICAL)),
        rx!([Var(ind::CH2O)] => [(ind::CO, 1.0)], Photolysis(jind::CH2O_MOLECULAR)),
        rx!([Var(ind::HNO3)] => [(ind::OH, 1.0), (ind::NO2, 1.0)], Photolysis(jind::HNO3)),
        rx!([Var(ind::HNO2)] => [(ind::OH, 1.0), (ind::NO, 1.0)], Photolysis(jind::HNO2)),
        rx!([Var(ind::HNO4)] => [(ind::HO2, 1.0), (ind::NO2, 1.0)], Photolysis(jind::HNO4)),
        rx!([Var(ind::N2O5)] => [(ind::NO2, 1.0), (ind::NO3, 1.0)], Photolysis(jind::N2O5)),
        rx!([Var(ind::CL2)] => [(ind::CL, 2.0)], Photolysis(jind::CL2)),
        rx!([Var(ind::HOCL)] => [(ind::OH, 1.0), (ind::CL, 1.0)], Photolysis(jind::HOCL)),
        rx!([Var(ind::CLNO3)] => [(ind::CL, 1.0), (ind::NO3, 1.0)], Photolysis(jind::CLNO3)),
        rx!([Var(ind::HOBR)] => [(ind::OH, 1.0), (ind::BR, 1.0)], Photolysis(jind::HOBR)),
        rx!([Var(ind::BRNO3)] => [(ind::BR, 1.0), (ind::NO3, 1.0)], Photolysis(jind::BRNO3)),
        rx!([Var(ind::CL2O2)] => [(ind::CL, 2.0)], Photolysis(jind::CL2O2)),
        rx!([Var(ind::CH3OOH)] => [(ind::CH2O, 1.0), (ind::HO2, 1.0), (ind::OH, 1.0)],
            Photolysis(jind::CH3OOH)),
        // --- Heterogeneous ----------------------------------------------
        rx!([Var(ind::N2O5)] => [(ind::HNO3, 2.0)], Het { species: ind::N2O5, channel: 0 }),
        rx!([Var(ind::N2O5)] => [(ind::HNO3, 2.0)], Het { species: ind::N2O5, channel: 1 }),
        rx!([Var(ind::CLNO3)] => [(ind::HOCL, 1.0), (ind::HNO3, 1.0)],
            Het { species: ind::CLNO3, channel: 0 }),
        rx!([Var(ind::CLNO3)] => [(ind::CL2, 1.0), (ind::HNO3, 1.0)],
            Het { species: ind::CLNO3, channel: 1 }),
        rx!([Var(ind::BRNO3)] => [(ind::HOBR, 1.0), (ind::HNO3, 1.0)],
            Het { species: ind::BRNO3, channel: 0 }),
        // PSC surface reactions with HCl; first-order in the oxidant, the
        // HCl partner is debited through a negative yield.
        rx!([Var(ind::HOCL)] => [(ind::CL2, 1.0), (ind::HCL, -1.0)],
            Het { species: ind::HOCL, channel: 1 }),
        rx!([Var(ind::HOBR)] => [(ind::BRCL, 1.0), (ind::HCL, -1.0)],
            Het { species: ind::HOBR, channel: 1 }),
        rx!([Var(ind::HO2)] => [(ind::H2O2, 0.5)], Het { species: ind::HO2, channel: 0 }),
        rx!([Var(ind::NO2)] => [(ind::HNO2, 0.5), (ind::HNO3, 0.5)],
            Het { species: ind::NO2, channel: 0 }),
        rx!([Var(ind::NO3)] => [(ind::HNO3, 1.0)], Het { species: ind::NO3, channel: 0 }),
    ]
}

impl Mechanism {
    #[must_use]
    pub fn new() -> Self {
        Self {
            reactions: reaction_table(),
        }
    }

    #[must_use]
    pub fn n_react(&self) -> usize {
        self.reactions.len()
    }

    #[must_use]
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Rate of reaction `r`: `rconst[r] * prod(reactant concentrations)`.
    #[inline]
    fn rate(&self, r: usize, rconst: &[f64], var: &[f64], fixc: &[f64]) -> f64 {
        let mut rate = rconst[r];
        for &sp in self.reactions[r].reactants {
            rate *= match sp {
                Var(s) => var[s],
                Fix(s) => fixc[s],
            };
        }
        rate
    }

    /// Time derivative of the variable species, `dcdt[s]` in
    /// molecules/cm^3/s. The output slice is cleared first.
    pub fn fun(&self, rconst: &[f64], var: &[f64], fixc: &[f64], dcdt: &mut [f64]) {
        dcdt.fill(0.0);
        for r in 0..self.reactions.len() {
            let rate = self.rate(r, rconst, var, fixc);
            if rate == 0.0 {
                continue;
            }
            for &sp in self.reactions[r].reactants {
                if let Var(s) = sp {
                    dcdt[s] -= rate;
                }
            }
            for &(s, y) in self.reactions[r].products {
                dcdt[s] += y * rate;
            }
        }
    }

    /// Dense analytic Jacobian `d(dcdt)/d(var)`. The matrix is cleared
    /// first.
    pub fn jac(&self, rconst: &[f64], var: &[f64], fixc: &[f64], out: &mut DMatrix<f64>) {
        out.fill(0.0);
        for (r_idx, reaction) in self.reactions.iter().enumerate() {
            let kconst = rconst[r_idx];
            if kconst == 0.0 {
                continue;
            }
            // d(rate)/d(c_v) for each distinct variable reactant v.
            for (pos, &sp_v) in reaction.reactants.iter().enumerate() {
                let v = match sp_v {
                    Var(s) => s,
                    Fix(_) => continue,
                };
                // Product over the other reactant slots.
                let mut deriv = kconst;
                for (other, &sp) in reaction.reactants.iter().enumerate() {
                    if other == pos {
                        continue;
                    }
                    deriv *= match sp {
                        Var(s) => var[s],
                        Fix(s) => fixc[s],
                    };
                }
                for &sp in reaction.reactants {
                    if let Var(s) = sp {
                        out[(s, v)] -= deriv;
                    }
                }
                for &(s, y) in reaction.products {
                    out[(s, v)] += y * deriv;
                }
            }
        }
    }
}

impl Default for Mechanism {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::context::ChemContext;
    use crate::chem::rconst::update_rconst;
    use crate::core_types::species::ind::NVAR;

    fn fixtures() -> (Mechanism, ChemContext, Vec<f64>, Vec<f64>) {
        let mech = Mechanism::new();
        let mut ctx = ChemContext::new(&mech);
        let airdens = 7.9e18;
        update_rconst(&mech, &mut ctx, 220.0, 24000.0, airdens, 1.0e14);
        let mut var = vec![0.0; NVAR];
        var[ind::O3] = 8.0e11;
        var[ind::NO] = 1.0e9;
        var[ind::NO2] = 8.0e8;
        var[ind::CO] = 8.0e11;
        var[ind::OH] = 1.0e6;
        var[ind::HO2] = 4.0e6;
        let fixc = vec![1.0e14, 3.5e13, 1.0e13, 0.79 * airdens, 0.21 * airdens];
        (mech, ctx, var, fixc)
    }

    #[test]
    fn fun_conserves_nox_in_the_titration_pair() {
        // NO + O3 -> NO2 alone: d(NO) = -d(NO2).
        let (mech, ctx, mut var, fixc) = fixtures();
        // Isolate by removing everything except NO, O3.
        let keep = [ind::NO, ind::O3];
        for s in 0..NVAR {
            if !keep.contains(&s) {
                var[s] = 0.0;
            }
        }
        let mut dcdt = vec![0.0; NVAR];
        mech.fun(&ctx.rconst, &var, &fixc, &mut dcdt);
        assert!(dcdt[ind::NO] < 0.0);
        assert!((dcdt[ind::NO] + dcdt[ind::NO2]).abs() < 1e-9 * dcdt[ind::NO].abs());
        assert!((dcdt[ind::NO] - dcdt[ind::O3]).abs() < 1e-9 * dcdt[ind::NO].abs());
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let (mech, ctx, var, fixc) = fixtures();
        let n = NVAR;
        let mut jac = DMatrix::zeros(n, n);
        mech.jac(&ctx.rconst, &var, &fixc, &mut jac);
        let mut f0 = vec![0.0; n];
        mech.fun(&ctx.rconst, &var, &fixc, &mut f0);
        for &v in &[ind::NO, ind::O3, ind::OH, ind::HO2] {
            let h = (var[v].abs() * 1e-6).max(1.0);
            let mut pert = var.clone();
            pert[v] += h;
            let mut f1 = vec![0.0; n];
            mech.fun(&ctx.rconst, &pert, &fixc, &mut f1);
            for s in 0..n {
                let fd = (f1[s] - f0[s]) / h;
                let an = jac[(s, v)];
                // The floor absorbs finite-difference cancellation noise on
                // entries that are analytically zero.
                let scale = an.abs().max(fd.abs()).max(1e-8);
                assert!(
                    (fd - an).abs() / scale < 1e-3,
                    "J[{s}][{v}]: analytic {an}, finite-difference {fd}"
                );
            }
        }
    }

    #[test]
    fn every_photolysis_slot_is_used() {
        let mech = Mechanism::new();
        let mut used = vec![false; jind::NPHOTOL];
        for r in mech.reactions() {
            if let RateLaw::Photolysis(j) = r.law {
                used[j] = true;
            }
        }
        assert!(used.iter().all(|&u| u), "unused photolysis slot");
    }
}
