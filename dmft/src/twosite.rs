//! Two-site DMFT: the impurity problem is truncated to a single bath site
//! whose hybridisation `V` is fixed by the quasiparticle weight,
//! `V^2 = Z t^2`.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info};

use crate::convergence::{iterate, LoopControl};
use crate::ed::{anderson_two_site, diagonalize, lehmann_poles};
use crate::error::DmftError;

/// Largest `|1 + V^2 G'(0)|` for which the self-energy is taken as regular
/// at the Fermi level.
const FERMI_LIQUID_TOL: f64 = 1e-6;

/// Poles closer than this to the Fermi level make `G` singular there.
const POLE_FLOOR: f64 = 1e-12;

/// Axis on which the quasiparticle weight is read off the self-energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Real,
    Matsubara,
}

/// Solved two-site Anderson impurity at half filling.
#[derive(Debug, Clone)]
pub struct TwoSite {
    pub u_int: f64,
    pub v: f64,
    pub beta: f64,
    /// `(residue, pole)` of the impurity Green's function
    poles: Vec<(f64, f64)>,
}

impl TwoSite {
    pub fn solve(u_int: f64, v: f64, beta: f64) -> Result<Self, DmftError> {
        if beta <= 0.0 {
            return Err(DmftError::invalid("beta", format!("must be positive, got {}", beta)));
        }
        let (h, fock) = anderson_two_site(u_int, v, 0.0)?;
        let poles = lehmann_poles(&diagonalize(&h), &fock.creator(0), beta, None);
        Ok(TwoSite { u_int, v, beta, poles })
    }

    fn greens_at(&self, z: Complex64) -> Complex64 {
        self.poles.iter().map(|&(r, p)| r / (z - p)).sum()
    }

    /// Impurity Green's function at arbitrary complex frequencies.
    pub fn greens(&self, omega: &[Complex64]) -> Vec<Complex64> {
        omega.iter().map(|&z| self.greens_at(z)).collect()
    }

    /// Taylor coefficients `[c0, c1, c2, c3]` of `G(w)` around `w = 0`,
    /// `None` when a pole sits at the Fermi level.
    fn taylor(&self) -> Option<[f64; 4]> {
        let mut c = [0.0; 4];
        for &(r, p) in &self.poles {
            if p.abs() < POLE_FLOOR {
                return None;
            }
            // r / (w - p) = -sum_n r w^n / p^(n+1)
            let mut power = p;
            for cn in c.iter_mut() {
                *cn -= r / power;
                power *= p;
            }
        }
        Some(c)
    }

    fn regular(&self, c: &[f64; 4]) -> bool {
        let v2 = self.v * self.v;
        (self.v * c[0]).abs() < FERMI_LIQUID_TOL && (1.0 + v2 * c[1]).abs() < FERMI_LIQUID_TOL
    }

    /// Whether the bath screens the impurity: `G(0) = 0` and
    /// `G'(0) = -1/V^2`, so that the self-energy has no pole at `w = 0`.
    pub fn is_fermi_liquid(&self) -> bool {
        self.taylor().map_or(false, |c| self.regular(&c))
    }

    /// `Sigma(z) = z + U/2 - V^2/z - 1/G(z)`, the bath site sitting at zero
    /// energy.
    pub fn self_energy(&self, omega: &[Complex64]) -> Result<Vec<Complex64>, DmftError> {
        let v2 = self.v * self.v;
        let head = self.taylor();
        omega
            .iter()
            .map(|&z| {
                let g = self.greens_at(z);
                if g.norm() == 0.0 || z.norm() == 0.0 {
                    return Err(DmftError::SingularGreensFunction(z.re));
                }
                // z + V^2 G(z), summing the first two Taylor terms of G
                // separately: V^2/z and 1/G cancel near w = 0
                let screened = match head {
                    Some([c0, c1, ..]) => {
                        let rest: Complex64 = self.poles.iter().map(|&(r, p)| r / (p * p * (z - p))).sum();
                        v2 * c0 + z * (1.0 + v2 * c1) + z * z * v2 * rest
                    }
                    None => z + g * v2,
                };
                Ok(z + self.u_int / 2.0 - screened / (z * g))
            })
            .collect()
    }

    /// Quasiparticle weight `1 / (1 - dSigma/dw)` at the Fermi level, zero
    /// when the impurity is not a Fermi liquid.
    ///
    /// On the real axis the slope follows from the Taylor coefficients of
    /// `G`, `Sigma'(0) = 1 + c3/c1^2 - c2^2/c1^3`; on the Matsubara axis
    /// from the first frequency, `Im Sigma(i w_0) / w_0`.
    pub fn quasiparticle_weight(&self, axis: Axis) -> Result<f64, DmftError> {
        let c = match self.taylor() {
            Some(c) if self.regular(&c) => c,
            _ => return Ok(0.0),
        };
        let z = match axis {
            Axis::Real => {
                let [_, c1, c2, c3] = c;
                c1 * c1 * c1 / (c2 * c2 - c1 * c3)
            }
            Axis::Matsubara => {
                let w0 = PI / self.beta;
                let sigma = self.self_energy(&[Complex64::new(0.0, w0)])?;
                1.0 / (1.0 - sigma[0].im / w0)
            }
        };
        Ok(if z.is_finite() { z.clamp(0.0, 1.0) } else { 0.0 })
    }
}

/// Self-consistent quasiparticle weight for each interaction in
/// `u_values`, swept in order and seeded by the previous solution.
///
/// Returns `[U, Z]` rows.
pub fn dmft_loop(
    u_values: &[f64],
    axis: Axis,
    beta: f64,
    hop: f64,
    control: &LoopControl,
) -> Result<Vec<[f64; 2]>, DmftError> {
    info!(
        "Two-site DMFT on the {:?} axis: beta = {}, t = {}, {} interactions",
        axis,
        beta,
        hop,
        u_values.len()
    );
    let mut zet = 1.0_f64;
    let mut rows = Vec::with_capacity(u_values.len());
    for &u_int in u_values {
        let mut failure = None;
        let (z, report) = iterate(zet, control, |&z| {
            let v = hop * z.max(0.0).sqrt();
            match TwoSite::solve(u_int, v, beta).and_then(|site| site.quasiparticle_weight(axis)) {
                Ok(z_new) => z_new,
                Err(err) => {
                    failure.get_or_insert(err);
                    z
                }
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }
        debug!("U = {}: Z = {:.6} after {} loops", u_int, z, report.loops);
        zet = z;
        rows.push([u_int, z]);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const U_VALUES: [f64; 7] = [0.0, 1.0, 1.5, 2.0, 2.5, 2.9, 3.05];
    const Z_REF: [f64; 7] = [1.0, 0.88889, 0.75, 0.55556, 0.30556, 0.06556, 0.0];

    fn control() -> LoopControl {
        LoopControl::new(1e-10, 20_000)
    }

    #[test]
    fn test_mit_real() {
        let zet = dmft_loop(&U_VALUES, Axis::Real, 1e5, 0.5, &control()).unwrap();
        for (row, z_ref) in zet.iter().zip(Z_REF) {
            assert!((row[1] - z_ref).abs() < 3e-3, "U = {}: Z = {}", row[0], row[1]);
        }
    }

    #[test]
    fn test_mit_matsubara() {
        let zet = dmft_loop(&U_VALUES, Axis::Matsubara, 1e5, 0.5, &control()).unwrap();
        for (row, z_ref) in zet.iter().zip(Z_REF) {
            assert!((row[1] - z_ref).abs() < 1e-5, "U = {}: Z = {}", row[0], row[1]);
        }
    }

    #[test]
    fn test_closed_form_self_energy() {
        // Sigma(w) = U/2 + U^2/4 w / (w^2 - 9 V^2) for the half filled impurity
        let (u, v) = (2.0, 0.4);
        let site = TwoSite::solve(u, v, 1e5).unwrap();
        let z = [Complex64::new(0.3, 0.05), Complex64::new(0.0, 0.7)];
        let sigma = site.self_energy(&z).unwrap();
        for (s, &w) in sigma.iter().zip(&z) {
            let exact = u / 2.0 + u * u / 4.0 * w / (w * w - 9.0 * v * v);
            assert!((s - exact).norm() < 1e-8, "{} != {}", s, exact);
        }
        let zr = site.quasiparticle_weight(Axis::Real).unwrap();
        assert!((zr - 1.0 / (1.0 + u * u / (36.0 * v * v))).abs() < 1e-10);
        let zm = site.quasiparticle_weight(Axis::Matsubara).unwrap();
        assert!((zm - 1.0 / (1.0 + u * u / (36.0 * v * v))).abs() < 1e-5);
    }

    #[test]
    fn test_fixed_point_survives_many_iterations() {
        let z_star: f64 = 8.0 / 9.0;
        let mut z = z_star;
        for k in 0..500 {
            let site = TwoSite::solve(1.0, 0.5 * z.sqrt(), 1e5).unwrap();
            z = site.quasiparticle_weight(Axis::Real).unwrap();
            assert!((z - z_star).abs() < 1e-8, "iteration {}: Z = {}", k, z);
        }
    }

    #[test]
    fn test_free_impurity_has_unit_weight() {
        let site = TwoSite::solve(0.0, 0.5, 1e5).unwrap();
        assert!(site.is_fermi_liquid());
        let z = Complex64::new(0.2, 1.0);
        assert!((site.greens(&[z])[0] - z / (z * z - 0.25)).norm() < 1e-12);
        assert!((site.quasiparticle_weight(Axis::Real).unwrap() - 1.0).abs() < 1e-12);
        assert!((site.quasiparticle_weight(Axis::Matsubara).unwrap() - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_isolated_impurity_has_no_quasiparticle() {
        let site = TwoSite::solve(2.0, 0.0, 1e5).unwrap();
        assert!(!site.is_fermi_liquid());
        assert_eq!(site.quasiparticle_weight(Axis::Real).unwrap(), 0.0);
        assert_eq!(site.quasiparticle_weight(Axis::Matsubara).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_non_positive_temperature() {
        assert!(TwoSite::solve(1.0, 0.5, 0.0).is_err());
    }
}
