//! IPT for the dimer Hubbard model on the Bethe lattice, real axis.
//!
//! The lattice problem is diagonal in the bonding basis (symmetric `s` and
//! antisymmetric `a` combinations of the two sites), while the second-order
//! diagram is local. Every iteration rotates between both bases.

use greens::helper::{antisymmetrize_odd, symmetrize_even};
use greens::{kramers_kronig, semi_circle_hiltrans, RealFrequencyGrid};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::info;

use crate::convergence::{iterate, FixedPoint, LoopControl, LoopReport};
use crate::error::DmftError;
use crate::ipt_real::sigma;

/// Broadening of the dimer Weiss fields.
pub const DIMER_ETA: f64 = 3e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimerRealParams {
    pub u_int: f64,
    /// Intra-dimer hopping
    pub tp: f64,
    pub beta: f64,
    /// Inter-dimer hopping; the lattice half-bandwidth is `2 t`
    pub hopping: f64,
    pub eta: f64,
}

impl DimerRealParams {
    pub fn new(u_int: f64, tp: f64, beta: f64) -> Self {
        DimerRealParams {
            u_int,
            tp,
            beta,
            hopping: 0.5,
            eta: DIMER_ETA,
        }
    }

    pub fn validate(&self) -> Result<(), DmftError> {
        if self.beta <= 0.0 {
            return Err(DmftError::invalid("beta", format!("must be positive, got {}", self.beta)));
        }
        if self.hopping <= 0.0 {
            return Err(DmftError::invalid(
                "hopping",
                format!("must be positive, got {}", self.hopping),
            ));
        }
        Ok(())
    }
}

/// Green's functions and self-energies in the bonding basis.
#[derive(Debug, Clone)]
pub struct DimerRealState {
    pub gss: Vec<Complex64>,
    pub gsa: Vec<Complex64>,
    pub ss: Vec<Complex64>,
    pub sa: Vec<Complex64>,
}

impl FixedPoint for DimerRealState {
    fn is_close(&self, previous: &Self, atol: f64) -> bool {
        self.gss.is_close(&previous.gss, atol) && self.gsa.is_close(&previous.gsa, atol)
    }

    fn distance(&self, previous: &Self) -> f64 {
        self.gss
            .distance(&previous.gss)
            .max(self.gsa.distance(&previous.gsa))
    }

    fn mix(&mut self, previous: &Self, mixing: f64) {
        self.gss.mix(&previous.gss, mixing);
        self.gsa.mix(&previous.gsa, mixing);
    }
}

impl DimerRealState {
    /// Local (site diagonal) spectral function.
    pub fn local_spectral(&self) -> Vec<f64> {
        self.gss
            .iter()
            .zip(&self.gsa)
            .map(|(s, a)| -0.5 * (s + a).im / PI)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct DimerRealSolution {
    pub state: DimerRealState,
    pub report: LoopReport,
}

/// Non-interacting bonding and antibonding Green's functions.
pub fn dimer_seed(grid: &RealFrequencyGrid, params: &DimerRealParams) -> (Vec<Complex64>, Vec<Complex64>) {
    let d = 2.0 * params.hopping;
    let shifted = |shift: f64| -> Vec<Complex64> {
        grid.points()
            .par_iter()
            .map(|&w| semi_circle_hiltrans(Complex64::new(w + shift, params.eta), d))
            .collect()
    };
    (shifted(-params.tp), shifted(params.tp))
}

/// One iteration of the dimer loop.
///
/// The local spectral functions of the Weiss field are cleaned for
/// particle-hole symmetry at half filling (diagonal even, off-diagonal
/// odd in `w`) before the diagrams are evaluated.
pub fn dimer_solver(
    grid: &RealFrequencyGrid,
    nfp: &[f64],
    gss: &[Complex64],
    gsa: &[Complex64],
    params: &DimerRealParams,
) -> DimerRealState {
    let w = grid.points();
    let dw = grid.dw();
    let t2 = params.hopping * params.hopping;
    let eta = Complex64::new(0.0, params.eta);

    let (g0ss, g0sa): (Vec<Complex64>, Vec<Complex64>) = w
        .par_iter()
        .zip(gss.par_iter().zip(gsa))
        .map(|(&x, (&s, &a))| {
            (
                (x + eta - params.tp - s * t2).inv(),
                (x + eta + params.tp - a * t2).inv(),
            )
        })
        .unzip();

    let a0d: Vec<f64> = g0ss
        .iter()
        .zip(&g0sa)
        .map(|(s, a)| -0.5 * (s + a).im / PI)
        .collect();
    let a0o: Vec<f64> = g0ss
        .iter()
        .zip(&g0sa)
        .map(|(s, a)| -0.5 * (s - a).im / PI)
        .collect();
    let a0d = symmetrize_even(&a0d);
    let a0o = antisymmetrize_odd(&a0o);

    let (isd, iso) = rayon::join(
        || sigma(&a0d, nfp, params.u_int),
        || sigma(&a0o, nfp, params.u_int),
    );
    let iss: Vec<f64> = isd.iter().zip(&iso).map(|(d, o)| (d + o) * dw * dw).collect();
    let isa: Vec<f64> = isd.iter().zip(&iso).map(|(d, o)| (d - o) * dw * dw).collect();

    let (rss, rsa) = rayon::join(|| kramers_kronig(&iss), || kramers_kronig(&isa));
    let retarded = |re: &[f64], im: &[f64]| -> Vec<Complex64> {
        re.iter()
            .zip(im)
            .map(|(&r, &i)| Complex64::new(r, -i.abs()))
            .collect()
    };
    let ss = retarded(&rss, &iss);
    let sa = retarded(&rsa, &isa);

    let d = 2.0 * params.hopping;
    let lattice = |shift: f64, sig: &[Complex64]| -> Vec<Complex64> {
        w.par_iter()
            .zip(sig)
            .map(|(&x, &s)| semi_circle_hiltrans(Complex64::new(x + shift, 0.0) - s, d))
            .collect()
    };
    let gss = lattice(-params.tp, &ss);
    let gsa = lattice(params.tp, &sa);

    DimerRealState { gss, gsa, ss, sa }
}

/// Self-consistent dimer solution starting from `gss`, `gsa`.
pub fn dimer_dmft(
    grid: &RealFrequencyGrid,
    gss: Vec<Complex64>,
    gsa: Vec<Complex64>,
    params: &DimerRealParams,
    control: &LoopControl,
) -> Result<DimerRealSolution, DmftError> {
    params.validate()?;
    for seed in [&gss, &gsa] {
        if seed.len() != grid.len() {
            return Err(greens::GreensError::LengthMismatch {
                expected: grid.len(),
                got: seed.len(),
            }
            .into());
        }
    }
    info!(
        "Real axis dimer IPT: U = {}, tp = {}, beta = {}",
        params.u_int, params.tp, params.beta
    );

    let nfp = grid.fermi(params.beta);
    let zeros = vec![Complex64::new(0.0, 0.0); grid.len()];
    let seed = DimerRealState {
        gss,
        gsa,
        ss: zeros.clone(),
        sa: zeros,
    };
    let (state, report) = iterate(seed, control, |state| {
        dimer_solver(grid, &nfp, &state.gss, &state.gsa, params)
    });
    Ok(DimerRealSolution { state, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use greens::bethe_dos;

    fn solve(u_int: f64) -> (RealFrequencyGrid, DimerRealSolution) {
        let grid = RealFrequencyGrid::symmetric(4.0, 1025).unwrap();
        let params = DimerRealParams::new(u_int, 0.3, 100.0);
        let (gss, gsa) = dimer_seed(&grid, &params);
        let solution = dimer_dmft(&grid, gss, gsa, &params, &LoopControl::new(1e-4, 300)).unwrap();
        (grid, solution)
    }

    #[test]
    fn test_free_dimer_splits_the_band() {
        let (grid, solution) = solve(0.0);
        assert!(solution.report.converged);
        let ad = solution.state.local_spectral();
        let c = grid.center();
        assert_relative_eq!(ad[c], bethe_dos(0.3, 1.0), epsilon = 1e-6);
        assert_relative_eq!(grid.integrate(&ad), 1.0, epsilon = 1e-3);
        // the symmetric band is centred at w = tp, its upper edge sits at tp + 2t
        let gss = &solution.state.gss;
        let edge = grid.points().iter().position(|&w| w >= 1.3 - 1e-9).unwrap();
        assert!(-gss[edge - 3].im > 0.0);
        assert!(gss[edge + 3].im.abs() < 1e-12);
    }

    #[test]
    fn test_weak_coupling_metal() {
        let (grid, solution) = solve(1.0);
        assert!(solution.report.converged);
        let c = grid.center();
        let ad = solution.state.local_spectral();
        assert_relative_eq!(ad[c], 0.6057, epsilon = 5e-3);
        assert_relative_eq!(grid.integrate(&ad), 1.0, epsilon = 1e-2);

        let ss = &solution.state.ss;
        assert!(ss.iter().all(|s| s.im <= 0.0));
        assert!(ss[c].im.abs() < 5e-3);
    }

    #[test]
    fn test_particle_hole_relates_bonding_and_antibonding() {
        let (grid, solution) = solve(1.0);
        let DimerRealState { gss, gsa, .. } = &solution.state;
        for i in 0..grid.len() {
            let mirrored = -gss[grid.mirror(i)].conj();
            assert!((gsa[i] - mirrored).norm() < 1e-8, "w = {}", grid.points()[i]);
        }
    }
}
