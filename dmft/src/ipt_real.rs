//! Iterative perturbation theory for the single band Hubbard model on the
//! real-frequency axis.
//!
//! The imaginary part of the second-order self-energy is a double
//! convolution of the Weiss field spectral function weighted by Fermi
//! factors; the real part follows by Kramers-Kronig. Both run through FFTs.

use greens::helper::{reversed, symmetrize_even};
use greens::{fft_convolve_same, kramers_kronig, semi_circle_hiltrans, RealFrequencyGrid};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::info;

use crate::convergence::{iterate, FixedPoint, LoopControl, LoopReport};
use crate::error::DmftError;

/// Imaginary part of the second-order diagram for a general spectral
/// function `aw` with occupation `nf`, before the `dw^2` measure.
///
/// `A+ = A nf` and `A- = A nf(-w)` describe particle and hole
/// propagation; no particle-hole symmetry is assumed.
pub fn sigma(aw: &[f64], nf: &[f64], u_int: f64) -> Vec<f64> {
    let ap: Vec<f64> = aw.iter().zip(nf).map(|(a, f)| a * f).collect();
    let am: Vec<f64> = aw.iter().zip(nf.iter().rev()).map(|(a, f)| a * f).collect();

    let (app, amm) = rayon::join(
        || fft_convolve_same(&reversed(&ap), &am),
        || fft_convolve_same(&reversed(&am), &ap),
    );
    let (ampp, apmm) = rayon::join(
        || fft_convolve_same(&am, &app),
        || fft_convolve_same(&ap, &amm),
    );

    apmm.iter()
        .zip(&ampp)
        .map(|(x, y)| -PI * u_int * u_int * (x + y))
        .collect()
}

/// Imaginary part of the second-order diagram at half filling, before the
/// `dw^2` measure.
///
/// Particle-hole symmetry of the single band lets the diagram be built from
/// `A+` alone.
pub fn ph_hf_sigma(aw: &[f64], nf: &[f64], u_int: f64) -> Vec<f64> {
    let ap: Vec<f64> = aw.iter().zip(nf).map(|(a, f)| a * f).collect();
    let app = fft_convolve_same(&ap, &ap);
    let appp = fft_convolve_same(&ap, &app);
    appp.iter()
        .zip(appp.iter().rev())
        .map(|(x, y)| -PI * u_int * u_int * (x + y))
        .collect()
}

/// Parameters of the single band loop on the Bethe lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealIptParams {
    /// Hubbard U
    pub u_int: f64,
    /// Inverse temperature
    pub beta: f64,
    /// Hopping entering the self-consistency `G0^-1 = w - t^2 G`
    pub hopping: f64,
    /// Half-bandwidth of the lattice density of states
    pub half_bandwidth: f64,
    /// Broadening of the Weiss field; twice the grid spacing when unset
    pub eta: Option<f64>,
}

impl RealIptParams {
    pub fn new(u_int: f64, beta: f64) -> Self {
        RealIptParams {
            u_int,
            beta,
            hopping: 0.5,
            half_bandwidth: 1.0,
            eta: None,
        }
    }

    pub fn validate(&self) -> Result<(), DmftError> {
        if self.beta <= 0.0 {
            return Err(DmftError::invalid("beta", format!("must be positive, got {}", self.beta)));
        }
        if self.half_bandwidth <= 0.0 {
            return Err(DmftError::invalid(
                "half_bandwidth",
                format!("must be positive, got {}", self.half_bandwidth),
            ));
        }
        Ok(())
    }
}

/// Local Green's function and self-energy on the real axis.
#[derive(Debug, Clone)]
pub struct RealAxisState {
    pub gloc: Vec<Complex64>,
    pub sigma: Vec<Complex64>,
}

impl FixedPoint for RealAxisState {
    fn is_close(&self, previous: &Self, atol: f64) -> bool {
        self.gloc.is_close(&previous.gloc, atol)
    }

    fn distance(&self, previous: &Self) -> f64 {
        self.gloc.distance(&previous.gloc)
    }

    fn mix(&mut self, previous: &Self, mixing: f64) {
        self.gloc.mix(&previous.gloc, mixing);
    }
}

#[derive(Debug, Clone)]
pub struct RealAxisSolution {
    pub gloc: Vec<Complex64>,
    pub sigma: Vec<Complex64>,
    pub report: LoopReport,
}

/// Non-interacting local Green's function, the usual metallic seed.
pub fn metallic_seed(grid: &RealFrequencyGrid, eta: f64, half_bandwidth: f64) -> Vec<Complex64> {
    grid.points()
        .par_iter()
        .map(|&w| semi_circle_hiltrans(Complex64::new(w, eta), half_bandwidth))
        .collect()
}

/// DMFT loop for the single band Hubbard model at half filling.
///
/// Each iteration builds the Weiss field `G0 = 1/(w + i eta - t^2 Gloc)`,
/// evaluates the second-order self-energy from its spectral function and
/// closes the loop with the Hilbert transform of the semicircle,
/// `Gloc = G_sc(w - Sigma)`.
pub fn ss_dmft_loop(
    gloc: Vec<Complex64>,
    grid: &RealFrequencyGrid,
    params: &RealIptParams,
    control: &LoopControl,
) -> Result<RealAxisSolution, DmftError> {
    params.validate()?;
    if gloc.len() != grid.len() {
        return Err(greens::GreensError::LengthMismatch {
            expected: grid.len(),
            got: gloc.len(),
        }
        .into());
    }

    let w = grid.points();
    let dw = grid.dw();
    let eta = params.eta.unwrap_or(2.0 * dw);
    let t2 = params.hopping * params.hopping;
    let nf = grid.fermi(params.beta);
    info!(
        "Real axis IPT: U = {}, beta = {}, {} frequencies, eta = {:.3e}",
        params.u_int,
        params.beta,
        w.len(),
        eta
    );

    let seed = RealAxisState {
        sigma: vec![Complex64::new(0.0, 0.0); gloc.len()],
        gloc,
    };
    let (state, report) = iterate(seed, control, |state| {
        let g0: Vec<Complex64> = w
            .par_iter()
            .zip(&state.gloc)
            .map(|(&x, &g)| (Complex64::new(x, eta) - g * t2).inv())
            .collect();
        let a0: Vec<f64> = g0.iter().map(|g| -g.im / PI).collect();

        let isi: Vec<f64> = ph_hf_sigma(&a0, &nf, params.u_int)
            .into_iter()
            .map(|s| s * dw * dw)
            .collect();
        let isi = symmetrize_even(&isi);
        let hsi = kramers_kronig(&isi);
        let sigma: Vec<Complex64> = hsi
            .iter()
            .zip(&isi)
            .map(|(&re, &im)| Complex64::new(re, im))
            .collect();

        let gloc = w
            .par_iter()
            .zip(&sigma)
            .map(|(&x, &s)| semi_circle_hiltrans(Complex64::new(x, 0.0) - s, params.half_bandwidth))
            .collect();
        RealAxisState { gloc, sigma }
    });

    Ok(RealAxisSolution {
        gloc: state.gloc,
        sigma: state.sigma,
        report,
    })
}

/// One pass of [`ss_dmft_loop`], used to inspect a single iteration.
pub fn ss_dmft_loop_once(
    gloc: Vec<Complex64>,
    grid: &RealFrequencyGrid,
    params: &RealIptParams,
) -> Result<RealAxisSolution, DmftError> {
    ss_dmft_loop(gloc, grid, params, &LoopControl::once())
}

/// Spectral function `-Im G / pi`.
pub fn spectral_function(g: &[Complex64]) -> Vec<f64> {
    g.iter().map(|g| -g.im / PI).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use greens::bethe_dos;

    fn grid() -> RealFrequencyGrid {
        RealFrequencyGrid::symmetric(4.0, 1025).unwrap()
    }

    fn solve(u_int: f64) -> (RealFrequencyGrid, RealAxisSolution) {
        let grid = grid();
        let seed = metallic_seed(&grid, 2.0 * grid.dw(), 1.0);
        let solution = ss_dmft_loop(
            seed,
            &grid,
            &RealIptParams::new(u_int, 100.0),
            &LoopControl::new(1e-3, 300),
        )
        .unwrap();
        (grid, solution)
    }

    #[test]
    fn test_non_interacting_limit_is_the_semicircle() {
        let (grid, solution) = solve(0.0);
        assert!(solution.report.converged);
        let a = spectral_function(&solution.gloc);
        for (i, &w) in grid.points().iter().enumerate() {
            assert_relative_eq!(a[i], bethe_dos(w, 1.0), epsilon = 1e-10);
        }
        assert!(solution.sigma.iter().all(|s| s.norm() == 0.0));
    }

    #[test]
    fn test_metal_keeps_luttinger_pinning() {
        let (grid, solution) = solve(2.0);
        assert!(solution.report.converged);
        let a = spectral_function(&solution.gloc);
        let c = grid.center();
        assert_relative_eq!(a[c], 2.0 / PI, epsilon = 1e-2);
        assert_relative_eq!(grid.integrate(&a), 1.0, epsilon = 1e-2);
        // particle-hole symmetry
        assert!(solution.sigma[c].re.abs() < 1e-8);
        for i in 0..grid.len() {
            assert_relative_eq!(a[i], a[grid.mirror(i)], epsilon = 1e-8);
        }
        // Fermi liquid: Re Sigma has negative slope, Im Sigma is non positive
        assert!(solution.sigma[c + 13].re < 0.0);
        assert!(solution.sigma.iter().all(|s| s.im <= 1e-12));
    }

    #[test]
    fn test_large_interaction_opens_a_gap() {
        let (grid, solution) = solve(4.0);
        let a = spectral_function(&solution.gloc);
        assert!(a[grid.center()] < 0.05, "A(0) = {}", a[grid.center()]);
        assert!(a.iter().all(|&x| x >= -1e-10));
        // Hubbard band tails leak past the window edges
        let norm = grid.integrate(&a);
        assert!(norm > 0.95 && norm < 1.0 + 1e-3, "norm = {}", norm);
    }

    #[test]
    fn test_general_diagram_reduces_to_particle_hole_form() {
        let grid = RealFrequencyGrid::symmetric(3.0, 301).unwrap();
        let nf = grid.fermi(20.0);
        let aw: Vec<f64> = grid.points().iter().map(|&w| bethe_dos(w, 1.0)).collect();
        let general = sigma(&aw, &nf, 2.0);
        let symmetric = ph_hf_sigma(&aw, &nf, 2.0);
        let scale = symmetric.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        assert!(scale > 0.0);
        for (x, y) in general.iter().zip(&symmetric) {
            assert!((x - y).abs() <= 1e-10 * scale);
        }
    }

    #[test]
    fn test_rejects_mismatched_seed() {
        let grid = grid();
        let result = ss_dmft_loop_once(vec![Complex64::new(0.0, 0.0); 3], &grid, &RealIptParams::new(1.0, 10.0));
        assert!(result.is_err());
    }
}
