//! Fourier transforms between imaginary time and Matsubara frequencies.
//!
//! A Green's function sampled on a finite set of Matsubara frequencies cannot
//! be summed directly: its `1/(iw)` tail decays too slowly and the jump of
//! `G(tau)` at `tau = 0` would ring through the whole time axis. Both
//! transforms therefore subtract the analytic high-frequency expansion
//!
//! ```text
//! G(iw) ~ c1/(iw) + c2/(iw)^2 + c3/(iw)^3
//! G(tau) ~ -c1/2 + c2/2 (tau - beta/2) - c3/4 (tau^2 - beta tau)
//! ```
//!
//! transform the smooth remainder with one FFT and add the tail back.
//!
//! Imaginary-time arrays always live on an inclusive grid of `n + 1` points
//! `tau_k = k beta / n`, `k = 0..=n`, so that `beta` is read from the last
//! point.

use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::GreensError;

/// High-frequency expansion coefficients of a Green's function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tail {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl Tail {
    pub const fn new(c1: f64, c2: f64, c3: f64) -> Self {
        Tail { c1, c2, c3 }
    }

    /// Leading tail of any diagonal fermionic Green's function.
    pub const fn fermion() -> Self {
        Tail::new(1.0, 0.0, 0.0)
    }

    pub const fn none() -> Self {
        Tail::new(0.0, 0.0, 0.0)
    }

    /// Tail evaluated at the Matsubara frequency `w_n`.
    pub fn frequency(&self, w_n: f64) -> Complex64 {
        let inv = Complex64::new(0.0, w_n).inv();
        inv * self.c1 + inv * inv * self.c2 + inv * inv * inv * self.c3
    }

    /// Tail evaluated at the imaginary time `tau`.
    pub fn time(&self, tau: f64, beta: f64) -> f64 {
        -self.c1 / 2.0 + self.c2 / 2.0 * (tau - beta / 2.0)
            - self.c3 / 4.0 * (tau * tau - beta * tau)
    }
}

impl Default for Tail {
    fn default() -> Self {
        Tail::fermion()
    }
}

fn beta_and_slices(tau: &[f64]) -> Result<(f64, usize), GreensError> {
    if tau.len() < 3 {
        return Err(GreensError::TooFewPoints { min: 3, got: tau.len() });
    }
    Ok((tau[tau.len() - 1], tau.len() - 1))
}

fn same_length(expected: usize, got: usize) -> Result<(), GreensError> {
    if expected != got {
        return Err(GreensError::LengthMismatch { expected, got });
    }
    Ok(())
}

/// `G(iw_n) -> G(tau)` on the inclusive grid `tau`.
///
/// Frequencies beyond the number of time slices are dropped.
pub fn gw_invfouriertrans(
    g_iwn: &[Complex64],
    tau: &[f64],
    w_n: &[f64],
    tail: Tail,
) -> Result<Vec<f64>, GreensError> {
    same_length(w_n.len(), g_iwn.len())?;
    let (beta, slices) = beta_and_slices(tau)?;

    let mut buffer = vec![Complex64::new(0.0, 0.0); slices];
    for ((slot, g), &w) in buffer.iter_mut().zip(g_iwn).zip(w_n) {
        *slot = g - tail.frequency(w);
    }
    FftPlanner::new()
        .plan_fft_forward(slices)
        .process(&mut buffer);

    let mut g_tau: Vec<f64> = (0..slices)
        .into_par_iter()
        .map(|k| {
            let phase = Complex64::from_polar(1.0, -PI * tau[k] / beta);
            (buffer[k] * phase).re * 2.0 / beta + tail.time(tau[k], beta)
        })
        .collect();
    // The tail-free part is antiperiodic, so its value at beta is minus the one at 0.
    g_tau.push(-buffer[0].re * 2.0 / beta + tail.time(beta, beta));
    Ok(g_tau)
}

/// `G(tau) -> G(iw_n)` by trapezoidal integration over the inclusive grid.
pub fn gt_fouriertrans(
    g_tau: &[f64],
    tau: &[f64],
    w_n: &[f64],
    tail: Tail,
) -> Result<Vec<Complex64>, GreensError> {
    same_length(tau.len(), g_tau.len())?;
    let (beta, slices) = beta_and_slices(tau)?;
    if w_n.len() > slices {
        return Err(GreensError::UnderResolvedTau {
            n_tau: slices,
            n_matsubara: w_n.len(),
        });
    }

    let remainder: Vec<f64> = g_tau
        .iter()
        .zip(tau)
        .map(|(g, &t)| g - tail.time(t, beta))
        .collect();
    let mut buffer: Vec<Complex64> = remainder[..slices]
        .iter()
        .zip(tau)
        .map(|(h, &t)| Complex64::from_polar(*h, PI * t / beta))
        .collect();
    FftPlanner::new()
        .plan_fft_inverse(slices)
        .process(&mut buffer);

    let dtau = beta / slices as f64;
    let edges = 0.5 * (remainder[0] + remainder[slices]);
    Ok(w_n
        .par_iter()
        .enumerate()
        .map(|(m, &w)| (buffer[m] - edges) * dtau + tail.frequency(w))
        .collect())
}

/// Linear resampling of `g_tau` (inclusive equispaced grid) onto
/// `slices + 1` points covering the same interval.
pub fn interpol(g_tau: &[f64], slices: usize) -> Result<Vec<f64>, GreensError> {
    if g_tau.len() < 2 {
        return Err(GreensError::TooFewPoints { min: 2, got: g_tau.len() });
    }
    if slices == 0 {
        return Err(GreensError::TooFewPoints { min: 1, got: 0 });
    }
    let last = (g_tau.len() - 1) as f64;
    Ok((0..=slices)
        .map(|j| {
            let x = j as f64 * last / slices as f64;
            let lower = (x.floor() as usize).min(g_tau.len() - 2);
            let frac = x - lower as f64;
            g_tau[lower] * (1.0 - frac) + g_tau[lower + 1] * frac
        })
        .collect())
}
