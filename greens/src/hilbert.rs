//! Hilbert transforms on the Bethe lattice and Kramers-Kronig relations.

use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Zero padding factor used by [`kramers_kronig`].
const KK_PADDING: usize = 4;

/// Hilbert transform of the semicircular density of half-bandwidth `d`,
/// `2 (zeta - sqrt(zeta^2 - d^2)) / d^2`.
///
/// The square-root branch follows `zeta`: `Im G < 0` in the upper half
/// plane and `Im G > 0` in the lower one, so the result is retarded for
/// real-frequency arguments and decays as `1/zeta` everywhere. Points on
/// the real axis are taken as the limit from above.
pub fn semi_circle_hiltrans(zeta: Complex64, d: f64) -> Complex64 {
    let sq = (zeta * zeta - d * d).sqrt();
    let flip = if zeta.im != 0.0 {
        sq.im * zeta.im < 0.0
    } else if sq.im != 0.0 {
        sq.im < 0.0
    } else {
        sq.re * zeta.re < 0.0
    };
    let sq = if flip { -sq } else { sq };
    (zeta - sq) * (2.0 / (d * d))
}

/// Semicircular density of states of half-bandwidth `d`.
pub fn bethe_dos(energy: f64, d: f64) -> f64 {
    if energy.abs() >= d {
        return 0.0;
    }
    2.0 / (PI * d * d) * (d * d - energy * energy).sqrt()
}

/// Non-interacting lattice Green's function on the Matsubara axis.
pub fn greenf_matsubara(w_n: &[f64], mu: f64, d: f64) -> Vec<Complex64> {
    w_n.par_iter()
        .map(|&w| semi_circle_hiltrans(Complex64::new(mu, w), d))
        .collect()
}

/// Hilbert transform `H[x]` with the convention `H[cos] = sin`, taken as
/// the imaginary part of the discrete analytic signal of `x` zero padded to
/// four times its length.
pub fn hilbert(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }
    let padded = KK_PADDING * n;
    let mut buffer = vec![Complex64::new(0.0, 0.0); padded];
    for (slot, &v) in buffer.iter_mut().zip(x) {
        slot.re = v;
    }

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(padded).process(&mut buffer);
    // keep the DC and Nyquist terms, double positive frequencies, drop negative ones
    for (k, value) in buffer.iter_mut().enumerate() {
        if k == 0 || k == padded / 2 {
            continue;
        }
        *value *= if k < padded / 2 { 2.0 } else { 0.0 };
    }
    planner.plan_fft_inverse(padded).process(&mut buffer);

    buffer[..n].iter().map(|c| c.im / padded as f64).collect()
}

/// Real part of a retarded function from its imaginary part on an
/// equispaced real-frequency grid, `Re f = -H[Im f]`.
pub fn kramers_kronig(imag: &[f64]) -> Vec<f64> {
    hilbert(imag).into_iter().map(|h| -h).collect()
}
