use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::GreensError;

/// Fermionic Matsubara frequencies `w_n = pi (2n + 1) / beta` for `n = 0..size`.
pub fn matsubara_freq(beta: f64, size: usize) -> Vec<f64> {
    (0..size)
        .map(|n| PI * (2 * n + 1) as f64 / beta)
        .collect()
}

/// Fermi-Dirac occupation. The exponent is clipped so that very low
/// temperatures do not overflow.
pub fn fermi_dist(energy: f64, beta: f64) -> f64 {
    let exponent = (beta * energy).clamp(-600.0, 600.0);
    1.0 / (exponent.exp() + 1.0)
}

/// Equispaced imaginary-time grid covering `[0, beta]` with both ends included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TauGrid {
    pub beta: f64,
    points: Vec<f64>,
}

impl TauGrid {
    /// Builds a grid of `slices + 1` points.
    pub fn new(beta: f64, slices: usize) -> Result<Self, GreensError> {
        if beta <= 0.0 {
            return Err(GreensError::NonPositiveBeta(beta));
        }
        if slices < 2 {
            return Err(GreensError::TooFewPoints {
                min: 2,
                got: slices,
            });
        }
        let dtau = beta / slices as f64;
        let mut points: Vec<f64> = (0..slices).map(|k| k as f64 * dtau).collect();
        points.push(beta);
        Ok(TauGrid { beta, points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn slices(&self) -> usize {
        self.points.len() - 1
    }

    pub fn dtau(&self) -> f64 {
        self.beta / self.slices() as f64
    }

    pub fn into_points(self) -> Vec<f64> {
        self.points
    }
}

/// Imaginary-time and Matsubara grids used together by the transforms.
///
/// The time grid has `n_tau + 1` points; the FFT needs at least one time
/// slice per frequency.
pub fn tau_wn_setup(
    beta: f64,
    n_tau: usize,
    n_matsubara: usize,
) -> Result<(Vec<f64>, Vec<f64>), GreensError> {
    if n_tau < n_matsubara {
        return Err(GreensError::UnderResolvedTau { n_tau, n_matsubara });
    }
    let tau = TauGrid::new(beta, n_tau)?;
    Ok((tau.into_points(), matsubara_freq(beta, n_matsubara)))
}

/// Real-frequency grid, equispaced and mirror symmetric around zero.
///
/// The number of points is odd so that `w = 0` is a grid point and
/// `w[mirror(i)] == -w[i]` holds exactly. Convolutions and reflections
/// `f(-w)` on the real axis rely on both properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealFrequencyGrid {
    points: Vec<f64>,
    dw: f64,
}

impl RealFrequencyGrid {
    pub fn symmetric(w_max: f64, size: usize) -> Result<Self, GreensError> {
        if w_max <= 0.0 {
            return Err(GreensError::NonPositiveCutoff(w_max));
        }
        if size < 3 {
            return Err(GreensError::TooFewPoints { min: 3, got: size });
        }
        if size % 2 == 0 {
            return Err(GreensError::EvenRealGrid(size));
        }
        let half = (size / 2) as i64;
        let dw = w_max / half as f64;
        let points = (-half..=half).map(|k| k as f64 * dw).collect();
        Ok(RealFrequencyGrid { points, dw })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dw(&self) -> f64 {
        self.dw
    }

    /// Index of `-w[i]`.
    pub fn mirror(&self, i: usize) -> usize {
        self.points.len() - 1 - i
    }

    /// Index of `w = 0`.
    pub fn center(&self) -> usize {
        self.points.len() / 2
    }

    /// Fermi function sampled on the grid.
    pub fn fermi(&self, beta: f64) -> Vec<f64> {
        self.points.iter().map(|&w| fermi_dist(w, beta)).collect()
    }

    /// Trapezoidal integral of a function sampled on the grid.
    pub fn integrate(&self, values: &[f64]) -> f64 {
        let n = values.len();
        if n < 2 {
            return 0.0;
        }
        let inner: f64 = values.iter().sum();
        (inner - 0.5 * (values[0] + values[n - 1])) * self.dw
    }
}
