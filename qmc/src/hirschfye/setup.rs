use greens::{greenf_matsubara, gw_invfouriertrans, interpol, tau_wn_setup, Complex64, Tail};
use nalgebra::DMatrix;
use rand::Rng;
use rayon::prelude::*;

use super::fields::{interaction_matrix, ising_v};
use super::params::HfParams;
use crate::error::QmcError;

/// Starting point of a paramagnetic Hirsch-Fye simulation.
#[derive(Debug, Clone)]
pub struct PmSetup {
    /// Fine imaginary-time grid, `n_tau + 1` points
    pub tau: Vec<f64>,
    pub w_n: Vec<f64>,
    /// Non-interacting lattice Green's function
    pub giw: Vec<Complex64>,
    pub g0iw: Vec<Complex64>,
    /// Weiss field on the `L` Monte Carlo slices
    pub g0t: Vec<f64>,
    pub v: DMatrix<f64>,
    pub intm: DMatrix<f64>,
}

/// Bethe lattice self-consistency `G0 = 1/(iw_n + mu - t^2 G)`.
pub fn bethe_weiss(w_n: &[f64], mu: f64, hopping: f64, giw: &[Complex64]) -> Vec<Complex64> {
    w_n.par_iter()
        .zip(giw.par_iter())
        .map(|(&w, &g)| (Complex64::new(mu, w) - hopping * hopping * g).inv())
        .collect()
}

/// `G0(tau)` on the first `slices` Monte Carlo slices, resampled from the
/// inclusive fine grid.
pub fn weiss_slices(g0_tau: &[f64], slices: usize) -> Result<Vec<f64>, QmcError> {
    let mut coarse = interpol(g0_tau, slices)?;
    coarse.pop();
    Ok(coarse)
}

pub fn setup_pm_sim<R: Rng + ?Sized>(params: &HfParams, rng: &mut R) -> Result<PmSetup, QmcError> {
    params.validate()?;
    let (tau, w_n) = tau_wn_setup(params.beta, params.n_tau, params.n_matsubara)?;
    let giw = greenf_matsubara(&w_n, params.mu, 2.0 * params.hopping);
    let g0iw = bethe_weiss(&w_n, params.mu, params.hopping, &giw);
    let g0_tau = gw_invfouriertrans(&g0iw, &tau, &w_n, Tail::fermion())?;
    let g0t = weiss_slices(&g0_tau, params.n_tau_mc)?;

    let intm = interaction_matrix(params.bands);
    let v = ising_v(params.dtau_mc(), params.u_int, params.n_tau_mc, intm.ncols(), rng);
    Ok(PmSetup {
        tau,
        w_n,
        giw,
        g0iw,
        g0t,
        v,
        intm,
    })
}
