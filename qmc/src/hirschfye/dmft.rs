use greens::{gt_fouriertrans, gw_invfouriertrans, interpol, max_distance, Complex64, Tail};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::params::HfParams;
use super::setup::{bethe_weiss, setup_pm_sim, weiss_slices};
use super::solver::imp_solver;
use crate::error::QmcError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Largest change of `G(iw_n)` over the iteration
    pub distance: f64,
    pub acceptance: f64,
}

#[derive(Debug, Clone)]
pub struct HfDmftSolution {
    /// Monte Carlo time slices, `L + 1` points
    pub tau_mc: Vec<f64>,
    /// `G(tau)` measured in the last iteration
    pub g_tau: Vec<f64>,
    pub w_n: Vec<f64>,
    pub giw: Vec<Complex64>,
    pub history: Vec<IterationRecord>,
}

/// Paramagnetic single-site DMFT on the Bethe lattice with the Hirsch-Fye
/// solver.
///
/// Monte Carlo noise keeps the iterates from settling below the
/// statistical error, so the loop runs a fixed `params.n_iter` times and
/// records the change of every iteration instead of testing convergence.
/// The auxiliary fields carry over between iterations.
pub fn dmft_loop<R: Rng + ?Sized>(params: &HfParams, rng: &mut R) -> Result<HfDmftSolution, QmcError> {
    let setup = setup_pm_sim(params, rng)?;
    let (tau, w_n, intm) = (setup.tau, setup.w_n, setup.intm);
    let mut v = setup.v;
    let mut giw = setup.giw;
    let mut g_tau = Vec::new();
    let mut history = Vec::with_capacity(params.n_iter);

    info!(
        "Hirsch-Fye DMFT: U = {}, beta = {}, mu = {}, {} slices, {} iterations",
        params.u_int, params.beta, params.mu, params.n_tau_mc, params.n_iter
    );
    for iteration in 0..params.n_iter {
        let g0iw = bethe_weiss(&w_n, params.mu, params.hopping, &giw);
        let g0_tau = gw_invfouriertrans(&g0iw, &tau, &w_n, Tail::fermion())?;
        let block = weiss_slices(&g0_tau, params.n_tau_mc)?;
        let blocks = vec![block; intm.nrows()];

        let solution = imp_solver(&blocks, &mut v, &intm, params, rng)?;
        g_tau = solution.physical_g();
        let fine = interpol(&g_tau, params.n_tau)?;
        let giw_new = gt_fouriertrans(&fine, &tau, &w_n, Tail::fermion())?;

        let record = IterationRecord {
            iteration,
            distance: max_distance(&giw_new, &giw),
            acceptance: solution.acceptance,
        };
        info!(
            "iteration {}: |dG| = {:.3e}, acceptance {:.3}",
            record.iteration, record.distance, record.acceptance
        );
        history.push(record);
        giw = giw_new;
    }

    let dtau = params.dtau_mc();
    Ok(HfDmftSolution {
        tau_mc: (0..=params.n_tau_mc).map(|l| l as f64 * dtau).collect(),
        g_tau,
        w_n,
        giw,
        history,
    })
}
