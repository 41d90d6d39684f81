//! Iterative perturbation theory on the Matsubara axis.
//!
//! The second-order diagram is local in imaginary time,
//! `Sigma(tau) = U^2 G0(tau)^3`, so every iteration goes through a pair of
//! Fourier transforms with tail subtraction.

use greens::{gt_fouriertrans, gw_invfouriertrans, Tail};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::info;

use crate::convergence::{iterate, LoopControl, LoopReport};
use crate::error::DmftError;

/// Green's function and self-energy on the Matsubara axis.
#[derive(Debug, Clone)]
pub struct MatsubaraSolution {
    pub giw: Vec<Complex64>,
    pub sigma_iw: Vec<Complex64>,
    pub report: LoopReport,
}

pub(crate) fn check_lengths(giw: &[Complex64], w_n: &[f64]) -> Result<(), DmftError> {
    if giw.len() != w_n.len() {
        return Err(greens::GreensError::LengthMismatch {
            expected: w_n.len(),
            got: giw.len(),
        }
        .into());
    }
    Ok(())
}

/// Second-order self-energy of a Weiss field `g0iw` and the resulting
/// impurity Green's function, `(G, Sigma)`.
pub fn single_band_ipt_solver(
    u_int: f64,
    g0iw: &[Complex64],
    tau: &[f64],
    w_n: &[f64],
) -> Result<(Vec<Complex64>, Vec<Complex64>), DmftError> {
    let g0t = gw_invfouriertrans(g0iw, tau, w_n, Tail::fermion())?;
    let u2 = u_int * u_int;
    let sigma_t: Vec<f64> = g0t.iter().map(|g| u2 * g * g * g).collect();
    let sigma_iw = gt_fouriertrans(&sigma_t, tau, w_n, Tail::new(u2 / 4.0, 0.0, 0.0))?;

    let giw = g0iw
        .par_iter()
        .zip(&sigma_iw)
        .map(|(&g0, &s)| g0 / (1.0 - s * g0))
        .collect();
    Ok((giw, sigma_iw))
}

/// Single band IPT loop on the Bethe lattice, `G0 = 1/(iw - t^2 G)`.
pub fn dmft_loop(
    u_int: f64,
    hopping: f64,
    giw: Vec<Complex64>,
    tau: &[f64],
    w_n: &[f64],
    control: &LoopControl,
) -> Result<MatsubaraSolution, DmftError> {
    check_lengths(&giw, w_n)?;
    info!(
        "Matsubara IPT: U = {}, beta = {}, {} frequencies",
        u_int,
        tau.last().copied().unwrap_or(0.0),
        w_n.len()
    );
    let t2 = hopping * hopping;

    let mut sigma_iw = vec![Complex64::new(0.0, 0.0); w_n.len()];
    let mut failure = None;
    let (giw, report) = iterate(giw, control, |g| {
        let g0iw: Vec<Complex64> = w_n
            .iter()
            .zip(g)
            .map(|(&w, &g)| (Complex64::new(0.0, w) - g * t2).inv())
            .collect();
        match single_band_ipt_solver(u_int, &g0iw, tau, w_n) {
            Ok((giw, sigma)) => {
                sigma_iw = sigma;
                giw
            }
            Err(err) => {
                failure.get_or_insert(err);
                g.clone()
            }
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    Ok(MatsubaraSolution {
        giw,
        sigma_iw,
        report,
    })
}

/// Diagonal and off-diagonal second-order self-energies of the dimer,
/// `U^2 G0d(tau)^3` and `-U^2 G0o(tau)^3`.
///
/// The Weiss fields are expected at half filling: `g0iw_d` decays as
/// `1/(iw)` and `g0iw_o` as `tp/(iw)^2`.
pub fn dimer_sigma(
    u_int: f64,
    tp: f64,
    g0iw_d: &[Complex64],
    g0iw_o: &[Complex64],
    tau: &[f64],
    w_n: &[f64],
) -> Result<(Vec<Complex64>, Vec<Complex64>), DmftError> {
    let u2 = u_int * u_int;
    let (g0t_d, g0t_o) = rayon::join(
        || gw_invfouriertrans(g0iw_d, tau, w_n, Tail::fermion()),
        || gw_invfouriertrans(g0iw_o, tau, w_n, Tail::new(0.0, tp, 0.0)),
    );
    let (g0t_d, g0t_o) = (g0t_d?, g0t_o?);

    let sigma_d: Vec<f64> = g0t_d.iter().map(|g| u2 * g * g * g).collect();
    let sigma_o: Vec<f64> = g0t_o.iter().map(|g| -u2 * g * g * g).collect();

    let (sigma_d, sigma_o) = rayon::join(
        || gt_fouriertrans(&sigma_d, tau, w_n, Tail::new(u2 / 4.0, 0.0, 0.0)),
        || gt_fouriertrans(&sigma_o, tau, w_n, Tail::none()),
    );
    Ok((sigma_d?, sigma_o?))
}
