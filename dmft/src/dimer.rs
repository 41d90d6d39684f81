//! Dimer Hubbard model on the Bethe lattice, Matsubara axis.
//!
//! Green's functions of the dimer are 2x2 matrices with equal diagonal
//! entries, `[[d, o], [o, d]]`, so only the local (`d`) and off-diagonal
//! (`o`) components are stored.

use greens::semi_circle_hiltrans;
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::info;

use crate::convergence::{iterate, LoopControl, LoopReport};
use crate::error::DmftError;
use crate::ipt_imag::{check_lengths, dimer_sigma};

/// Non-interacting local and off-diagonal Green's functions of the dimer
/// lattice at the complex frequency `omega`.
///
/// `tn` is an additional inter-dimer hopping between unlike sites; it
/// enters only as a shift of the bonding energies.
pub fn gf_met(omega: Complex64, mu: f64, tp: f64, t: f64, tn: f64) -> (Complex64, Complex64) {
    let g1 = semi_circle_hiltrans(omega + mu - tp - tn, 2.0 * t);
    let g2 = semi_circle_hiltrans(omega + mu + tp + tn, 2.0 * t);
    (0.5 * (g1 + g2), 0.5 * (g1 - g2))
}

/// Weiss fields `(G0d, G0o)` of the dimer embedded in the Bethe lattice,
/// `G0^-1 = (omega + mu) - tp sigma_x - t^2 G`.
pub fn self_consistency(
    omega: Complex64,
    gd: Complex64,
    gc: Complex64,
    mu: f64,
    tp: f64,
    t2: f64,
) -> (Complex64, Complex64) {
    let dd = omega + mu - gd * t2;
    let dc = -tp - gc * t2;
    let det = dd * dd - dc * dc;
    (dd / det, -dc / det)
}

/// Solves `G^-1 = G0^-1 - Sigma` for the symmetric 2x2 dimer matrices.
pub fn dimer_dyson(
    g0d: Complex64,
    g0o: Complex64,
    sd: Complex64,
    so: Complex64,
) -> (Complex64, Complex64) {
    let det0 = g0d * g0d - g0o * g0o;
    let inv_d = g0d / det0 - sd;
    let inv_o = -g0o / det0 - so;
    let det = inv_d * inv_d - inv_o * inv_o;
    (inv_d / det, -inv_o / det)
}

/// Local and off-diagonal components on a Matsubara grid.
#[derive(Debug, Clone)]
pub struct DimerMatsubaraSolution {
    pub giw_d: Vec<Complex64>,
    pub giw_o: Vec<Complex64>,
    pub sigma_d: Vec<Complex64>,
    pub sigma_o: Vec<Complex64>,
    pub report: LoopReport,
}

/// Non-interacting dimer Green's functions on `w_n`, the usual seed.
pub fn dimer_seed(w_n: &[f64], mu: f64, tp: f64, t: f64) -> (Vec<Complex64>, Vec<Complex64>) {
    w_n.par_iter()
        .map(|&w| gf_met(Complex64::new(0.0, w), mu, tp, t, 0.0))
        .unzip()
}

/// IPT DMFT loop for the dimer at half filling.
#[allow(clippy::too_many_arguments)]
pub fn ipt_dmft_loop(
    beta: f64,
    u_int: f64,
    tp: f64,
    hopping: f64,
    giw_d: Vec<Complex64>,
    giw_o: Vec<Complex64>,
    tau: &[f64],
    w_n: &[f64],
    control: &LoopControl,
) -> Result<DimerMatsubaraSolution, DmftError> {
    check_lengths(&giw_d, w_n)?;
    check_lengths(&giw_o, w_n)?;
    let end = tau.last().copied().unwrap_or(0.0);
    if (end - beta).abs() > 1e-12 * beta {
        return Err(DmftError::invalid(
            "beta",
            format!("time grid ends at {}, expected {}", end, beta),
        ));
    }
    info!("Matsubara dimer IPT: U = {}, tp = {}, beta = {}", u_int, tp, beta);
    let t2 = hopping * hopping;

    let zeros = vec![Complex64::new(0.0, 0.0); w_n.len()];
    let mut sigmas = (zeros.clone(), zeros);
    let mut failure = None;
    let ((giw_d, giw_o), report) = iterate((giw_d, giw_o), control, |(gd, go)| {
        let (g0d, g0o): (Vec<Complex64>, Vec<Complex64>) = w_n
            .iter()
            .zip(gd.iter().zip(go))
            .map(|(&w, (&d, &o))| self_consistency(Complex64::new(0.0, w), d, o, 0.0, tp, t2))
            .unzip();
        let (sd, so) = match dimer_sigma(u_int, tp, &g0d, &g0o, tau, w_n) {
            Ok(sigma) => sigma,
            Err(err) => {
                failure.get_or_insert(err);
                return (gd.clone(), go.clone());
            }
        };
        let next: (Vec<Complex64>, Vec<Complex64>) = g0d
            .iter()
            .zip(&g0o)
            .zip(sd.iter().zip(&so))
            .map(|((&g0d, &g0o), (&sd, &so))| dimer_dyson(g0d, g0o, sd, so))
            .unzip();
        sigmas = (sd, so);
        next
    });
    if let Some(err) = failure {
        return Err(err);
    }

    Ok(DimerMatsubaraSolution {
        giw_d,
        giw_o,
        sigma_d: sigmas.0,
        sigma_o: sigmas.1,
        report,
    })
}
