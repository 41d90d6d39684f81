use nalgebra::DMatrix;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use super::params::HfParams;
use super::weiss::{dyson_matrix, flip_ratio, gnew, gnewclean, retarded_weiss};
use crate::error::QmcError;

/// Measured impurity Green's functions.
#[derive(Debug, Clone)]
pub struct ImpuritySolution {
    /// `-G(tau)` of every spin-orbital on the `L + 1` points
    /// `tau_l = l dtau`, `l = 0..=L`
    pub g_tau: Vec<Vec<f64>>,
    /// Fraction of accepted single field flips
    pub acceptance: f64,
    pub measurements: usize,
}

impl ImpuritySolution {
    /// Paramagnetic `G(tau)`, the spin-orbital average with the physical
    /// sign.
    pub fn physical_g(&self) -> Vec<f64> {
        let blocks = self.g_tau.len() as f64;
        let points = self.g_tau.first().map_or(0, Vec::len);
        (0..points)
            .map(|l| -self.g_tau.iter().map(|g| g[l]).sum::<f64>() / blocks)
            .collect()
    }
}

/// Translation average of a measured `L x L` matrix `-G(tau_i, tau_j)`
/// into `-G(tau_l)`, `l = 0..=L`.
///
/// The last point follows from the jump `G(0+) + G(beta-) = -1`.
pub fn time_average(g: &DMatrix<f64>) -> Vec<f64> {
    let l = g.nrows();
    let mut out: Vec<f64> = (0..l)
        .map(|lag| {
            (0..l)
                .map(|i| {
                    let row = i + lag;
                    if row < l {
                        g[(row, i)]
                    } else {
                        -g[(row - l, i)]
                    }
                })
                .sum::<f64>()
                / l as f64
        })
        .collect();
    let first = out.first().copied().unwrap_or(0.0);
    out.push(1.0 - first);
    out
}

/// Fields felt by every spin-orbital on every slice, `intm * v`.
fn orbital_fields(v: &DMatrix<f64>, intm: &DMatrix<f64>) -> Vec<Vec<f64>> {
    let felt = intm * v;
    felt.row_iter().map(|row| row.iter().copied().collect()).collect()
}

fn rebuild(g0m: &[DMatrix<f64>], v: &DMatrix<f64>, intm: &DMatrix<f64>) -> Result<Vec<DMatrix<f64>>, QmcError> {
    let felt = orbital_fields(v, intm);
    g0m.par_iter()
        .zip(felt.par_iter())
        .map(|(g0, vi)| gnewclean(g0, vi))
        .collect()
}

/// Attempts to flip every auxiliary field at once, with the heat-bath
/// probability from the ratio of the full determinants.
fn global_flip<R: Rng + ?Sized>(
    g0m: &[DMatrix<f64>],
    g: &mut Vec<DMatrix<f64>>,
    v: &mut DMatrix<f64>,
    intm: &DMatrix<f64>,
    rng: &mut R,
) -> Result<bool, QmcError> {
    let flipped = -v.clone();
    let old = orbital_fields(v, intm);
    let new = orbital_fields(&flipped, intm);
    let ratio: f64 = g0m
        .iter()
        .zip(old.iter().zip(&new))
        .map(|(g0, (vo, vn))| {
            dyson_matrix(g0, vn).lu().determinant() / dyson_matrix(g0, vo).lu().determinant()
        })
        .product();
    if ratio.is_finite() && ratio / (1.0 + ratio) > rng.gen::<f64>() {
        *v = flipped;
        *g = rebuild(g0m, v, intm)?;
        return Ok(true);
    }
    Ok(false)
}

/// Hirsch-Fye impurity solver.
///
/// `g0_blocks` holds the Weiss field `G0(l dtau)`, `l = 0..L`, of every
/// spin-orbital; `v` the auxiliary fields (`fields x L`), updated in place
/// so that a following call continues from the last configuration; `intm`
/// the coupling of spin-orbitals to fields as built by
/// [`interaction_matrix`](super::interaction_matrix).
///
/// Every sweep proposes one heat-bath flip per field and slice. After
/// `params.therm` sweeps the Green's functions are accumulated every
/// `params.n_meas` sweeps for `params.sweeps` more.
pub fn imp_solver<R: Rng + ?Sized>(
    g0_blocks: &[Vec<f64>],
    v: &mut DMatrix<f64>,
    intm: &DMatrix<f64>,
    params: &HfParams,
    rng: &mut R,
) -> Result<ImpuritySolution, QmcError> {
    params.validate()?;
    let slices = v.ncols();
    if g0_blocks.len() != intm.nrows() {
        return Err(QmcError::ShapeMismatch {
            what: "Weiss field blocks",
            expected: intm.nrows(),
            got: g0_blocks.len(),
        });
    }
    if v.nrows() != intm.ncols() {
        return Err(QmcError::ShapeMismatch {
            what: "auxiliary fields",
            expected: intm.ncols(),
            got: v.nrows(),
        });
    }
    if let Some(block) = g0_blocks.iter().find(|b| b.len() != slices) {
        return Err(QmcError::ShapeMismatch {
            what: "Weiss field slices",
            expected: slices,
            got: block.len(),
        });
    }

    let g0m: Vec<DMatrix<f64>> = g0_blocks.iter().map(|b| retarded_weiss(b)).collect();
    let mut g = rebuild(&g0m, v, intm)?;
    let mut accumulated = vec![DMatrix::<f64>::zeros(slices, slices); g.len()];
    let (mut measurements, mut accepted, mut proposed) = (0usize, 0usize, 0usize);
    let mut global_accepted = 0usize;

    for sweep in 0..params.therm + params.sweeps {
        for j in 0..slices {
            for field in 0..v.nrows() {
                let dv: Vec<f64> = intm
                    .row_iter()
                    .map(|row| -2.0 * row[field] * v[(field, j)])
                    .collect();
                let ratio: f64 = g.iter().zip(&dv).map(|(gi, &d)| flip_ratio(gi, d, j)).product();
                proposed += 1;
                if ratio / (1.0 + ratio) > rng.gen::<f64>() {
                    accepted += 1;
                    v[(field, j)] *= -1.0;
                    for (gi, &d) in g.iter_mut().zip(&dv) {
                        if d != 0.0 {
                            gnew(gi, d, j);
                        }
                    }
                }
            }
        }

        if params.global_flip && global_flip(&g0m, &mut g, v, intm, rng)? {
            global_accepted += 1;
        }
        if params.recompute_every > 0 && (sweep + 1) % params.recompute_every == 0 {
            g = rebuild(&g0m, v, intm)?;
        }
        if sweep >= params.therm && sweep % params.n_meas == 0 {
            measurements += 1;
            for (acc, gi) in accumulated.iter_mut().zip(&g) {
                *acc += gi;
            }
        }
    }

    if measurements == 0 {
        return Err(QmcError::invalid(
            "sweeps",
            format!("{} sweeps after thermalisation took no measurement", params.sweeps),
        ));
    }
    if params.global_flip {
        debug!("Accepted {} global flips", global_accepted);
    }
    let acceptance = accepted as f64 / proposed.max(1) as f64;
    info!(
        "Hirsch-Fye: {} measurements, acceptance {:.3}",
        measurements, acceptance
    );

    let g_tau = accumulated
        .into_iter()
        .map(|acc| time_average(&(acc / measurements as f64)))
        .collect();
    Ok(ImpuritySolution {
        g_tau,
        acceptance,
        measurements,
    })
}
