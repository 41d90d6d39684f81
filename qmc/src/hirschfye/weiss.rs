use nalgebra::{DMatrix, DVector};

use crate::error::QmcError;

/// `L x L` matrix `-G0(tau_i - tau_j)` of a Weiss field sampled on
/// `L` slices, `g0tau[l] = G0(l dtau)`, `l = 0..L`.
///
/// Negative time differences wrap around with the fermionic sign,
/// `G0(-tau) = -G0(beta - tau)`.
pub fn retarded_weiss(g0tau: &[f64]) -> DMatrix<f64> {
    let l = g0tau.len();
    DMatrix::from_fn(l, l, |i, j| {
        if i >= j {
            -g0tau[i - j]
        } else {
            g0tau[l + i - j]
        }
    })
}

/// Green's function for the field configuration `v` (one value per slice)
/// from scratch: `G = [1 + (1 - G0)(e^V - 1)]^-1 G0`.
pub fn gnewclean(g0t: &DMatrix<f64>, v: &[f64]) -> Result<DMatrix<f64>, QmcError> {
    let l = v.len();
    if g0t.nrows() != l || g0t.ncols() != l {
        return Err(QmcError::ShapeMismatch {
            what: "Weiss field matrix",
            expected: l,
            got: g0t.nrows(),
        });
    }
    dyson_matrix(g0t, v).lu().solve(g0t).ok_or(QmcError::SingularMatrix)
}

/// `1 + (1 - G0)(e^V - 1)`; its determinant is the weight of the field
/// configuration up to a constant.
pub(crate) fn dyson_matrix(g0t: &DMatrix<f64>, v: &[f64]) -> DMatrix<f64> {
    let l = v.len();
    let expv = DVector::from_iterator(l, v.iter().map(|x| x.exp() - 1.0));
    let identity = DMatrix::identity(l, l);
    &identity + (&identity - g0t) * DMatrix::from_diagonal(&expv)
}

/// Rank-one update of `g` after the field felt on slice `k` changed by `dv`.
pub fn gnew(g: &mut DMatrix<f64>, dv: f64, k: usize) {
    let ee = dv.exp() - 1.0;
    let a = ee / (1.0 + (1.0 - g[(k, k)]) * ee);
    let mut x = g.column(k).clone_owned();
    x[k] -= 1.0;
    let y = g.row(k).transpose();
    g.ger(a, &x, &y, 1.0);
}

/// Determinant ratio entering the acceptance of a flip, for one
/// spin-orbital.
pub(crate) fn flip_ratio(g: &DMatrix<f64>, dv: f64, k: usize) -> f64 {
    1.0 + (1.0 - g[(k, k)]) * (dv.exp() - 1.0)
}
