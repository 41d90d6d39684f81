//! Exact diagonalisation of small fermionic clusters.
//!
//! Operators are dense matrices on the full Fock space of `n` spin-orbitals
//! (dimension `2^n`). Basis state `s` has orbital `i` occupied when bit `i`
//! of `s` is set; the Jordan-Wigner sign counts occupied orbitals below `i`.

extern crate nalgebra as na;

use itertools::Itertools;
use na::{DMatrix, DVector};
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::DmftError;

/// Largest cluster handled with dense matrices.
pub const MAX_ORBITALS: usize = 12;

#[derive(Debug, Clone)]
pub struct FockSpace {
    n_orbitals: usize,
    annihilators: Vec<DMatrix<f64>>,
}

impl FockSpace {
    pub fn new(n_orbitals: usize) -> Result<Self, DmftError> {
        if n_orbitals == 0 || n_orbitals > MAX_ORBITALS {
            return Err(DmftError::invalid(
                "n_orbitals",
                format!("must be in 1..={}, got {}", MAX_ORBITALS, n_orbitals),
            ));
        }
        let dim = 1usize << n_orbitals;
        let annihilators = (0..n_orbitals)
            .map(|i| {
                let mut c = DMatrix::zeros(dim, dim);
                for state in (0..dim).filter(|s| (s >> i) & 1 == 1) {
                    let below = (state & ((1 << i) - 1)).count_ones();
                    let sign = if below % 2 == 0 { 1.0 } else { -1.0 };
                    c[(state ^ (1 << i), state)] = sign;
                }
                c
            })
            .collect();
        Ok(FockSpace {
            n_orbitals,
            annihilators,
        })
    }

    pub fn n_orbitals(&self) -> usize {
        self.n_orbitals
    }

    pub fn dim(&self) -> usize {
        1 << self.n_orbitals
    }

    pub fn annihilator(&self, i: usize) -> &DMatrix<f64> {
        &self.annihilators[i]
    }

    pub fn annihilators(&self) -> &[DMatrix<f64>] {
        &self.annihilators
    }

    pub fn creator(&self, i: usize) -> DMatrix<f64> {
        self.annihilators[i].transpose()
    }

    /// Occupation number operator of orbital `i`.
    pub fn number(&self, i: usize) -> DMatrix<f64> {
        self.annihilators[i].tr_mul(&self.annihilators[i])
    }

    pub fn identity(&self) -> DMatrix<f64> {
        DMatrix::identity(self.dim(), self.dim())
    }
}

/// `c1^+ c2 + c2^+ c1`
fn hop(c1: &DMatrix<f64>, c2: &DMatrix<f64>) -> DMatrix<f64> {
    c1.tr_mul(c2) + c2.tr_mul(c1)
}

/// Eigenpairs of a Hamiltonian sorted by energy.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub energies: DVector<f64>,
    /// Eigenvectors as columns, in the order of `energies`.
    pub states: DMatrix<f64>,
}

impl Spectrum {
    pub fn ground_energy(&self) -> f64 {
        self.energies[0]
    }
}

pub fn diagonalize(h: &DMatrix<f64>) -> Spectrum {
    let eig = h.clone().symmetric_eigen();
    let order = (0..eig.eigenvalues.len())
        .sorted_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]))
        .collect_vec();

    let energies = DVector::from_iterator(order.len(), order.iter().map(|&k| eig.eigenvalues[k]));
    let columns = order.iter().map(|&k| eig.eigenvectors.column(k)).collect_vec();
    Spectrum {
        energies,
        states: DMatrix::from_columns(&columns),
    }
}

/// `(residue, pole)` pairs of the Lehmann representation of `<<d; c^+>>`,
/// keeping only transitions that carry weight.
///
/// `c_dag` is the creation operator; `d` defaults to its adjoint, giving
/// the diagonal Green's function of that orbital.
pub fn lehmann_poles(
    spectrum: &Spectrum,
    c_dag: &DMatrix<f64>,
    beta: f64,
    d: Option<&DMatrix<f64>>,
) -> Vec<(f64, f64)> {
    let e = &spectrum.energies;
    let v = &spectrum.states;
    let e0 = spectrum.ground_energy();
    let weights: Vec<f64> = e.iter().map(|&en| (-beta * (en - e0)).exp()).collect();
    let partition: f64 = weights.iter().sum();

    let create = v.tr_mul(&(c_dag * v));
    let overlap = match d {
        Some(d) => v.tr_mul(&(d.transpose() * v)).component_mul(&create),
        None => create.component_mul(&create),
    };

    (0..e.len())
        .cartesian_product(0..e.len())
        .filter_map(|(i, j)| {
            let residue = overlap[(i, j)] * (weights[i] + weights[j]) / partition;
            (residue.abs() > 1e-14).then(|| (residue, e[i] - e[j]))
        })
        .collect()
}

/// Lehmann representation of `<<d; c^+>>` at the frequencies `omega`.
///
/// Any complex frequency is accepted: `w + i eta` for retarded spectra,
/// `i w_n` on the Matsubara axis. See [`lehmann_poles`] for `c_dag` and `d`.
pub fn gf_lehmann(
    spectrum: &Spectrum,
    c_dag: &DMatrix<f64>,
    beta: f64,
    omega: &[Complex64],
    d: Option<&DMatrix<f64>>,
) -> Vec<Complex64> {
    let poles = lehmann_poles(spectrum, c_dag, beta, d);
    omega
        .par_iter()
        .map(|&z| poles.iter().map(|&(r, p)| r / (z - p)).sum::<Complex64>())
        .collect()
}

/// Isolated dimer in the local basis, orbitals `[a_up, a_dw, b_up, b_dw]`:
///
/// `H = U sum_i (n_i,up - 1/2)(n_i,dw - 1/2) - mu N + tp sum_s (a_s^+ b_s + h.c.)`.
///
/// Returns the Hamiltonian and the annihilation operators.
pub fn dimer_hamiltonian(u_int: f64, mu: f64, tp: f64) -> Result<(DMatrix<f64>, Vec<DMatrix<f64>>), DmftError> {
    let fock = FockSpace::new(4)?;
    let ops = fock.annihilators().to_vec();
    let h = dimer_terms(&fock, &ops, u_int, mu, tp);
    Ok((h, ops))
}

/// Isolated dimer in the bonding basis, orbitals
/// `[s_up, s_dw, as_up, as_dw]` with `a = (s + as)/sqrt 2`,
/// `b = (s - as)/sqrt 2`. Same physics as [`dimer_hamiltonian`]; the
/// hopping term is diagonal here.
pub fn dimer_hamiltonian_bond(
    u_int: f64,
    mu: f64,
    tp: f64,
) -> Result<(DMatrix<f64>, Vec<DMatrix<f64>>), DmftError> {
    let fock = FockSpace::new(4)?;
    let c = fock.annihilators();
    let local = vec![
        (&c[0] + &c[2]) * FRAC_1_SQRT_2,
        (&c[1] + &c[3]) * FRAC_1_SQRT_2,
        (&c[0] - &c[2]) * FRAC_1_SQRT_2,
        (&c[1] - &c[3]) * FRAC_1_SQRT_2,
    ];
    let h = dimer_terms(&fock, &local, u_int, mu, tp);
    Ok((h, c.to_vec()))
}

fn dimer_terms(fock: &FockSpace, local: &[DMatrix<f64>], u_int: f64, mu: f64, tp: f64) -> DMatrix<f64> {
    let half = fock.identity() * 0.5;
    let n: Vec<DMatrix<f64>> = local.iter().map(|c| c.tr_mul(c)).collect();

    let mut h = DMatrix::zeros(fock.dim(), fock.dim());
    for site in [0, 2] {
        h += (&n[site] - &half) * (&n[site + 1] - &half) * u_int;
    }
    for number in &n {
        h -= number * mu;
    }
    h += (hop(&local[0], &local[2]) + hop(&local[1], &local[3])) * tp;
    h
}

/// Two-site Anderson impurity at half filling, orbitals
/// `[d_up, d_dw, c_up, c_dw]`:
///
/// `H = -U/2 (n_d,up + n_d,dw) + U n_d,up n_d,dw + ec (n_c,up + n_c,dw)
///      + V sum_s (d_s^+ c_s + h.c.)`.
pub fn anderson_two_site(u_int: f64, v: f64, ec: f64) -> Result<(DMatrix<f64>, FockSpace), DmftError> {
    let fock = FockSpace::new(4)?;
    let c = fock.annihilators();
    let (nd_up, nd_dw) = (fock.number(0), fock.number(1));

    let mut h = (&nd_up + &nd_dw) * (-0.5 * u_int) + &nd_up * &nd_dw * u_int;
    h += (fock.number(2) + fock.number(3)) * ec;
    h += (hop(&c[0], &c[2]) + hop(&c[1], &c[3])) * v;
    Ok((h, fock))
}
