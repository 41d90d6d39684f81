use itertools::Itertools;
use nalgebra::DMatrix;
use rand::Rng;

/// Coupling of the discrete Hubbard-Stratonovich decoupling,
/// `cosh(lambda) = exp(dtau U / 2)`.
pub fn ising_lambda(dtau: f64, u_int: f64) -> f64 {
    (0.5 * dtau * u_int).exp().acosh()
}

/// Random initial configuration of `fields` auxiliary Ising fields on
/// `slices` time slices, stored as `fields x slices` values `+-lambda`.
pub fn ising_v<R: Rng + ?Sized>(
    dtau: f64,
    u_int: f64,
    slices: usize,
    fields: usize,
    rng: &mut R,
) -> DMatrix<f64> {
    let lambda = ising_lambda(dtau, u_int);
    DMatrix::from_fn(fields, slices, |_, _| {
        if rng.gen::<f64>() > 0.5 {
            lambda
        } else {
            -lambda
        }
    })
}

/// Coupling signs between spin-orbitals (rows) and auxiliary fields
/// (columns): one field per pair of spin-orbitals, entering with `+1` for
/// the first member of the pair and `-1` for the second.
///
/// For a single band this is `[[1], [-1]]`, spin up then spin down.
pub fn interaction_matrix(bands: usize) -> DMatrix<f64> {
    let particles = 2 * bands;
    let pairs = (0..particles).tuple_combinations::<(usize, usize)>().collect_vec();
    let mut intm = DMatrix::zeros(particles, pairs.len());
    for (field, &(i, j)) in pairs.iter().enumerate() {
        intm[(i, field)] = 1.0;
        intm[(j, field)] = -1.0;
    }
    intm
}
