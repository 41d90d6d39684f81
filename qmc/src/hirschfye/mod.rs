//! Hirsch-Fye algorithm.
//!
//! Imaginary time is cut into `L` slices of width `dtau`; the Hubbard
//! interaction on each slice is decoupled by discrete Ising fields. For a
//! fixed field configuration the impurity Green's function follows from the
//! Weiss field by a Dyson-like equation, and single field flips update it
//! with a rank-one correction.
//!
//! Green's function matrices follow the `-G` convention:
//! `g[(i, j)] = -G(tau_i - tau_j)` with the antiperiodic continuation
//! for `i < j`.

pub mod dmft;
pub mod fields;
pub mod params;
pub mod setup;
pub mod solver;
pub mod weiss;

pub use dmft::{dmft_loop, HfDmftSolution, IterationRecord};
pub use fields::{interaction_matrix, ising_lambda, ising_v};
pub use params::HfParams;
pub use setup::{bethe_weiss, setup_pm_sim, weiss_slices, PmSetup};
pub use solver::{imp_solver, time_average, ImpuritySolution};
pub use weiss::{gnew, gnewclean, retarded_weiss};

#[cfg(test)]
mod tests;
