//! Hirsch-Fye quantum Monte Carlo for Anderson impurity problems.

pub mod error;
pub mod hirschfye;

pub use error::QmcError;
pub use hirschfye::{
    dmft_loop, gnew, gnewclean, imp_solver, interaction_matrix, ising_v, retarded_weiss,
    setup_pm_sim, HfDmftSolution, HfParams, ImpuritySolution, IterationRecord, PmSetup,
};
