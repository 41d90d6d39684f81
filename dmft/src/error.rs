use thiserror::Error;

/// Failures of the DMFT solvers that are not plain non-convergence.
#[derive(Debug, Error)]
pub enum DmftError {
    #[error(transparent)]
    Grid(#[from] greens::GreensError),

    #[error(transparent)]
    MonteCarlo(#[from] qmc::QmcError),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("impurity Green's function vanishes at w = {0}, self-energy undefined")]
    SingularGreensFunction(f64),
}

impl DmftError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        DmftError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
