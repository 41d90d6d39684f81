use thiserror::Error;

#[derive(Debug, Error)]
pub enum QmcError {
    #[error(transparent)]
    Grid(#[from] greens::GreensError),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("singular matrix while rebuilding the Green's function from the Weiss field")]
    SingularMatrix,

    #[error("{what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

impl QmcError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        QmcError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
