use thiserror::Error;

/// Errors raised while building grids or transforming Green's functions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GreensError {
    #[error("inverse temperature must be positive, got {0}")]
    NonPositiveBeta(f64),

    #[error("grid needs at least {min} points, got {got}")]
    TooFewPoints { min: usize, got: usize },

    #[error("real frequency grid must have an odd number of points, got {0}")]
    EvenRealGrid(usize),

    #[error("frequency cutoff must be positive, got {0}")]
    NonPositiveCutoff(f64),

    #[error("{n_tau} time slices cannot resolve {n_matsubara} Matsubara frequencies")]
    UnderResolvedTau { n_tau: usize, n_matsubara: usize },

    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}
