//! DMFT solvers for the Hubbard model and the Hubbard dimer.
//!
//! The work is split over three crates: `greens` (grids, transforms),
//! `dmft` (IPT, two-site and exact diagonalisation solvers) and `qmc`
//! (Hirsch-Fye). This crate re-exports them and keeps the types most
//! scripts need at the top level.

pub use dmft;
pub use greens;
pub use qmc;

pub use dmft::{DmftError, LoopControl, LoopReport};
pub use greens::{Complex64, RealFrequencyGrid, TauGrid};
pub use nalgebra::DMatrix;
pub use qmc::{HfParams, QmcError};
