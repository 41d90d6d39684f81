//! Dynamical mean-field theory solvers for the Hubbard model on the Bethe
//! lattice and for the Hubbard dimer.

pub mod app;
pub mod config;
pub mod convergence;
pub mod dimer;
pub mod dimer_real;
pub mod ed;
pub mod error;
pub mod io;
pub mod ipt_imag;
pub mod ipt_real;
pub mod twosite;

pub use config::{Args, Config, SolverKind};
pub use convergence::{iterate, FixedPoint, LoopControl, LoopReport};
pub use error::DmftError;
pub use ipt_real::{ph_hf_sigma, sigma, ss_dmft_loop, RealIptParams};
