//! Green's function primitives shared by the DMFT solvers.
//!
//! Grids on the real-frequency, Matsubara and imaginary-time axes, Fourier
//! transforms between the last two with high-frequency tail subtraction,
//! Hilbert transforms of the Bethe lattice and FFT based convolutions.

pub mod convolve;
pub mod error;
pub mod fourier;
pub mod grid;
pub mod helper;
pub mod hilbert;

#[cfg(test)]
mod fourier_test;

pub use num_complex::Complex64;

pub use convolve::fft_convolve_same;
pub use error::GreensError;
pub use fourier::{gt_fouriertrans, gw_invfouriertrans, interpol, Tail};
pub use grid::{fermi_dist, matsubara_freq, tau_wn_setup, RealFrequencyGrid, TauGrid};
pub use helper::{all_close, all_close_real, max_distance};
pub use hilbert::{bethe_dos, greenf_matsubara, kramers_kronig, semi_circle_hiltrans};
