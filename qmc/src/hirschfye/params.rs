use serde::{Deserialize, Serialize};

use crate::error::QmcError;

/// Parameters of a Hirsch-Fye run and of the DMFT loop around it.
///
/// Sweep counts are only ever read from configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HfParams {
    pub beta: f64,
    pub u_int: f64,
    /// Chemical potential
    pub mu: f64,
    /// Bethe lattice hopping, half-bandwidth `2 t`
    pub hopping: f64,
    /// Slices of the fine time grid used by the Fourier transforms
    pub n_tau: usize,
    pub n_matsubara: usize,
    /// Monte Carlo time slices `L`
    pub n_tau_mc: usize,
    pub sweeps: usize,
    /// Sweeps discarded before measuring
    pub therm: usize,
    /// Sweeps between two measurements
    pub n_meas: usize,
    pub seed: u64,
    /// Attempt to flip every field at once after each sweep
    pub global_flip: bool,
    /// Sweeps between recomputations of the Green's function from scratch;
    /// 0 disables them
    pub recompute_every: usize,
    pub bands: usize,
    /// DMFT iterations around the solver
    pub n_iter: usize,
}

impl Default for HfParams {
    fn default() -> Self {
        HfParams {
            beta: 16.0,
            u_int: 2.0,
            mu: 0.0,
            hopping: 0.5,
            n_tau: 2048,
            n_matsubara: 64,
            n_tau_mc: 32,
            sweeps: 5000,
            therm: 1000,
            n_meas: 3,
            seed: 4213,
            global_flip: false,
            recompute_every: 100,
            bands: 1,
            n_iter: 8,
        }
    }
}

impl HfParams {
    pub fn dtau_mc(&self) -> f64 {
        self.beta / self.n_tau_mc as f64
    }

    pub fn validate(&self) -> Result<(), QmcError> {
        if self.beta <= 0.0 {
            return Err(QmcError::invalid("beta", format!("must be positive, got {}", self.beta)));
        }
        if self.n_tau_mc < 2 {
            return Err(QmcError::invalid(
                "n_tau_mc",
                format!("need at least 2 slices, got {}", self.n_tau_mc),
            ));
        }
        if self.n_meas == 0 {
            return Err(QmcError::invalid("n_meas", "must be at least 1"));
        }
        if self.sweeps == 0 {
            return Err(QmcError::invalid("sweeps", "must be at least 1"));
        }
        if self.bands == 0 {
            return Err(QmcError::invalid("bands", "must be at least 1"));
        }
        Ok(())
    }
}
