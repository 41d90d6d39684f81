//! Configuration management for DMFT runs
//!
//! A run is described by a YAML file; missing values are filled by
//! `with_defaults` and a few of them can be overridden from the command
//! line.

mod args;

pub use args::Args;

use qmc::HfParams;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::convergence::LoopControl;
use crate::twosite::Axis;

/// Impurity solver and self-consistency scheme of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Single band IPT on the real axis
    IptReal,
    /// Dimer IPT on the real axis
    DimerReal,
    /// Single band IPT on the Matsubara axis
    IptMatsubara,
    /// Dimer IPT on the Matsubara axis
    DimerMatsubara,
    /// Two-site DMFT sweep over interactions
    TwoSite,
    /// Hirsch-Fye QMC
    HirschFye,
    /// Lehmann spectra of the isolated dimer
    Molecule,
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub solver: SolverKind,
    #[serde(default = "ModelParams::unset")]
    pub model: ModelParams,
    #[serde(default)]
    pub grid: GridParams,
    #[serde(default)]
    pub loop_params: LoopParams,
    pub two_site: Option<TwoSiteParams>,
    pub hirsch_fye: Option<HfParams>,
    pub output_dir: Option<String>,
}

/// Hamiltonian parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelParams {
    pub u_int: Option<f64>,
    pub beta: Option<f64>,
    /// Lattice hopping `t`, half-bandwidth `2 t`
    pub hopping: Option<f64>,
    /// Intra-dimer hopping
    pub tp: Option<f64>,
    pub mu: Option<f64>,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            u_int: Some(2.0),
            beta: Some(100.0),
            hopping: Some(0.5),
            tp: Some(0.3),
            mu: Some(0.0),
        }
    }
}

impl ModelParams {
    /// No value given, every accessor falls back to the defaults.
    pub fn unset() -> Self {
        ModelParams {
            u_int: None,
            beta: None,
            hopping: None,
            tp: None,
            mu: None,
        }
    }

    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.u_int.is_none() {
            self.u_int = defaults.u_int;
        }
        if self.beta.is_none() {
            self.beta = defaults.beta;
        }
        if self.hopping.is_none() {
            self.hopping = defaults.hopping;
        }
        if self.tp.is_none() {
            self.tp = defaults.tp;
        }
        if self.mu.is_none() {
            self.mu = defaults.mu;
        }
        self
    }
}

/// Discretisation of the frequency and time axes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GridParams {
    /// Real axis cut-off
    pub w_max: Option<f64>,
    /// Real axis points, odd
    pub n_freq: Option<usize>,
    /// Broadening of the real axis Weiss fields
    pub eta: Option<f64>,
    pub n_tau: Option<usize>,
    pub n_matsubara: Option<usize>,
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            w_max: Some(4.0),
            n_freq: Some(4097),
            eta: None,
            n_tau: Some(4096),
            n_matsubara: Some(512),
        }
    }
}

impl GridParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.w_max.is_none() {
            self.w_max = defaults.w_max;
        }
        if self.n_freq.is_none() {
            self.n_freq = defaults.n_freq;
        }
        if self.n_tau.is_none() {
            self.n_tau = defaults.n_tau;
        }
        if self.n_matsubara.is_none() {
            self.n_matsubara = defaults.n_matsubara;
        }
        self
    }
}

/// Self-consistency loop parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoopParams {
    pub conv: Option<f64>,
    pub max_loops: Option<usize>,
    pub mixing: Option<f64>,
}

impl Default for LoopParams {
    fn default() -> Self {
        let control = LoopControl::default();
        LoopParams {
            conv: Some(control.conv),
            max_loops: Some(control.max_loops),
            mixing: Some(control.mixing),
        }
    }
}

impl LoopParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.conv.is_none() {
            self.conv = defaults.conv;
        }
        if self.max_loops.is_none() {
            self.max_loops = defaults.max_loops;
        }
        if self.mixing.is_none() {
            self.mixing = defaults.mixing;
        }
        self
    }
}

/// Interaction sweep of the two-site DMFT
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwoSiteParams {
    pub u_values: Option<Vec<f64>>,
    pub axis: Option<Axis>,
}

impl Default for TwoSiteParams {
    fn default() -> Self {
        TwoSiteParams {
            u_values: Some((0..=32).map(|k| k as f64 * 0.1).collect()),
            axis: Some(Axis::Real),
        }
    }
}

impl TwoSiteParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.u_values.is_none() {
            self.u_values = defaults.u_values;
        }
        if self.axis.is_none() {
            self.axis = defaults.axis;
        }
        self
    }
}

impl Config {
    pub fn new(solver: SolverKind) -> Self {
        Config {
            solver,
            model: ModelParams::unset(),
            grid: GridParams::default(),
            loop_params: LoopParams::default(),
            two_site: None,
            hirsch_fye: None,
            output_dir: None,
        }
    }

    /// Apply defaults to all configuration sections
    ///
    /// Physical values missing from `model` are taken from the
    /// `hirsch_fye` section when there is one.
    pub fn with_defaults(mut self) -> Self {
        if self.solver == SolverKind::HirschFye && self.hirsch_fye.is_none() {
            self.hirsch_fye = Some(HfParams::default());
        }
        if let Some(hf) = &self.hirsch_fye {
            let model = &mut self.model;
            model.u_int = model.u_int.or(Some(hf.u_int));
            model.beta = model.beta.or(Some(hf.beta));
            model.hopping = model.hopping.or(Some(hf.hopping));
            model.mu = model.mu.or(Some(hf.mu));
        }
        self.model = self.model.with_defaults();
        self.grid = self.grid.with_defaults();
        self.loop_params = self.loop_params.with_defaults();
        if self.solver == SolverKind::TwoSite || self.two_site.is_some() {
            self.two_site = Some(self.two_site.take().unwrap_or_default().with_defaults());
        }
        if self.output_dir.is_none() {
            self.output_dir = Some("dmft_out".to_string());
        }
        self
    }

    /// Command-line values take precedence over the file.
    pub fn apply_overrides(mut self, args: &Args) -> Self {
        if let Some(u) = args.u_int {
            info!("Overriding u_int with: {}", u);
            self.model.u_int = Some(u);
        }
        if let Some(beta) = args.beta {
            info!("Overriding beta with: {}", beta);
            self.model.beta = Some(beta);
        }
        if let Some(conv) = args.conv {
            info!("Overriding conv with: {}", conv);
            self.loop_params.conv = Some(conv);
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = Some(dir.clone());
        }
        self
    }

    pub fn u_int(&self) -> f64 {
        self.model.u_int.unwrap_or(2.0)
    }

    pub fn beta(&self) -> f64 {
        self.model.beta.unwrap_or(100.0)
    }

    pub fn hopping(&self) -> f64 {
        self.model.hopping.unwrap_or(0.5)
    }

    pub fn tp(&self) -> f64 {
        self.model.tp.unwrap_or(0.3)
    }

    pub fn mu(&self) -> f64 {
        self.model.mu.unwrap_or(0.0)
    }

    pub fn loop_control(&self) -> LoopControl {
        let defaults = LoopControl::default();
        LoopControl {
            conv: self.loop_params.conv.unwrap_or(defaults.conv),
            max_loops: self.loop_params.max_loops.unwrap_or(defaults.max_loops),
            mixing: self.loop_params.mixing.unwrap_or(defaults.mixing),
            ..defaults
        }
    }

    pub fn output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or("dmft_out")
    }

    /// Monte Carlo parameters with the model section taking precedence
    /// over the QMC one for the shared physical values. Call after
    /// [`Config::with_defaults`].
    pub fn hirsch_fye_params(&self) -> HfParams {
        let mut params = self.hirsch_fye.clone().unwrap_or_default();
        params.u_int = self.u_int();
        params.beta = self.beta();
        params.hopping = self.hopping();
        params.mu = self.mu();
        params
    }
}
