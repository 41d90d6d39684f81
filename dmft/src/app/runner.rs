use greens::{greenf_matsubara, tau_wn_setup, Complex64, RealFrequencyGrid};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::config::{Config, SolverKind};
use crate::convergence::LoopReport;
use crate::dimer::{dimer_seed as matsubara_dimer_seed, ipt_dmft_loop};
use crate::dimer_real::{dimer_dmft, dimer_seed, DimerRealParams, DIMER_ETA};
use crate::ed::{diagonalize, dimer_hamiltonian, gf_lehmann};
use crate::error::DmftError;
use crate::io::Table;
use crate::ipt_imag;
use crate::ipt_real::{metallic_seed, spectral_function, ss_dmft_loop, RealIptParams};
use crate::twosite;

/// What a run reports besides its tables.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub solver: SolverKind,
    pub u_int: f64,
    pub beta: f64,
    pub report: Option<LoopReport>,
    /// Single flip acceptance of the last Monte Carlo iteration
    pub acceptance: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub tables: Vec<Table>,
    pub summary: Summary,
}

fn re(values: &[Complex64]) -> Vec<f64> {
    values.iter().map(|z| z.re).collect()
}

fn im(values: &[Complex64]) -> Vec<f64> {
    values.iter().map(|z| z.im).collect()
}

fn real_grid(config: &Config) -> Result<RealFrequencyGrid, DmftError> {
    let w_max = config.grid.w_max.unwrap_or(4.0);
    let n_freq = config.grid.n_freq.unwrap_or(4097);
    Ok(RealFrequencyGrid::symmetric(w_max, n_freq)?)
}

fn matsubara_grids(config: &Config) -> Result<(Vec<f64>, Vec<f64>), DmftError> {
    let n_tau = config.grid.n_tau.unwrap_or(4096);
    let n_matsubara = config.grid.n_matsubara.unwrap_or(512);
    Ok(tau_wn_setup(config.beta(), n_tau, n_matsubara)?)
}

fn summary(config: &Config, report: Option<LoopReport>) -> Summary {
    Summary {
        solver: config.solver,
        u_int: config.u_int(),
        beta: config.beta(),
        report,
        acceptance: None,
    }
}

/// Dispatches on the configured solver.
pub fn run_solver(config: &Config) -> Result<RunOutput, DmftError> {
    info!("Running {:?} with U = {}, beta = {}", config.solver, config.u_int(), config.beta());
    match config.solver {
        SolverKind::IptReal => run_ipt_real(config),
        SolverKind::DimerReal => run_dimer_real(config),
        SolverKind::IptMatsubara => run_ipt_matsubara(config),
        SolverKind::DimerMatsubara => run_dimer_matsubara(config),
        SolverKind::TwoSite => run_two_site(config),
        SolverKind::HirschFye => run_hirsch_fye(config),
        SolverKind::Molecule => run_molecule(config),
    }
}

fn run_ipt_real(config: &Config) -> Result<RunOutput, DmftError> {
    let grid = real_grid(config)?;
    let params = RealIptParams {
        hopping: config.hopping(),
        half_bandwidth: 2.0 * config.hopping(),
        eta: config.grid.eta,
        ..RealIptParams::new(config.u_int(), config.beta())
    };
    let eta = params.eta.unwrap_or(2.0 * grid.dw());
    let seed = metallic_seed(&grid, eta, params.half_bandwidth);
    let solution = ss_dmft_loop(seed, &grid, &params, &config.loop_control())?;

    let table = Table::new("ipt_real")
        .column("w", grid.points().to_vec())
        .column("ReG", re(&solution.gloc))
        .column("ImG", im(&solution.gloc))
        .column("ReSigma", re(&solution.sigma))
        .column("ImSigma", im(&solution.sigma))
        .column("A", spectral_function(&solution.gloc));
    Ok(RunOutput {
        tables: vec![table],
        summary: summary(config, Some(solution.report)),
    })
}

fn run_dimer_real(config: &Config) -> Result<RunOutput, DmftError> {
    let grid = real_grid(config)?;
    let params = DimerRealParams {
        hopping: config.hopping(),
        eta: config.grid.eta.unwrap_or(DIMER_ETA),
        ..DimerRealParams::new(config.u_int(), config.tp(), config.beta())
    };
    let (gss, gsa) = dimer_seed(&grid, &params);
    let solution = dimer_dmft(&grid, gss, gsa, &params, &config.loop_control())?;
    let state = &solution.state;

    let table = Table::new("dimer_real")
        .column("w", grid.points().to_vec())
        .column("ReGss", re(&state.gss))
        .column("ImGss", im(&state.gss))
        .column("ReGsa", re(&state.gsa))
        .column("ImGsa", im(&state.gsa))
        .column("ReSss", re(&state.ss))
        .column("ImSss", im(&state.ss))
        .column("ReSsa", re(&state.sa))
        .column("ImSsa", im(&state.sa))
        .column("Aloc", state.local_spectral());
    Ok(RunOutput {
        tables: vec![table],
        summary: summary(config, Some(solution.report)),
    })
}

fn run_ipt_matsubara(config: &Config) -> Result<RunOutput, DmftError> {
    let (tau, w_n) = matsubara_grids(config)?;
    let hopping = config.hopping();
    // IPT runs at half filling
    let giw = greenf_matsubara(&w_n, 0.0, 2.0 * hopping);
    let solution = ipt_imag::dmft_loop(
        config.u_int(),
        hopping,
        giw,
        &tau,
        &w_n,
        &config.loop_control(),
    )?;

    let table = Table::new("ipt_matsubara")
        .column("w_n", w_n)
        .column("ReG", re(&solution.giw))
        .column("ImG", im(&solution.giw))
        .column("ReSigma", re(&solution.sigma_iw))
        .column("ImSigma", im(&solution.sigma_iw));
    Ok(RunOutput {
        tables: vec![table],
        summary: summary(config, Some(solution.report)),
    })
}

fn run_dimer_matsubara(config: &Config) -> Result<RunOutput, DmftError> {
    let (tau, w_n) = matsubara_grids(config)?;
    let (giw_d, giw_o) = matsubara_dimer_seed(&w_n, 0.0, config.tp(), config.hopping());
    let solution = ipt_dmft_loop(
        config.beta(),
        config.u_int(),
        config.tp(),
        config.hopping(),
        giw_d,
        giw_o,
        &tau,
        &w_n,
        &config.loop_control(),
    )?;

    let table = Table::new("dimer_matsubara")
        .column("w_n", w_n)
        .column("ReGd", re(&solution.giw_d))
        .column("ImGd", im(&solution.giw_d))
        .column("ReGo", re(&solution.giw_o))
        .column("ImGo", im(&solution.giw_o))
        .column("ReSd", re(&solution.sigma_d))
        .column("ImSd", im(&solution.sigma_d))
        .column("ReSo", re(&solution.sigma_o))
        .column("ImSo", im(&solution.sigma_o));
    Ok(RunOutput {
        tables: vec![table],
        summary: summary(config, Some(solution.report)),
    })
}

fn run_two_site(config: &Config) -> Result<RunOutput, DmftError> {
    let params = config.two_site.clone().unwrap_or_default().with_defaults();
    let u_values = params.u_values.unwrap_or_default();
    let axis = params.axis.unwrap_or(twosite::Axis::Real);
    let rows = twosite::dmft_loop(&u_values, axis, config.beta(), config.hopping(), &config.loop_control())?;

    let table = Table::new("two_site")
        .column("U", rows.iter().map(|r| r[0]).collect())
        .column("Z", rows.iter().map(|r| r[1]).collect());
    Ok(RunOutput {
        tables: vec![table],
        summary: summary(config, None),
    })
}

fn run_hirsch_fye(config: &Config) -> Result<RunOutput, DmftError> {
    let params = config.hirsch_fye_params();
    let mut rng = StdRng::seed_from_u64(params.seed);
    let solution = qmc::dmft_loop(&params, &mut rng)?;

    let tables = vec![
        Table::new("hirsch_fye_tau")
            .column("tau", solution.tau_mc.clone())
            .column("G", solution.g_tau.clone()),
        Table::new("hirsch_fye_iw")
            .column("w_n", solution.w_n.clone())
            .column("ReG", re(&solution.giw))
            .column("ImG", im(&solution.giw)),
        Table::new("hirsch_fye_history")
            .column("iteration", solution.history.iter().map(|r| r.iteration as f64).collect())
            .column("distance", solution.history.iter().map(|r| r.distance).collect())
            .column("acceptance", solution.history.iter().map(|r| r.acceptance).collect()),
    ];
    Ok(RunOutput {
        tables,
        summary: Summary {
            acceptance: solution.history.last().map(|r| r.acceptance),
            ..summary(config, None)
        },
    })
}

fn run_molecule(config: &Config) -> Result<RunOutput, DmftError> {
    let grid = real_grid(config)?;
    let eta = config.grid.eta.unwrap_or(DIMER_ETA);
    let (h, ops) = dimer_hamiltonian(config.u_int(), config.mu(), config.tp())?;
    let spectrum = diagonalize(&h);
    info!("Dimer ground state energy: {:.10}", spectrum.ground_energy());

    let omega: Vec<Complex64> = grid.points().iter().map(|&w| Complex64::new(w, eta)).collect();
    let a_dag = ops[0].transpose();
    let g_aa = gf_lehmann(&spectrum, &a_dag, config.beta(), &omega, None);
    let g_ab = gf_lehmann(&spectrum, &a_dag, config.beta(), &omega, Some(&ops[2]));

    let table = Table::new("molecule")
        .column("w", grid.points().to_vec())
        .column("ReGaa", re(&g_aa))
        .column("ImGaa", im(&g_aa))
        .column("ReGab", re(&g_ab))
        .column("ImGab", im(&g_ab))
        .column("Aaa", spectral_function(&g_aa));
    Ok(RunOutput {
        tables: vec![table],
        summary: summary(config, None),
    })
}
