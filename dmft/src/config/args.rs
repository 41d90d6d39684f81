//! Command-line argument parsing for DMFT runs

use clap::Parser;

/// DMFT solvers for the Hubbard model and the Hubbard dimer, driven by a
/// YAML configuration
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output log file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the directory receiving result tables
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Override the local interaction U
    #[arg(long)]
    pub u_int: Option<f64>,

    /// Override the inverse temperature
    #[arg(long)]
    pub beta: Option<f64>,

    /// Override the convergence threshold of the self-consistency loop
    #[arg(long)]
    pub conv: Option<f64>,
}
