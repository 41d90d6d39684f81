mod runner;

pub use runner::{run_solver, RunOutput, Summary};

use crate::config::{Args, Config};
use crate::io::{setup_output, write_results};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing::info;

pub struct DmftApplication {
    args: Args,
    config: Config,
}

impl DmftApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args.config_file)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Reading configuration from: {}", self.args.config_file);

        let config = self.config.apply_overrides(&self.args);
        info!("Configuration loaded:\n{:?}", config);

        let output = run_solver(&config).wrap_err("DMFT run failed")?;
        if let Some(report) = output.summary.report {
            info!(
                "Finished after {} loops, converged: {}, last change {:.3e}",
                report.loops, report.converged, report.distance
            );
        }
        write_results(Path::new(config.output_dir()), &output.tables, &output.summary)?;
        Ok(())
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", path))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
