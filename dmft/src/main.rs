//! DMFT Command-Line Interface
//!
//! Runs one of the DMFT solvers described by a YAML configuration file.

use color_eyre::eyre::Result;
use dmft::app::DmftApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    DmftApplication::from_cli()?.run()
}
