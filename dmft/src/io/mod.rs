//! Input/Output operations for DMFT runs
//!
//! This module handles logging setup and the result files.

mod output;

pub use output::{setup_output, write_results, write_table, Table};
