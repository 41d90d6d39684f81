//! Output formatting and logging utilities

use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let duration = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup output logging to file or stdout
pub fn setup_output(output_path: Option<&String>) {
    match output_path {
        Some(path) => match File::create(path) {
            Ok(log) => {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false);
                Registry::default().with(file_layer).init();
                info!("Output will be written to: {}", path);
            }
            Err(err) => eprintln!("Could not create output file {}: {}", path, err),
        },
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
            info!("Output will be printed to stdout");
        }
    }
}

/// Named columns of equal length, written as a whitespace separated table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub header: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            header: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, label: impl Into<String>, values: Vec<f64>) -> Self {
        self.header.push(label.into());
        self.columns.push(values);
        self
    }

    pub fn rows(&self) -> usize {
        self.columns.iter().map(Vec::len).min().unwrap_or(0)
    }
}

pub fn write_table<W: Write>(writer: &mut W, table: &Table) -> Result<()> {
    writeln!(writer, "# {}", table.header.join(" "))?;
    for row in 0..table.rows() {
        let line: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{:>20.12e}", c[row]))
            .collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    Ok(())
}

/// Writes every table to `<dir>/<name>.dat` and the summary to
/// `<dir>/summary.json`.
pub fn write_results<S: Serialize>(dir: &Path, tables: &[Table], summary: &S) -> Result<()> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Unable to create output directory: {}", dir.display()))?;
    for table in tables {
        let path = dir.join(format!("{}.dat", table.name));
        let file = File::create(&path)
            .wrap_err_with(|| format!("Unable to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_table(&mut writer, table)?;
        writer.flush()?;
        info!("Wrote {} rows to {}", table.rows(), path.display());
    }
    let path = dir.join("summary.json");
    let file = File::create(&path).wrap_err_with(|| format!("Unable to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, summary).wrap_err("Failed to serialize the run summary")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let table = Table::new("g")
            .column("w", vec![-1.0, 0.0, 1.0])
            .column("A", vec![0.1, 0.2, 0.1]);
        let mut buffer = Vec::new();
        write_table(&mut buffer, &table).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "# w A");
        let values: Vec<f64> = lines[2]
            .split_whitespace()
            .map(|x| x.parse().unwrap())
            .collect();
        assert_eq!(values, vec![0.0, 0.2]);
    }

    #[test]
    fn test_ragged_columns_are_cut() {
        let table = Table::new("t").column("a", vec![1.0, 2.0]).column("b", vec![3.0]);
        assert_eq!(table.rows(), 1);
    }
}
