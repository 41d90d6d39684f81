use dmft::app::{load_config, run_solver};
use dmft::io::write_results;
use dmft::SolverKind;
use std::fs;
use std::io::Write;

fn config_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_two_site_run_writes_results() {
    let file = config_file(
        "
solver: two_site
model:
  beta: 100000.0
loop_params:
  conv: 1.0e-10
  max_loops: 20000
two_site:
  u_values: [0.0, 1.5, 2.0]
  axis: matsubara
",
    );
    let config = load_config(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.solver, SolverKind::TwoSite);
    let output = run_solver(&config).unwrap();
    assert_eq!(output.tables.len(), 1);
    let z = &output.tables[0].columns[1];
    assert!((z[0] - 1.0).abs() < 1e-5);
    assert!((z[1] - 0.75).abs() < 1e-5);
    assert!((z[2] - 0.55556).abs() < 1e-5);

    let dir = tempfile::tempdir().unwrap();
    write_results(dir.path(), &output.tables, &output.summary).unwrap();
    let table = fs::read_to_string(dir.path().join("two_site.dat")).unwrap();
    assert_eq!(table.lines().count(), 4);
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["solver"], "two_site");
    assert!(summary["report"].is_null());
}

#[test]
fn test_matsubara_ipt_run_reports_convergence() {
    let file = config_file(
        "
solver: ipt_matsubara
model:
  u_int: 1.0
  beta: 50.0
grid:
  n_tau: 1024
  n_matsubara: 128
loop_params:
  conv: 1.0e-6
",
    );
    let config = load_config(file.path().to_str().unwrap()).unwrap();
    let output = run_solver(&config).unwrap();
    let report = output.summary.report.unwrap();
    assert!(report.converged);
    let table = &output.tables[0];
    assert_eq!(table.rows(), 128);
    // particle-hole symmetry: Re G vanishes, Im G is negative
    assert!(table.columns[1].iter().all(|x| x.abs() < 1e-8));
    assert!(table.columns[2].iter().all(|&x| x < 0.0));
}

#[test]
fn test_molecule_spectrum_is_normalised() {
    let file = config_file(
        "
solver: molecule
model:
  u_int: 1.0
  tp: 0.3
  beta: 50.0
grid:
  w_max: 4.0
  n_freq: 8001
  eta: 0.01
",
    );
    let config = load_config(file.path().to_str().unwrap()).unwrap();
    let output = run_solver(&config).unwrap();
    let table = &output.tables[0];
    let w = &table.columns[0];
    let a = &table.columns[5];
    let dw = w[1] - w[0];
    let norm: f64 = a.iter().sum::<f64>() * dw;
    assert!((norm - 1.0).abs() < 1e-2, "norm = {}", norm);
    assert!(a.iter().all(|&x| x >= 0.0));
}

#[test]
fn test_missing_config_file_is_reported() {
    assert!(load_config("/nonexistent/dmft.yaml").is_err());
}

#[test]
fn test_example_configs_parse() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("example");
    let mut count = 0;
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().map_or(false, |e| e == "yaml") {
            let config = load_config(path.to_str().unwrap()).unwrap();
            assert!(config.output_dir.is_some());
            count += 1;
        }
    }
    assert_eq!(count, 4);
}
