//! Integration tests for the mycometric binary.
//!
//! These tests verify end-to-end behavior including:
//! - Dosage calculation from flags and config defaults
//! - JSON output shape
//! - Listing and lookup commands
//! - Config file creation

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("mycometric"))
}

/// Writes a config file into a fresh temp dir so tests never read the
/// user's real configuration.
fn setup_config(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, contents).expect("Failed to write config");
    (temp_dir, path)
}

fn calc_json(config: &Path, args: &[&str]) -> Value {
    let output = cli()
        .arg("--config")
        .arg(config)
        .arg("calc")
        .args(args)
        .arg("--json")
        .output()
        .expect("Failed to run mycometric");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Output is not JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Psilocybin dosage calculator"));
}

#[test]
fn test_default_command_uses_config_defaults() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("MODERATE DOSE"))
        .stdout(predicate::str::contains("Psilocybe cubensis (dried)"))
        .stdout(predicate::str::contains("2.60 g"));
}

#[test]
fn test_calc_json_moderate_cubensis() {
    let (_dir, config) = setup_config("");
    let result = calc_json(&config, &["--species", "psilocybe_cubensis"]);

    assert_eq!(result["unit"], "g");
    assert_eq!(result["amount"]["median"], 2.6);
    assert_eq!(result["confidence"], "low");
    assert_eq!(result["calculation_breakdown"]["after_maoi"], 16.0);
}

#[test]
fn test_calc_maoi_halves_and_warns() {
    let (_dir, config) = setup_config("");
    let result = calc_json(&config, &["--maoi"]);

    assert_eq!(result["amount"]["median"], 1.3);
    let warnings = result["warnings"].as_array().unwrap();
    assert!(warnings.iter().any(|w| w["severity"] == "danger"));
}

#[test]
fn test_calc_synthetic_in_milligrams() {
    let (_dir, config) = setup_config("");
    let result = calc_json(&config, &["--compound", "4_aco_dmt"]);

    assert_eq!(result["unit"], "mg");
    assert_eq!(result["confidence"], "high");
    assert_eq!(result["amount"]["median"], 14.5);
}

#[test]
fn test_calc_sclerotia_category_is_inferred() {
    let (_dir, config) = setup_config("");
    let result = calc_json(
        &config,
        &[
            "--species",
            "psilocybe_tampanensis_sclerotia",
            "--fresh",
            "--intensity",
            "light",
        ],
    );

    assert_eq!(result["unit"], "g");
    assert_eq!(result["confidence"], "high");
    let notes = result["notes"].as_array().unwrap();
    assert!(notes
        .iter()
        .any(|n| n == "Fresh material: 3x weight compared to dried"));
}

#[test]
fn test_calc_tolerance_applied() {
    let (_dir, config) = setup_config("");
    let result = calc_json(&config, &["--last-dose-mg", "25", "--days-since", "2.8"]);

    assert_eq!(result["tolerance_multiplier"], 1.6);
    assert_eq!(result["citations"].as_array().unwrap().len(), 2);
}

#[test]
fn test_calc_partial_tolerance_is_ignored() {
    let (_dir, config) = setup_config("");
    let result = calc_json(&config, &["--last-dose-mg", "25"]);

    assert_eq!(result["tolerance_multiplier"], 1.0);
}

#[test]
fn test_calc_weight_from_config() {
    let (_dir, config) = setup_config(
        r#"
[defaults]
body_weight_kg = 84.0
use_weight_adjustment = true
"#,
    );
    let result = calc_json(&config, &[]);

    assert_eq!(result["calculation_breakdown"]["weight_factor"], 1.2);
    assert_eq!(result["calculation_breakdown"]["after_weight_adjustment"], 19.2);
}

#[test]
fn test_config_json_output_format() {
    let (_dir, config) = setup_config(
        r#"
[output]
format = "json"
"#,
    );
    let output = cli().arg("--config").arg(&config).output().unwrap();
    assert!(output.status.success());
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["unit"], "g");
}

#[test]
fn test_unknown_species_fails() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("calc")
        .arg("--species")
        .arg("amanita_muscaria")
        .assert()
        .failure()
        .stderr(predicate::str::contains("amanita_muscaria"));
}

#[test]
fn test_unknown_compound_fails() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("calc")
        .arg("--compound")
        .arg("mescaline")
        .assert()
        .failure();
}

#[test]
fn test_storage_loss_out_of_range_rejected() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("calc")
        .arg("--storage-loss")
        .arg("80")
        .assert()
        .failure();
}

#[test]
fn test_storage_loss_note() {
    let (_dir, config) = setup_config("");
    let result = calc_json(&config, &["--storage-loss", "20"]);

    let notes = result["notes"].as_array().unwrap();
    assert!(notes
        .iter()
        .any(|n| n == "Storage degradation: 20% potency loss assumed"));
}

#[test]
fn test_species_listing() {
    let (_dir, config) = setup_config("");

    let output = cli()
        .arg("--config")
        .arg(&config)
        .arg("species")
        .arg("--category")
        .arg("sclerotia")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let species: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(species.as_array().unwrap().len(), 2);
}

#[test]
fn test_compounds_listing() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("compounds")
        .assert()
        .success()
        .stdout(predicate::str::contains("4-AcO-DMT (Psilacetin)"));
}

#[test]
fn test_intensities_listing() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("intensities")
        .assert()
        .success()
        .stdout(predicate::str::contains("35-50mg psilocybin-equivalent"));
}

#[test]
fn test_tolerance_status() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("tolerance")
        .arg("--days")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tolerance: 150%"))
        .stdout(predicate::str::contains("Significant tolerance"));
}

#[test]
fn test_tolerance_requires_timing() {
    cli().arg("tolerance").assert().failure();
}

#[test]
fn test_tolerance_from_last_dose_date() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("tolerance")
        .arg("--last-dose-on")
        .arg("2000-01-01")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tolerance: 0%"))
        .stdout(predicate::str::contains("Full baseline sensitivity restored."));
}

#[test]
fn test_composition() {
    let (_dir, config) = setup_config("");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("composition")
        .arg("psilocybe_azurescens")
        .assert()
        .success()
        .stdout(predicate::str::contains("Psilocybin:  17.8"));
}

#[test]
fn test_config_init_writes_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("mycometric").join("config.toml");

    cli()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("psilocybe_cubensis"));

    cli()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_config_init_force_replaces_invalid_config() {
    let (_dir, config) = setup_config(
        r#"
[defaults]
species = "psilocybe_imaginaria"
"#,
    );

    cli()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .arg("show")
        .assert()
        .failure();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .arg("init")
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    cli()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("psilocybe_cubensis"));
}

#[test]
fn test_invalid_config_species_rejected() {
    let (_dir, config) = setup_config(
        r#"
[defaults]
species = "psilocybe_imaginaria"
"#,
    );

    cli()
        .arg("--config")
        .arg(&config)
        .arg("intensities")
        .assert()
        .failure();
}
