//! Integration tests for the rxdose binary.
//!
//! These tests verify end-to-end behavior including:
//! - Registry loading and fatal data source errors
//! - Single, multi and free-text recommendations
//! - Patient profile persistence and defaulting

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FOUR_DRUG_CSV: &str = "\
Generic Name ,Drug Class,Common Uses,Side Effects,Contraindications,Adult Dose
Metformin,Biguanide,Type 2 diabetes,Nausea,Renal impairment,500 mg
Lisinopril,ACE inhibitor,Hypertension,Cough,Angioedema,10 mg
Aspirin,NSAID,Pain,GI bleeding,Bleeding disorders,81 mg
Ibuprofen,NSAID,Inflammation,Dyspepsia,Peptic ulcer,200-400 mg
";

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI isolated from the user's real config and data directories
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rxdose"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env("XDG_DATA_HOME", dir.join("data"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir);
    cmd
}

fn write_db(dir: &Path) {
    fs::write(dir.join("dbs.csv"), FOUR_DRUG_CSV).expect("Failed to write db");
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Medication lookup and pediatric dosage recommendations",
        ));
}

#[test]
fn test_missing_database_is_fatal() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("drug database not found"));
}

#[test]
fn test_dashboard_counts_medications() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total medications: 4"));
}

#[test]
fn test_list_is_sorted() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout("Aspirin\nIbuprofen\nLisinopril\nMetformin\n");
}

#[test]
fn test_explicit_db_path() {
    let temp_dir = setup_test_dir();
    let db_path = temp_dir.path().join("elsewhere.csv");
    fs::write(&db_path, FOUR_DRUG_CSV).unwrap();

    cli(temp_dir.path())
        .arg("--db")
        .arg(&db_path)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Metformin"));
}

#[test]
fn test_check_single_drug() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["check", "ibuprofen", "--age", "0", "--weight", "70"])
        .assert()
        .success()
        .stdout(predicate::str::contains("── Ibuprofen ──"))
        .stdout(predicate::str::contains("Drug Class: NSAID"))
        .stdout(predicate::str::contains("Clark's Rule (weight-based): 200 mg"))
        .stdout(predicate::str::contains("Young's Rule (age-based): 0 mg"));
}

#[test]
fn test_check_unknown_drug_is_not_an_error() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["check", "Unobtainium"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drug 'Unobtainium' not found"));
}

#[test]
fn test_check_json_output() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    let output = cli(temp_dir.path())
        .args(["--json", "check", "Aspirin", "--age", "30", "--weight", "35"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let result = &value[0];
    assert_eq!(result["status"], "found");
    assert_eq!(result["drug"]["generic_name"], "Aspirin");
    assert_eq!(result["adult_dose_mg"], 81.0);
    assert_eq!(result["recommendations"]["Clark's Rule (weight-based)"], 40.5);
    assert_eq!(result["recommendations"]["Young's Rule (age-based)"], 57.86);
}

#[test]
fn test_weight_must_be_positive() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["check", "Aspirin", "--weight", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight must be greater than 0"));
}

#[test]
fn test_age_out_of_range_rejected() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["check", "Aspirin", "--age", "121"])
        .assert()
        .failure();
}

#[test]
fn test_multi_keeps_selection_order() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    let output = cli(temp_dir.path())
        .args(["--json", "multi", "Lisinopril", "Nope", "Aspirin"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let statuses: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["found", "not_found", "found"]);
    assert_eq!(value[0]["drug"]["generic_name"], "Lisinopril");
    assert_eq!(value[1]["name"], "Nope");
}

#[test]
fn test_parse_sample_prescription() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["parse", "--sample"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 medication(s)"))
        .stdout(predicate::str::contains("── Metformin ──"))
        .stdout(predicate::str::contains("── Ibuprofen ──").not());
}

#[test]
fn test_parse_reads_file_and_stdin() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());
    let ocr_path = temp_dir.path().join("ocr.txt");
    fs::write(&ocr_path, "Rx: IBUPROFEN 400mg prn").unwrap();

    cli(temp_dir.path())
        .arg("parse")
        .arg("--file")
        .arg(&ocr_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 medication(s)"));

    cli(temp_dir.path())
        .arg("parse")
        .write_stdin("lisinopril 10mg daily")
        .assert()
        .success()
        .stdout(predicate::str::contains("── Lisinopril ──"));
}

#[test]
fn test_parse_without_matches() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["parse", "--text", "Paracetamol 500mg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No medications found"));
}

#[test]
fn test_parse_input_sources_conflict() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["parse", "--sample", "--text", "Aspirin"])
        .assert()
        .failure();
}

#[test]
fn test_sample_db_flag() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["--sample-db", "parse", "--text", "Apply hydrocortisone cream"])
        .assert()
        .success()
        .stdout(predicate::str::contains("── Hydrocortisone ──"))
        .stdout(predicate::str::contains("── Cortisone ──"));
}

#[test]
fn test_profile_save_and_show() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "profile", "save", "--age", "8", "--weight", "26", "--height", "128",
            "--condition", "Asthma", "--allergy", "Penicillin",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile saved"));

    assert!(temp_dir.path().join("profiles.json").exists());

    cli(temp_dir.path())
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Age: 8"))
        .stdout(predicate::str::contains("Conditions: Asthma"))
        .stdout(predicate::str::contains("Allergies: Penicillin"));
}

#[test]
fn test_profile_rejects_unknown_condition() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "profile", "save", "--age", "8", "--weight", "26", "--height", "128",
            "--condition", "Gout",
        ])
        .assert()
        .failure();
}

#[test]
fn test_saved_profile_supplies_patient_defaults() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["profile", "save", "--age", "12", "--weight", "35", "--height", "150"])
        .assert()
        .success();

    // Lisinopril 10 mg: Clark 35/70*10 = 5, Young 12/24*10 = 5
    cli(temp_dir.path())
        .args(["check", "Lisinopril"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Patient: 12 years, 35 kg"))
        .stdout(predicate::str::contains("Clark's Rule (weight-based): 5 mg"));

    // flag overrides the profile for that field only
    cli(temp_dir.path())
        .args(["check", "Lisinopril", "--weight", "70"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Patient: 12 years, 70 kg"));
}

#[test]
fn test_config_defaults_without_profile() {
    let temp_dir = setup_test_dir();
    write_db(temp_dir.path());

    cli(temp_dir.path())
        .args(["check", "Aspirin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Patient: 30 years, 70 kg"));
}
