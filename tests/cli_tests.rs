#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The `brrtrouter-codegen` binary end to end

mod common;

use common::Project;
use std::process::Command;

fn codegen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_brrtrouter-codegen"));
    cmd.env_remove("RUST_LOG")
        .env("BRRTR_LOG_LEVEL", "warn")
        .env_remove("BRRTR_GEN_APIS")
        .env_remove("BRRTR_GEN_MODELS")
        .env_remove("BRRTR_GEN_SUPPORTING_FILES");
    cmd
}

#[test]
fn test_cli_generate_writes_output() {
    let project = Project::new();
    let status = codegen()
        .args(["generate", "--spec"])
        .arg(project.spec())
        .status()
        .unwrap();
    assert!(status.success());
    assert!(project.exists("models/pet.rs"));
    assert!(project.exists("apis/pets_api.rs"));
    assert!(project.exists("README.md"));
}

#[test]
fn test_cli_output_override_and_selection() {
    let project = Project::new();
    let target = project.root().join("custom");
    let status = codegen()
        .args(["generate", "--models", "Pet", "--no-model-docs", "-D", "crateName=other"])
        .arg("--spec")
        .arg(project.spec())
        .arg("--output")
        .arg(&target)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(
        std::fs::read_to_string(target.join("models/pet.rs")).unwrap(),
        "pub struct Pet; // other\n"
    );
    assert!(!target.join("models/owner.rs").exists());
    assert!(!target.join("Pet.md").exists());
    assert!(!target.join("apis").exists());
    assert!(!project.out().exists());
}

#[test]
fn test_cli_dry_run_lists_files() {
    let project = Project::new();
    let output = codegen()
        .args(["generate", "--dry-run", "--spec"])
        .arg(project.spec())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("would write"));
    assert!(stdout.contains("pets_api.rs"));
    assert!(!project.out().exists());
}

#[test]
fn test_cli_bundle_prints_json() {
    let project = Project::new();
    let output = codegen()
        .args(["bundle", "--spec"])
        .arg(project.spec())
        .output()
        .unwrap();
    assert!(output.status.success());
    let bundle: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(bundle["appName"], "Petstore");
    assert_eq!(bundle["apiInfo"]["apis"].as_array().unwrap().len(), 3);
}

#[test]
fn test_cli_missing_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("openapi.yaml");
    std::fs::write(&spec, common::PETSTORE).unwrap();
    let output = codegen().args(["generate", "--spec"]).arg(&spec).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("brrtrouter-codegen.toml"));
}
