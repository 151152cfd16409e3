//! Unit tests for CLI parsing and flag application

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::cli::{parse_define, Cli, Commands, GenerateArgs};
use crate::generator::GenerationConfig;
use clap::Parser;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::PathBuf;

fn generate_args(args: &[&str]) -> GenerateArgs {
    let mut argv = vec!["brrtrouter-codegen", "generate", "--spec", "api.yaml"];
    argv.extend_from_slice(args);
    match Cli::try_parse_from(argv).unwrap().command {
        Commands::Generate(args) => args,
        other => panic!("Expected Generate command, got {other:?}"),
    }
}

#[test]
fn test_generate_command_parses() {
    let cli = Cli::try_parse_from([
        "brrtrouter-codegen",
        "generate",
        "--spec",
        "api.yaml",
        "--manifest",
        "gen.toml",
        "--output",
        "out",
        "--dry-run",
    ])
    .unwrap();
    assert!(!cli.verbose);
    match cli.command {
        Commands::Generate(args) => {
            assert_eq!(args.spec, PathBuf::from("api.yaml"));
            assert_eq!(args.manifest, Some(PathBuf::from("gen.toml")));
            assert_eq!(args.output, Some(PathBuf::from("out")));
            assert!(args.dry_run);
        }
        other => panic!("Expected Generate command, got {other:?}"),
    }
}

#[test]
fn test_bundle_command_parses() {
    let cli = Cli::try_parse_from(["brrtrouter-codegen", "-v", "bundle", "--spec", "api.yaml"]).unwrap();
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Bundle(_)));
}

#[test]
fn test_spec_is_required() {
    assert!(Cli::try_parse_from(["brrtrouter-codegen", "generate"]).is_err());
}

#[test]
fn test_selection_flags_with_and_without_lists() {
    let args = generate_args(&["--models", "--apis", "pets,store"]);
    assert_eq!(args.models, Some(None));
    assert_eq!(args.apis, Some(Some("pets,store".to_string())));
    assert_eq!(args.supporting_files, None);

    let mut config = GenerationConfig::default();
    args.apply(&mut config).unwrap();
    assert_eq!(config.overrides.models, Some(true));
    assert_eq!(config.overrides.apis, Some(true));
    assert_eq!(config.overrides.supporting_files, None);
    assert!(config.model_filter().is_none());
    assert_eq!(
        config.api_filter(),
        Some(&BTreeSet::from(["pets".to_string(), "store".to_string()]))
    );
}

#[test]
fn test_supporting_files_flag_forms() {
    let mut all = GenerationConfig::default();
    generate_args(&["--supporting-files"]).apply(&mut all).unwrap();
    assert!(all.supporting_files_all);

    let mut some = GenerationConfig::default();
    generate_args(&["--supporting-files", "README.md"])
        .apply(&mut some)
        .unwrap();
    assert!(!some.supporting_files_all);
    assert!(some.wants_supporting_file("README.md"));
    assert!(!some.wants_supporting_file("Cargo.toml"));
}

#[test]
fn test_negative_flags_and_metadata() {
    let args = generate_args(&[
        "--no-model-tests",
        "--no-api-docs",
        "--no-metadata",
        "--ignore-file",
        "custom-ignore",
    ]);
    let mut config = GenerationConfig::default();
    args.apply(&mut config).unwrap();
    assert_eq!(config.overrides.model_tests, Some(false));
    assert_eq!(config.overrides.api_docs, Some(false));
    assert_eq!(config.overrides.model_docs, None);
    assert!(!config.generate_metadata);
    assert_eq!(config.ignore_file_override, Some(PathBuf::from("custom-ignore")));
    assert_eq!(config.input_spec.as_deref(), Some("api.yaml"));
}

#[test]
fn test_define_properties() {
    let args = generate_args(&["-D", "crateName=petstore", "--define", "serde=true", "-D", "port=8080"]);
    let mut config = GenerationConfig::default();
    args.apply(&mut config).unwrap();
    assert_eq!(config.properties["crateName"], json!("petstore"));
    assert_eq!(config.properties["serde"], json!(true));
    assert_eq!(config.properties["port"], json!(8080));
}

#[test]
fn test_parse_define_rejects_malformed() {
    assert!(parse_define("novalue").is_err());
    assert!(parse_define("=x").is_err());
    assert_eq!(parse_define("a=b=c").unwrap(), ("a".to_string(), json!("b=c")));
}

#[test]
fn test_missing_manifest_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("api.yaml");
    std::fs::write(&spec, "openapi: 3.0.0\ninfo:\n  title: T\n  version: '1'\npaths: {}\n").unwrap();
    let args = GenerateArgs {
        spec,
        ..GenerateArgs::default()
    };
    let err = args.generator().err().unwrap();
    assert!(err.to_string().contains("brrtrouter-codegen.toml"));
}
