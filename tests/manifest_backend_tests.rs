#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The data-driven manifest backend

mod common;

use brrtrouter_codegen::generator::manifest::{load_manifest, resolve_manifest_path};
use brrtrouter_codegen::generator::{
    BackendSettings, FileLayout, Naming, OperationProjector, SchemaProjector, TypeMapping,
    ManifestBackend, MANIFEST_FILE_NAME,
};
use brrtrouter_codegen::spec::parse_description;
use common::Project;
use http::Method;
use std::path::Path;

#[test]
fn test_manifest_found_next_to_spec() {
    let project = Project::new();
    assert_eq!(
        resolve_manifest_path(None, &project.spec()),
        Some(project.root().join(MANIFEST_FILE_NAME))
    );
    assert_eq!(
        resolve_manifest_path(Some(&project.manifest()), Path::new("/elsewhere/api.yaml")),
        Some(project.manifest())
    );
    assert_eq!(
        resolve_manifest_path(Some(Path::new("/missing.toml")), &project.spec()),
        None
    );
}

#[test]
fn test_paths_are_anchored_at_manifest_directory() {
    let project = Project::new();
    let backend = ManifestBackend::from_file(&project.manifest()).unwrap();
    assert_eq!(backend.output_dir(), project.out());
    assert_eq!(backend.template_dir(), project.templates());
    assert_eq!(backend.model_folder(), project.out().join("models"));
    assert_eq!(backend.api_folder(), project.out().join("apis"));
    assert_eq!(backend.fully_qualified_name(), "tests::PetstoreBackend");
    assert_eq!(backend.supporting_files().len(), 3);
    assert_eq!(backend.additional_properties()["crateName"], "petstore");

    let moved = backend.with_output_dir("/tmp/elsewhere");
    assert_eq!(moved.output_dir(), Path::new("/tmp/elsewhere"));
}

#[test]
fn test_naming_conventions() {
    let project = Project::new();
    let backend = ManifestBackend::from_file(&project.manifest()).unwrap();
    assert_eq!(backend.model_filename("NewPet"), "new_pet");
    assert_eq!(backend.model_test_filename("NewPet"), "new_pet_test");
    assert_eq!(backend.api_filename("Pets"), "pets_api");
    assert_eq!(backend.api_test_filename("Pets"), "pets_api_test");
    assert_eq!(backend.model_import("Pet"), "models.Pet");
    assert_eq!(backend.api_import("Pets"), "apis.PetsApi");
}

#[test]
fn test_bad_manifest_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(MANIFEST_FILE_NAME);
    std::fs::write(&path, "output_dir = [not toml").unwrap();
    let err = load_manifest(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse manifest"));
    assert!(ManifestBackend::from_file(&dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_model_projection() {
    let project = Project::new();
    let backend = ManifestBackend::from_file(&project.manifest()).unwrap();
    let description = parse_description(common::PETSTORE, true).unwrap();
    let schemas = description.schemas();

    let pet = backend.from_model("Pet", &schemas["Pet"], &schemas).unwrap().unwrap();
    assert_eq!(pet.class_name, "Pet");
    assert_eq!(pet.imports, vec!["Owner".to_string()]);
    assert!(!pet.is_alias());
    let props = pet.data["properties"].as_array().unwrap();
    let id = props.iter().find(|p| p["name"] == "id").unwrap();
    assert_eq!(id["required"], true);

    let alias = backend
        .from_model("PetId", &schemas["PetId"], &schemas)
        .unwrap()
        .unwrap();
    assert!(alias.is_alias());
    assert!(!backend.check_alias_model());
}

#[test]
fn test_operation_projection_collects_imports() {
    let project = Project::new();
    let backend = ManifestBackend::from_file(&project.manifest()).unwrap();
    let description = parse_description(common::PETSTORE, true).unwrap();
    let paths = description.paths.as_ref().unwrap();

    let add = paths["/pets"].post.as_ref().unwrap();
    let op = backend
        .from_operation("/pets", &Method::POST, add, &description)
        .unwrap();
    assert_eq!(op.nickname, "addPet");
    assert!(op.imports.contains("NewPet"));

    let list = paths["/pets"].get.as_ref().unwrap();
    let op = backend
        .from_operation("/pets", &Method::GET, list, &description)
        .unwrap();
    assert!(op.imports.contains("Pet"));

    let health = paths["/health"].get.as_ref().unwrap();
    let op = backend
        .from_operation("/health", &Method::GET, health, &description)
        .unwrap();
    assert_eq!(op.nickname, "healthGet");
    assert_eq!(op.operation_id.as_deref(), Some("healthGet"));
}
