#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Loading API descriptions from disk

mod common;

use brrtrouter_codegen::spec::{load_description, parse_description, ParameterLocation};
use std::fs;

#[test]
fn test_load_yaml_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("petstore.yml");
    fs::write(&path, common::PETSTORE).unwrap();

    let description = load_description(&path).unwrap();
    let info = description.info.as_ref().unwrap();
    assert_eq!(info.title.as_deref(), Some("Petstore"));
    assert_eq!(info.version.as_deref(), Some("1.2.3"));
    assert_eq!(description.servers[0].url, "https://api.example.com/v1");
    assert_eq!(description.paths.as_ref().unwrap().len(), 4);
    assert_eq!(
        description.schemas().keys().cloned().collect::<Vec<_>>(),
        vec!["NewPet", "Owner", "Pet", "PetId"]
    );
    assert!(description.security_schemes().contains_key("api_key"));
    assert!(description.declared_tag("pets").is_some());
    assert!(description.declared_tag("store").is_none());
}

#[test]
fn test_load_json_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.json");
    fs::write(
        &path,
        r#"{"openapi":"3.1.0","info":{"title":"J","version":"0"},"x-team":"core","paths":{}}"#,
    )
    .unwrap();
    let description = load_description(&path).unwrap();
    assert_eq!(description.openapi.as_deref(), Some("3.1.0"));
    assert_eq!(description.vendor_extensions()["x-team"], "core");
}

#[test]
fn test_missing_file_is_an_error() {
    let err = load_description("/definitely/not/here.yaml".as_ref()).unwrap_err();
    assert!(err.to_string().contains("Failed to read description"));
}

#[test]
fn test_invalid_yaml_is_an_error() {
    assert!(parse_description("openapi: [unclosed", true).is_err());
    assert!(parse_description("{", false).is_err());
}

#[test]
fn test_empty_security_differs_from_absent() {
    let description = parse_description(common::PETSTORE, true).unwrap();
    let paths = description.paths.as_ref().unwrap();
    let security_of = |path: &str| {
        let (_, op) = paths[path].operations()[0];
        op.security.as_ref().map(Vec::len)
    };
    assert_eq!(security_of("/store/inventory"), Some(0));
    assert_eq!(security_of("/pets/{petId}"), None);
    assert_eq!(description.security.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_component_parameter_refs_are_inlined() {
    let yaml = r#"
openapi: 3.0.0
info: { title: T, version: '1' }
components:
  parameters:
    Limit:
      name: limit
      in: query
      schema: { type: integer }
paths:
  /items:
    parameters:
      - $ref: '#/components/parameters/Limit'
    get:
      operationId: listItems
      responses: {}
"#;
    let description = parse_description(yaml, true).unwrap();
    let item = &description.paths.as_ref().unwrap()["/items"];
    assert_eq!(item.parameters[0].name, "limit");
    assert_eq!(item.parameters[0].location, ParameterLocation::Query);
}
