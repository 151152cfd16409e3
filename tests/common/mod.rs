#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared fixtures for the generator integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Petstore description: three tags, an untagged operation, a path-level
/// parameter, global security and a composed schema.
pub const PETSTORE: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.2.3
  description: A pet store
servers:
  - url: https://api.example.com/v1
tags:
  - name: pets
    description: Everything about pets
security:
  - api_key: []
paths:
  /pets:
    get:
      tags: [pets]
      operationId: listPets
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
    post:
      tags: [pets]
      operationId: addPet
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/NewPet'
      responses:
        '201':
          description: created
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        required: true
        schema:
          type: string
    get:
      tags: [pets]
      operationId: getPet
      responses:
        '200':
          description: ok
  /store/inventory:
    get:
      tags: [store]
      operationId: getInventory
      security: []
      responses:
        '200':
          description: ok
  /health:
    get:
      responses:
        '200':
          description: ok
components:
  securitySchemes:
    api_key:
      type: apiKey
      name: X-API-Key
      in: header
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id:
          type: string
        name:
          type: string
        owner:
          $ref: '#/components/schemas/Owner'
    NewPet:
      allOf:
        - $ref: '#/components/schemas/Pet'
    Owner:
      type: object
      properties:
        name:
          type: string
    PetId:
      type: string
"#;

/// Backend manifest pointing at the templates written by [`Project::new`]
pub const MANIFEST: &str = r#"
name = "tests::PetstoreBackend"
output_dir = "out"
template_dir = "templates"
model_package = "models"
api_package = "apis"

[templates.model]
"model.rs.jinja" = ".rs"

[templates.model_test]
"model_test.rs.jinja" = ".rs"

[templates.model_doc]
"model_doc.md.jinja" = ".md"

[templates.api]
"api.rs.jinja" = ".rs"

[templates.api_test]
"api_test.rs.jinja" = ".rs"

[templates.api_doc]
"api_doc.md.jinja" = ".md"

[[supporting_files]]
template = "README.md.jinja"
destination = "README.md"

[[supporting_files]]
template = "LICENSE"
destination = "LICENSE"

[[supporting_files]]
template = "lib.rs.jinja"
folder = "src"
destination = "lib.rs"

[properties]
crateName = "petstore"
"#;

const TEMPLATES: &[(&str, &str)] = &[
    (
        "model.rs.jinja",
        "{% for m in models %}pub struct {{ m.model.className }}; // {{ crateName }}\n{% endfor %}",
    ),
    ("model_test.rs.jinja", "// generated test for {{ classname }}\n"),
    ("model_doc.md.jinja", "# {{ classname }}\n"),
    (
        "api.rs.jinja",
        "// {{ classname }}\n{% for op in operations.operation %}pub fn {{ op.nickname }}() {}\n{% endfor %}",
    ),
    ("api_test.rs.jinja", "// generated test for {{ classname }}\n"),
    ("api_doc.md.jinja", "# {{ classname }}\n"),
    (
        "README.md.jinja",
        "# {{ appName }} {{ appVersion }}\n{% for api in apiInfo.apis %}- {{ api.classname }}\n{% endfor %}{% for m in models %}* {{ m.model.className }}\n{% endfor %}",
    ),
    ("lib.rs.jinja", "pub const BASE_PATH: &str = \"{{ basePath }}\";\n"),
    ("LICENSE", "MIT\n"),
];

/// A throwaway project: description, manifest and templates in one directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self::with_manifest(MANIFEST)
    }

    /// `manifest_prefix` is prepended, so it may only hold top-level keys
    pub fn with_manifest_prefix(manifest_prefix: &str) -> Self {
        Self::with_manifest(&format!("{manifest_prefix}\n{MANIFEST}"))
    }

    pub fn with_manifest(manifest: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("openapi.yaml"), PETSTORE).unwrap();
        fs::write(dir.path().join("brrtrouter-codegen.toml"), manifest).unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        for (name, body) in TEMPLATES {
            fs::write(templates.join(name), body).unwrap();
        }
        Project { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn spec(&self) -> PathBuf {
        self.root().join("openapi.yaml")
    }

    pub fn manifest(&self) -> PathBuf {
        self.root().join("brrtrouter-codegen.toml")
    }

    pub fn templates(&self) -> PathBuf {
        self.root().join("templates")
    }

    pub fn out(&self) -> PathBuf {
        self.root().join("out")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.out().join(relative))
            .unwrap_or_else(|e| panic!("reading {relative}: {e}"))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.out().join(relative).exists()
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.out().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// Paths of `files` relative to `root`, sorted, with `/` separators
pub fn relative_paths(root: &Path, files: &[PathBuf]) -> Vec<String> {
    let mut out: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap_or(p)
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    out.sort();
    out
}
