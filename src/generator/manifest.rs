//! Manifest-driven reference backend
//!
//! A [`ManifestBackend`] is configured entirely from a TOML file
//! (`brrtrouter-codegen.toml`) that sits alongside the API description. It
//! knows nothing about any particular language: models and operations are
//! handed to templates with their raw schema data, and naming follows the
//! CamelCase/snake_case helpers in [`naming`](super::naming).
//!
//! ```toml
//! name = "acme::rust-server"
//! output_dir = "generated"
//! template_dir = "templates"
//! api_package = "src.apis"
//! model_package = "src.models"
//!
//! [templates.model]
//! "model.rs.jinja" = ".rs"
//!
//! [templates.api]
//! "api.rs.jinja" = ".rs"
//!
//! [[supporting_files]]
//! template = "lib.rs.jinja"
//! folder = "src"
//! destination = "lib.rs"
//!
//! [import_mappings]
//! Money = "rust_decimal::Decimal"
//!
//! [defaults]
//! modelDocs = false
//! ```

use anyhow::Context;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::backend::{
    generated_operation_id, BackendSettings, FileLayout, IntermediateModel, IntermediateOperation,
    Naming, OperationProjector, PostProcessor, SchemaProjector, SupportingFileDescriptor,
    TypeMapping,
};
use super::context::keys;
use super::models::ProcessedModels;
use super::naming::{sanitize_identifier, to_snake_case};
use super::options::ToggleOverrides;
use crate::spec::{ApiDescription, Operation};

/// File name looked up next to the API description
pub const MANIFEST_FILE_NAME: &str = "brrtrouter-codegen.toml";

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const PRIMITIVE_TYPES: &[&str] = &["string", "integer", "number", "boolean"];
const COMPOSITION_KEYWORDS: &[&str] = &["oneOf", "anyOf", "allOf"];

/// Template name → output suffix, per file kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateSets {
    pub model: BTreeMap<String, String>,
    pub model_test: BTreeMap<String, String>,
    pub model_doc: BTreeMap<String, String>,
    pub api: BTreeMap<String, String>,
    pub api_test: BTreeMap<String, String>,
    pub api_doc: BTreeMap<String, String>,
}

/// Contents of `brrtrouter-codegen.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Backend identifier written as `generatorClass`
    pub name: Option<String>,
    /// Relative paths are resolved against the manifest's directory
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub common_template_dir: Option<PathBuf>,
    pub api_package: String,
    pub model_package: String,
    pub templates: TemplateSets,
    pub supporting_files: Vec<SupportingFileDescriptor>,
    pub import_mappings: BTreeMap<String, String>,
    pub ignore_import_mapping: bool,
    pub instantiation_types: BTreeMap<String, String>,
    pub default_includes: BTreeSet<String>,
    pub check_alias_model: bool,
    /// Replace existing non-test files on regeneration
    pub overwrite: bool,
    pub ignore_file: Option<PathBuf>,
    /// Properties added to every rendering context
    pub properties: Map<String, Value>,
    /// Toggle defaults, overridable per run
    pub defaults: ToggleOverrides,
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest {
            name: None,
            output_dir: PathBuf::from("generated"),
            template_dir: PathBuf::from("templates"),
            common_template_dir: None,
            api_package: String::new(),
            model_package: String::new(),
            templates: TemplateSets::default(),
            supporting_files: Vec::new(),
            import_mappings: BTreeMap::new(),
            ignore_import_mapping: false,
            instantiation_types: BTreeMap::new(),
            default_includes: BTreeSet::new(),
            check_alias_model: false,
            overwrite: true,
            ignore_file: None,
            properties: Map::new(),
            defaults: ToggleOverrides::default(),
        }
    }
}

/// Load a manifest from a TOML file
pub fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let manifest: Manifest = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
    Ok(manifest)
}

/// Resolve the manifest path.
///
/// Priority:
/// 1. Explicitly provided path (must exist)
/// 2. `brrtrouter-codegen.toml` next to the description
pub fn resolve_manifest_path(explicit: Option<&Path>, spec_path: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    let candidate = spec_path.parent()?.join(MANIFEST_FILE_NAME);
    candidate.exists().then_some(candidate)
}

/// Schema names referenced anywhere below `value` through `$ref`
pub fn collect_refs(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                if key == "$ref" {
                    if let Some(name) = inner.as_str().and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX)) {
                        out.insert(name.to_string());
                    }
                } else {
                    collect_refs(inner, out);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
        _ => {}
    }
}

fn is_composed_schema(schema: &Value) -> bool {
    COMPOSITION_KEYWORDS.iter().any(|k| schema.get(*k).is_some())
}

/// A bare `$ref`, or a primitive type with no properties and no enum
fn is_alias_schema(schema: &Value) -> bool {
    let Some(obj) = schema.as_object() else {
        return false;
    };
    if obj.contains_key("$ref") {
        return obj.keys().all(|k| k == "$ref" || k == "description");
    }
    let primitive = obj
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| PRIMITIVE_TYPES.contains(&t));
    primitive && !obj.contains_key("properties") && !obj.contains_key("enum")
}

/// Backend configured from a [`Manifest`]
#[derive(Debug, Clone)]
pub struct ManifestBackend {
    manifest: Manifest,
    base_dir: PathBuf,
    output_override: Option<PathBuf>,
}

impl ManifestBackend {
    /// `base_dir` anchors the manifest's relative paths
    pub fn new(manifest: Manifest, base_dir: impl Into<PathBuf>) -> Self {
        ManifestBackend {
            manifest,
            base_dir: base_dir.into(),
            output_override: None,
        }
    }

    /// Load from a manifest file, anchoring paths at its directory
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let manifest = load_manifest(path)?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(manifest, base))
    }

    /// Write output somewhere other than the manifest's `output_dir`
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_override = Some(dir.into());
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn anchored(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn schema_properties(schema: &Value) -> Vec<Value> {
        let required: BTreeSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| {
                        json!({
                            "name": name,
                            "fieldName": sanitize_identifier(&to_snake_case(name)),
                            "required": required.contains(name.as_str()),
                            "schema": prop,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Naming for ManifestBackend {
    fn model_filename(&self, name: &str) -> String {
        to_snake_case(&self.model_name(name))
    }
    fn model_test_filename(&self, name: &str) -> String {
        format!("{}_test", self.model_filename(name))
    }
    fn api_filename(&self, tag: &str) -> String {
        to_snake_case(&self.api_name(tag))
    }
    fn api_test_filename(&self, tag: &str) -> String {
        format!("{}_test", self.api_filename(tag))
    }
    fn model_import(&self, name: &str) -> String {
        let model = self.model_name(name);
        if self.manifest.model_package.is_empty() {
            model
        } else {
            format!("{}.{}", self.manifest.model_package, model)
        }
    }
    fn api_import(&self, tag: &str) -> String {
        let api = self.api_name(tag);
        if self.manifest.api_package.is_empty() {
            api
        } else {
            format!("{}.{}", self.manifest.api_package, api)
        }
    }
}

impl TypeMapping for ManifestBackend {
    fn import_mapping(&self) -> BTreeMap<String, String> {
        self.manifest.import_mappings.clone()
    }
    fn ignore_import_mapping(&self) -> bool {
        self.manifest.ignore_import_mapping
    }
    fn instantiation_types(&self) -> BTreeMap<String, String> {
        self.manifest.instantiation_types.clone()
    }
    fn default_includes(&self) -> BTreeSet<String> {
        self.manifest.default_includes.clone()
    }
    fn check_alias_model(&self) -> bool {
        self.manifest.check_alias_model
    }
}

impl SchemaProjector for ManifestBackend {
    fn from_model(
        &self,
        name: &str,
        schema: &Value,
        _all_schemas: &BTreeMap<String, Value>,
    ) -> anyhow::Result<Option<IntermediateModel>> {
        if !schema.is_object() {
            return Ok(None);
        }
        let mut model = IntermediateModel::new(name, self.model_name(name));

        let mut refs = BTreeSet::new();
        collect_refs(schema, &mut refs);
        refs.remove(name);
        model.imports = refs.into_iter().collect();

        if is_alias_schema(schema) {
            model.set_vendor_extension(keys::IS_ALIAS_EXT, true);
        }
        if let Some(obj) = schema.as_object() {
            for (key, value) in obj.iter().filter(|(k, _)| k.starts_with("x-")) {
                model.set_vendor_extension(key.clone(), value.clone());
            }
        }
        model.data = json!({
            "description": schema.get("description"),
            "type": schema.get("type"),
            "properties": Self::schema_properties(schema),
        });
        Ok(Some(model))
    }

    fn composed_models(
        &self,
        schemas: &BTreeMap<String, Value>,
        _models: &ProcessedModels,
    ) -> anyhow::Result<Vec<IntermediateModel>> {
        Ok(schemas
            .iter()
            .filter(|(_, schema)| is_composed_schema(schema))
            .map(|(name, schema)| {
                let mut model = IntermediateModel::new(name.clone(), self.model_name(name));
                model.set_vendor_extension(keys::IS_COMPOSED_MODEL_EXT, true);
                let mut refs = BTreeSet::new();
                collect_refs(schema, &mut refs);
                refs.remove(name);
                model.imports = refs.into_iter().collect();
                model
            })
            .collect())
    }
}

impl OperationProjector for ManifestBackend {
    fn from_operation(
        &self,
        path: &str,
        method: &Method,
        operation: &Operation,
        _description: &ApiDescription,
    ) -> anyhow::Result<IntermediateOperation> {
        let id = operation
            .operation_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generated_operation_id(path, method));
        let mut op = IntermediateOperation::new(method.clone(), path, sanitize_identifier(&id));
        op.operation_id = Some(id);
        op.parameters = operation.parameters.clone().unwrap_or_default();

        let mut refs = BTreeSet::new();
        for param in &op.parameters {
            if let Some(schema) = &param.schema {
                collect_refs(schema, &mut refs);
            }
        }
        if let Some(body) = &operation.request_body {
            collect_refs(body, &mut refs);
        }
        for response in operation.responses.iter().flat_map(|r| r.values()) {
            collect_refs(response, &mut refs);
        }
        op.imports = refs;

        for (key, value) in operation.extensions.iter().filter(|(k, _)| k.starts_with("x-")) {
            op.set_vendor_extension(key.clone(), value.clone());
        }
        op.data = json!({
            "summary": operation.summary,
            "description": operation.description,
            "deprecated": operation.deprecated,
            "requestBody": operation.request_body,
            "responses": operation.responses,
        });
        Ok(op)
    }
}

impl PostProcessor for ManifestBackend {}

impl FileLayout for ManifestBackend {
    fn output_dir(&self) -> PathBuf {
        match &self.output_override {
            Some(dir) => dir.clone(),
            None => self.anchored(&self.manifest.output_dir),
        }
    }
    fn template_dir(&self) -> PathBuf {
        self.anchored(&self.manifest.template_dir)
    }
    fn common_template_dir(&self) -> Option<PathBuf> {
        self.manifest
            .common_template_dir
            .as_deref()
            .map(|p| self.anchored(p))
    }
    fn api_package(&self) -> String {
        self.manifest.api_package.clone()
    }
    fn model_package(&self) -> String {
        self.manifest.model_package.clone()
    }
    fn model_templates(&self) -> BTreeMap<String, String> {
        self.manifest.templates.model.clone()
    }
    fn model_test_templates(&self) -> BTreeMap<String, String> {
        self.manifest.templates.model_test.clone()
    }
    fn model_doc_templates(&self) -> BTreeMap<String, String> {
        self.manifest.templates.model_doc.clone()
    }
    fn api_templates(&self) -> BTreeMap<String, String> {
        self.manifest.templates.api.clone()
    }
    fn api_test_templates(&self) -> BTreeMap<String, String> {
        self.manifest.templates.api_test.clone()
    }
    fn api_doc_templates(&self) -> BTreeMap<String, String> {
        self.manifest.templates.api_doc.clone()
    }
    fn supporting_files(&self) -> Vec<SupportingFileDescriptor> {
        self.manifest.supporting_files.clone()
    }
    fn should_overwrite(&self, _path: &Path) -> bool {
        self.manifest.overwrite
    }
    fn ignore_file_override(&self) -> Option<PathBuf> {
        self.manifest.ignore_file.as_deref().map(|p| self.anchored(p))
    }
}

impl BackendSettings for ManifestBackend {
    fn fully_qualified_name(&self) -> String {
        self.manifest
            .name
            .clone()
            .unwrap_or_else(|| "brrtrouter_codegen::generator::manifest::ManifestBackend".to_string())
    }
    fn backend_defaults(&self) -> ToggleOverrides {
        self.manifest.defaults
    }
    fn additional_properties(&self) -> Map<String, Value> {
        self.manifest.properties.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_detection() {
        assert!(is_alias_schema(&json!({ "$ref": "#/components/schemas/Pet" })));
        assert!(is_alias_schema(&json!({ "type": "string", "format": "uuid" })));
        assert!(!is_alias_schema(&json!({ "type": "string", "enum": ["a", "b"] })));
        assert!(!is_alias_schema(&json!({ "type": "object", "properties": {} })));
        assert!(!is_alias_schema(&json!({ "$ref": "#/components/schemas/Pet", "nullable": true })));
    }

    #[test]
    fn test_collect_refs_nested() {
        let schema = json!({
            "type": "object",
            "properties": {
                "owner": { "$ref": "#/components/schemas/Owner" },
                "tags": { "type": "array", "items": { "$ref": "#/components/schemas/Tag" } },
                "external": { "$ref": "other.yaml#/Thing" }
            }
        });
        let mut refs = BTreeSet::new();
        collect_refs(&schema, &mut refs);
        assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec!["Owner", "Tag"]);
    }

    #[test]
    fn test_manifest_defaults_from_minimal_toml() {
        let manifest: Manifest = toml::from_str("api_package = \"apis\"\n").unwrap();
        assert_eq!(manifest.api_package, "apis");
        assert_eq!(manifest.output_dir, PathBuf::from("generated"));
        assert!(manifest.overwrite);
        assert!(manifest.templates.model.is_empty());
    }

    #[test]
    fn test_anchored_paths() {
        let backend = ManifestBackend::new(Manifest::default(), "/project");
        assert_eq!(backend.output_dir(), PathBuf::from("/project/generated"));
        assert_eq!(backend.template_dir(), PathBuf::from("/project/templates"));
        let moved = backend.with_output_dir("/tmp/out");
        assert_eq!(moved.output_dir(), PathBuf::from("/tmp/out"));
    }
}
