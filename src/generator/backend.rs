//! Target-language backend capabilities.
//!
//! The pipeline never talks to a single wide backend object. Each concern is
//! its own trait with defaults wherever a sensible one exists, so a backend
//! only implements what it needs:
//!
//! - [`Naming`] - symbol and file names, text escaping
//! - [`TypeMapping`] - import mapping, instantiation types, alias handling
//! - [`SchemaProjector`] - schema → [`IntermediateModel`]
//! - [`OperationProjector`] - operation → [`IntermediateOperation`]
//! - [`PostProcessor`] - hooks over contexts once they are built
//! - [`FileLayout`] - folders, template maps, supporting files, overwrite policy
//! - [`BackendSettings`] - identity, declared properties and toggle defaults
//!
//! [`Backend`] bundles them for the controller and is implemented for every
//! type that implements all of the above.

use http::Method;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use super::auth::AuthMethod;
use super::context::{keys, RenderingContext};
use super::models::ProcessedModels;
use super::naming::{sanitize_identifier, to_camel_case, to_lower_camel_case};
use super::operations::OperationGroups;
use super::options::ToggleOverrides;
use super::properties::GeneratorProperties;
use crate::spec::{ApiDescription, Operation, Parameter, Tag};

/// One schema projected for a backend
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateModel {
    /// Schema name as declared in the description
    pub name: String,
    /// Canonical display name chosen by the backend
    pub class_name: String,
    /// Raw type references the model depends on
    pub imports: Vec<String>,
    pub vendor_extensions: Map<String, Value>,
    /// Backend-specific structure, opaque to the pipeline
    pub data: Value,
}

impl IntermediateModel {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        IntermediateModel {
            name: name.into(),
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    pub fn is_alias(&self) -> bool {
        flag(&self.vendor_extensions, keys::IS_ALIAS_EXT)
    }

    pub fn is_composed(&self) -> bool {
        flag(&self.vendor_extensions, keys::IS_COMPOSED_MODEL_EXT)
    }

    pub fn set_vendor_extension(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vendor_extensions.insert(key.into(), value.into());
    }
}

fn flag(extensions: &Map<String, Value>, key: &str) -> bool {
    match extensions.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn serialize_method<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

/// One HTTP operation projected for a backend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateOperation {
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Stable identifier used for generated symbol names
    pub nickname: String,
    pub tags: Vec<Tag>,
    pub parameters: Vec<Parameter>,
    /// Raw type references the operation depends on
    pub imports: BTreeSet<String>,
    pub auth_methods: Vec<AuthMethod>,
    pub has_auth_methods: bool,
    pub vendor_extensions: Map<String, Value>,
    pub data: Value,
}

impl IntermediateOperation {
    pub fn new(method: Method, path: impl Into<String>, nickname: impl Into<String>) -> Self {
        IntermediateOperation {
            method,
            path: path.into(),
            operation_id: None,
            nickname: nickname.into(),
            tags: Vec::new(),
            parameters: Vec::new(),
            imports: BTreeSet::new(),
            auth_methods: Vec::new(),
            has_auth_methods: false,
            vendor_extensions: Map::new(),
            data: Value::Null,
        }
    }

    pub fn set_vendor_extension(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vendor_extensions.insert(key.into(), value.into());
    }
}

/// A project-level file the backend wants generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingFileDescriptor {
    /// Template or plain file, relative to the template directory
    pub template: String,
    /// Output file name
    pub destination: String,
    /// Optional subfolder below the output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

impl SupportingFileDescriptor {
    pub fn new(template: impl Into<String>, folder: Option<&str>, destination: impl Into<String>) -> Self {
        SupportingFileDescriptor {
            template: template.into(),
            destination: destination.into(),
            folder: folder.map(str::to_string),
        }
    }
}

impl std::fmt::Display for SupportingFileDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.folder {
            Some(folder) => write!(f, "{} -> {}/{}", self.template, folder, self.destination),
            None => write!(f, "{} -> {}", self.template, self.destination),
        }
    }
}

/// Operation id derived from path and method when the description has none
///
/// `/pets/{id}` + `GET` becomes `petsIdGet`; `/` becomes `rootGet`.
pub fn generated_operation_id(path: &str, method: &Method) -> String {
    let tmp_path = path.replace(['{', '}'], "");
    let mut builder = String::new();
    if tmp_path == "/" {
        builder.push_str("root");
    }
    let combined = format!("{}/{}", tmp_path, method.as_str().to_ascii_lowercase());
    for part in combined.split('/').filter(|p| !p.is_empty()) {
        if builder.is_empty() {
            builder.push_str(&to_lower_camel_case(part));
        } else {
            builder.push_str(&to_camel_case(part));
        }
    }
    sanitize_identifier(&builder)
}

/// Symbol and file naming conventions
pub trait Naming {
    fn model_name(&self, name: &str) -> String {
        to_camel_case(&sanitize_identifier(name))
    }
    fn model_filename(&self, name: &str) -> String {
        self.model_name(name)
    }
    fn model_test_filename(&self, name: &str) -> String {
        format!("{}Test", self.model_name(name))
    }
    fn model_doc_filename(&self, name: &str) -> String {
        self.model_name(name)
    }
    /// Import statement target for a model type
    fn model_import(&self, name: &str) -> String {
        self.model_name(name)
    }
    fn api_name(&self, tag: &str) -> String {
        if tag.is_empty() {
            return "DefaultApi".to_string();
        }
        format!("{}Api", to_camel_case(tag))
    }
    fn api_var_name(&self, tag: &str) -> String {
        to_lower_camel_case(&self.api_name(tag))
    }
    fn api_filename(&self, tag: &str) -> String {
        self.api_name(tag)
    }
    fn api_test_filename(&self, tag: &str) -> String {
        format!("{}Test", self.api_name(tag))
    }
    fn api_doc_filename(&self, tag: &str) -> String {
        self.api_name(tag)
    }
    /// Import path of the generated API type
    fn api_import(&self, tag: &str) -> String {
        self.api_name(tag)
    }
    fn sanitize_tag(&self, tag: &str) -> String {
        to_camel_case(&sanitize_identifier(tag))
    }
    /// Escape free text for embedding into generated sources
    fn escape_text(&self, input: &str) -> String {
        let flattened: String = input
            .split(['\n', '\r', '\t'])
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        flattened.replace('\\', "\\\\").replace('"', "\\\"")
    }
    fn escape_quotation_mark(&self, input: &str) -> String {
        input.replace('"', "")
    }
}

/// Type-level mapping rules consulted by the model pipeline and import resolver
pub trait TypeMapping {
    /// Schema name → externally provided type; mapped schemas are not generated
    fn import_mapping(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
    /// Generate mapped schemas anyway
    fn ignore_import_mapping(&self) -> bool {
        false
    }
    fn instantiation_types(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
    /// Types the target language provides without an import
    fn default_includes(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
    /// Suppress standalone source files for alias models
    fn check_alias_model(&self) -> bool {
        false
    }
}

pub trait SchemaProjector {
    /// `Ok(None)` means the schema produces nothing to generate
    fn from_model(
        &self,
        name: &str,
        schema: &Value,
        all_schemas: &BTreeMap<String, Value>,
    ) -> anyhow::Result<Option<IntermediateModel>>;

    /// Models produced by resolving oneOf/anyOf/allOf composition
    fn composed_models(
        &self,
        _schemas: &BTreeMap<String, Value>,
        _models: &ProcessedModels,
    ) -> anyhow::Result<Vec<IntermediateModel>> {
        Ok(Vec::new())
    }
}

pub trait OperationProjector {
    /// `operation` already carries the inherited path-level parameters
    fn from_operation(
        &self,
        path: &str,
        method: &Method,
        operation: &Operation,
        description: &ApiDescription,
    ) -> anyhow::Result<IntermediateOperation>;

    fn from_security(&self, methods: Vec<AuthMethod>) -> Vec<AuthMethod> {
        methods
    }

    fn add_operation_to_group(
        &self,
        tag: &str,
        operation: IntermediateOperation,
        groups: &mut OperationGroups,
    ) {
        groups.entry(tag.to_string()).or_default().push(operation);
    }
}

/// Hooks run after each pipeline stage; all default to no-ops
pub trait PostProcessor {
    fn process_opts(&self, _properties: &mut GeneratorProperties) -> anyhow::Result<()> {
        Ok(())
    }
    fn preprocess_description(&self, _description: &ApiDescription) -> anyhow::Result<()> {
        Ok(())
    }
    /// Per-model context
    fn post_process_models(&self, _context: &mut RenderingContext) -> anyhow::Result<()> {
        Ok(())
    }
    /// Whole processed model table; may reorder, annotate or drop entries
    fn post_process_all_models(&self, _models: &mut ProcessedModels) -> anyhow::Result<()> {
        Ok(())
    }
    /// Per-tag operation context
    fn post_process_operations(&self, _context: &mut RenderingContext) -> anyhow::Result<()> {
        Ok(())
    }
    fn post_process_operations_with_models(
        &self,
        _context: &mut RenderingContext,
        _all_models: &[Value],
    ) -> anyhow::Result<()> {
        Ok(())
    }
    fn post_process_supporting_file_data(&self, _bundle: &mut RenderingContext) -> anyhow::Result<()> {
        Ok(())
    }
    /// Final hook, after every file has been produced
    fn process_description(&self, _description: &ApiDescription) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Folder names and template maps; template maps go template name → file suffix
pub trait FileLayout {
    fn output_dir(&self) -> PathBuf;
    fn template_dir(&self) -> PathBuf;
    /// Bundled resources shared between backends
    fn common_template_dir(&self) -> Option<PathBuf> {
        None
    }
    fn api_package(&self) -> String {
        String::new()
    }
    fn model_package(&self) -> String {
        String::new()
    }
    fn model_folder(&self) -> PathBuf {
        self.output_dir().join(package_path(&self.model_package()))
    }
    fn model_test_folder(&self) -> PathBuf {
        self.model_folder()
    }
    fn model_doc_folder(&self) -> PathBuf {
        self.output_dir()
    }
    fn api_folder(&self) -> PathBuf {
        self.output_dir().join(package_path(&self.api_package()))
    }
    fn api_test_folder(&self) -> PathBuf {
        self.api_folder()
    }
    fn api_doc_folder(&self) -> PathBuf {
        self.output_dir()
    }
    fn model_templates(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
    fn model_test_templates(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
    fn model_doc_templates(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
    fn api_templates(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
    fn api_test_templates(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
    fn api_doc_templates(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
    fn supporting_files(&self) -> Vec<SupportingFileDescriptor> {
        Vec::new()
    }
    /// Whether an existing file at `path` may be replaced
    fn should_overwrite(&self, _path: &std::path::Path) -> bool {
        true
    }
    fn ignore_file_override(&self) -> Option<PathBuf> {
        None
    }
}

/// Backend identity and declared configuration
pub trait BackendSettings {
    /// Fully qualified backend identifier, written as `generatorClass`
    fn fully_qualified_name(&self) -> String;
    /// Toggle defaults declared by the backend
    fn backend_defaults(&self) -> ToggleOverrides {
        ToggleOverrides::default()
    }
    /// Properties the backend adds to every context
    fn additional_properties(&self) -> Map<String, Value> {
        Map::new()
    }
}

/// Everything the controller needs from a target-language backend
pub trait Backend:
    Naming + TypeMapping + SchemaProjector + OperationProjector + PostProcessor + FileLayout + BackendSettings
{
}

impl<T> Backend for T where
    T: Naming
        + TypeMapping
        + SchemaProjector
        + OperationProjector
        + PostProcessor
        + FileLayout
        + BackendSettings
{
}

/// `com.example.api` → `com/example/api`
pub fn package_path(package: &str) -> PathBuf {
    package.split('.').filter(|s| !s.is_empty()).collect()
}
