//! Model pipeline: schemas → per-model rendering contexts → model files.

use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::backend::{Backend, IntermediateModel};
use super::context::{keys, vendor_flag, RenderingContext};
use super::error::{GenerateError, Result};
use super::gate::FileCategory;
use super::imports::resolve_model_imports;
use super::options::GenerationOptions;
use super::output::Emitter;

/// One entry of the processed model table
#[derive(Debug, Clone)]
pub struct ProcessedModel {
    /// Schema name as declared in the description
    pub name: String,
    /// Canonical display name; the table key
    pub class_name: String,
    pub model: IntermediateModel,
    /// Per-model rendering context; this is what templates see
    pub context: RenderingContext,
}

impl ProcessedModel {
    /// First entry of the context's `models` list
    pub fn model_entry(&self) -> Option<&Value> {
        self.context
            .get(keys::MODELS)
            .and_then(Value::as_array)
            .and_then(|list| list.first())
    }

    /// Alias flag as currently recorded in the context
    pub fn is_alias(&self) -> bool {
        self.model_entry()
            .and_then(|entry| entry.get(keys::MODEL))
            .is_some_and(|model| vendor_flag(model, keys::IS_ALIAS_EXT))
    }

    pub fn is_composed(&self) -> bool {
        match self.context.get(keys::IS_COMPOSED_MODEL_EXT) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// Processed models ordered by canonical display name
#[derive(Debug, Clone, Default)]
pub struct ProcessedModels {
    entries: BTreeMap<String, ProcessedModel>,
}

impl ProcessedModels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the model's display name, returning any entry it replaced
    pub fn insert(&mut self, model: ProcessedModel) -> Option<ProcessedModel> {
        self.entries.insert(model.class_name.clone(), model)
    }

    pub fn get(&self, class_name: &str) -> Option<&ProcessedModel> {
        self.entries.get(class_name)
    }

    pub fn get_mut(&mut self, class_name: &str) -> Option<&mut ProcessedModel> {
        self.entries.get_mut(class_name)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.entries.contains_key(class_name)
    }

    pub fn remove(&mut self, class_name: &str) -> Option<ProcessedModel> {
        self.entries.remove(class_name)
    }

    pub fn retain<F: FnMut(&ProcessedModel) -> bool>(&mut self, mut keep: F) {
        self.entries.retain(|_, m| keep(m));
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessedModel> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ProcessedModel> {
        self.entries.values_mut()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wrap one intermediate model into its rendering context.
///
/// `schema` is `Null` for models synthesized by composition.
fn model_context<B: Backend + ?Sized>(
    backend: &B,
    model: &IntermediateModel,
    schema: Value,
) -> anyhow::Result<RenderingContext> {
    let mut ctx = RenderingContext::new();
    ctx.insert(keys::PACKAGE, backend.model_package());
    let entry = json!({
        (keys::MODEL): serde_json::to_value(model)?,
        (keys::SCHEMA): schema,
        (keys::IMPORT_PATH): backend.model_import(&model.class_name),
    });
    ctx.insert(keys::MODELS, Value::Array(vec![entry]));
    let imports = resolve_model_imports(backend, &model.imports);
    ctx.insert_serialized(keys::IMPORTS, &imports)?;
    backend.post_process_models(&mut ctx)?;
    Ok(ctx)
}

fn finish_context<B: Backend + ?Sized>(
    backend: &B,
    ctx: &mut RenderingContext,
    schema_name: &str,
    properties: &Map<String, Value>,
) {
    ctx.insert(keys::CLASSNAME, backend.model_name(schema_name));
    ctx.extend(properties);
}

/// Schema names to project, after import-mapping and allow-list filtering
pub fn candidate_names<B: Backend + ?Sized>(
    backend: &B,
    schemas: &BTreeMap<String, Value>,
    allow_list: Option<&BTreeSet<String>>,
) -> Vec<String> {
    let mapping = backend.import_mapping();
    let ignore_mapping = backend.ignore_import_mapping();
    schemas
        .keys()
        .filter(|name| {
            if !ignore_mapping && mapping.contains_key(*name) {
                info!(model = %name, "Model not generated due to import mapping");
                return false;
            }
            match allow_list {
                Some(allowed) => allowed.contains(*name),
                None => true,
            }
        })
        .cloned()
        .collect()
}

/// Project schemas into the processed model table.
///
/// Covers filtering, projection, composed-model merging and the backend's
/// whole-table hook. Any projection failure aborts with the model name.
pub fn process_models<B: Backend + ?Sized>(
    backend: &B,
    schemas: &BTreeMap<String, Value>,
    allow_list: Option<&BTreeSet<String>>,
    properties: &Map<String, Value>,
) -> Result<ProcessedModels> {
    let mut processed = ProcessedModels::new();
    let candidates = candidate_names(backend, schemas, allow_list);

    for name in candidates.iter().cloned() {
        let Some(schema) = schemas.get(&name) else {
            continue;
        };
        let wrap = |source: anyhow::Error| GenerateError::Model {
            name: name.clone(),
            source,
        };
        let Some(model) = backend.from_model(&name, schema, schemas).map_err(wrap)? else {
            debug!(model = %name, "Schema produced no model");
            continue;
        };
        let mut ctx = model_context(backend, &model, schema.clone()).map_err(wrap)?;
        finish_context(backend, &mut ctx, &name, properties);
        let class_name = backend.model_name(&name);
        processed.insert(ProcessedModel {
            name,
            class_name,
            model,
            context: ctx,
        });
    }

    let composed = backend
        .composed_models(schemas, &processed)
        .map_err(|source| GenerateError::Model {
            name: "<composed>".to_string(),
            source,
        })?;
    for model in composed {
        if schemas.contains_key(&model.name) && !candidates.contains(&model.name) {
            continue;
        }
        let class_name = backend.model_name(&model.name);
        let flag = model.is_composed();
        if let Some(existing) = processed.get_mut(&class_name) {
            existing.context.insert(keys::IS_COMPOSED_MODEL_EXT, flag);
            continue;
        }
        let wrap = |source: anyhow::Error| GenerateError::Model {
            name: model.name.clone(),
            source,
        };
        let mut ctx = model_context(backend, &model, Value::Null).map_err(wrap)?;
        finish_context(backend, &mut ctx, &model.name, properties);
        ctx.insert(keys::IS_COMPOSED_MODEL_EXT, flag);
        processed.insert(ProcessedModel {
            name: model.name.clone(),
            class_name,
            model,
            context: ctx,
        });
    }

    backend
        .post_process_all_models(&mut processed)
        .map_err(|source| GenerateError::Model {
            name: "<all models>".to_string(),
            source,
        })?;
    Ok(processed)
}

/// Write model, model test and model doc files.
///
/// Returns the model entries that make up the bundle's `models` list.
/// Alias models are left out of that list and get no source file when the
/// backend asks for alias suppression; their tests and docs still follow the
/// toggles.
pub fn emit_models<B: Backend + ?Sized>(
    backend: &B,
    processed: &ProcessedModels,
    options: &GenerationOptions,
    emitter: &mut Emitter<'_>,
) -> Result<Vec<Value>> {
    let mapping = backend.import_mapping();
    let ignore_mapping = backend.ignore_import_mapping();
    let overwrite = |p: &std::path::Path| backend.should_overwrite(p);
    let mut all_models = Vec::new();

    for model in processed.iter() {
        if !ignore_mapping && mapping.contains_key(&model.name) {
            continue;
        }
        let wrap = |source: anyhow::Error| GenerateError::ModelFile {
            name: model.name.clone(),
            source,
        };
        let suppressed = backend.check_alias_model() && model.is_alias();

        if suppressed {
            debug!(model = %model.name, "Alias model, no source file");
        } else {
            if let Some(entry) = model.model_entry() {
                all_models.push(entry.clone());
            }
            for (template, suffix) in backend.model_templates() {
                let file = backend
                    .model_folder()
                    .join(format!("{}{}", backend.model_filename(&model.name), suffix));
                emitter
                    .render_file(&template, &model.context, &file, FileCategory::Source, &overwrite)
                    .map_err(wrap)?;
            }
        }

        if options.model_tests {
            for (template, suffix) in backend.model_test_templates() {
                let file = backend
                    .model_test_folder()
                    .join(format!("{}{}", backend.model_test_filename(&model.name), suffix));
                emitter
                    .render_file(&template, &model.context, &file, FileCategory::Test, &overwrite)
                    .map_err(wrap)?;
            }
        }
        if options.model_docs {
            for (template, suffix) in backend.model_doc_templates() {
                let file = backend
                    .model_doc_folder()
                    .join(format!("{}{}", backend.model_doc_filename(&model.name), suffix));
                emitter
                    .render_file(&template, &model.context, &file, FileCategory::Documentation, &overwrite)
                    .map_err(wrap)?;
            }
        }
    }
    Ok(all_models)
}
