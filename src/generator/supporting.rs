//! Supporting-file pipeline: the aggregate bundle, project-level files and
//! the metadata stamps written at the output root.

use askama::Template;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::backend::{package_path, Backend};
use super::config::GenerationConfig;
use super::context::{keys, set_vendor_extension, RenderingContext};
use super::error::{GenerateError, Result};
use super::gate::{FileCategory, IGNORE_FILE_NAME};
use super::metadata::RunMetadata;
use super::output::Emitter;
use super::templates::IgnoreFileTemplate;
use crate::spec::ApiDescription;

/// Directory under the output root holding generator metadata
pub const METADATA_DIR: &str = ".brrtrouter-codegen";
/// Version stamp file inside [`METADATA_DIR`]
pub const VERSION_FILE: &str = "VERSION";

/// Location of the version stamp for `output_dir`
pub fn version_file_path(output_dir: &Path) -> PathBuf {
    output_dir.join(METADATA_DIR).join(VERSION_FILE)
}

/// Location of the ignore-rule file for `output_dir`
pub fn ignore_file_path(output_dir: &Path) -> PathBuf {
    output_dir.join(IGNORE_FILE_NAME)
}

/// Set `x-has-more-models` on the model of every entry but the last
fn mark_more_models(models: &mut [Value]) {
    let last = models.len().saturating_sub(1);
    for entry in models.iter_mut().take(last) {
        if let Some(model) = entry.get_mut(keys::MODEL) {
            set_vendor_extension(model, keys::HAS_MORE_MODELS_EXT, true);
        }
    }
}

/// Assemble the project-wide bundle.
///
/// The backend's bundle hook runs last and may add or override any entry.
pub fn build_bundle<B: Backend + ?Sized>(
    backend: &B,
    description: &ApiDescription,
    mut all_models: Vec<Value>,
    all_operations: Vec<Value>,
    run: &RunMetadata,
) -> anyhow::Result<RenderingContext> {
    mark_more_models(&mut all_models);
    let has_model = !all_models.is_empty();

    let mut api_info = Map::new();
    api_info.insert(keys::APIS.to_string(), Value::Array(all_operations));

    let mut bundle = RenderingContext::new();
    bundle.extend(&run.properties);
    bundle.insert(keys::API_PACKAGE, run.api_package.clone());
    bundle.insert(keys::API_INFO, Value::Object(api_info));
    bundle.insert_serialized(keys::OPEN_API, description)?;
    bundle.insert(keys::BASE_PATH, run.server.base_path.clone());
    bundle.insert(keys::BASE_PATH_WITHOUT_HOST, run.server.base_path_without_host.clone());
    bundle.insert(keys::SCHEME, run.server.scheme.clone());
    bundle.insert(
        keys::HOST,
        run.server.host.clone().map(Value::String).unwrap_or(Value::Null),
    );
    bundle.insert(keys::CONTEXT_PATH, run.server.context_path.clone());
    bundle.insert(keys::MODELS, Value::Array(all_models));
    bundle.insert(keys::HAS_MODEL, has_model);
    bundle.insert(
        keys::API_FOLDER,
        package_path(&run.api_package).to_string_lossy().into_owned(),
    );
    bundle.insert(keys::MODEL_PACKAGE, run.model_package.clone());
    if !run.auth_methods.is_empty() {
        bundle.insert_serialized(keys::AUTH_METHODS, &run.auth_methods)?;
        bundle.insert(keys::HAS_AUTH_METHODS, true);
    }
    if let Some(docs) = &description.external_docs {
        bundle.insert_serialized(keys::EXTERNAL_DOCS, docs)?;
    }

    backend.post_process_supporting_file_data(&mut bundle)?;
    Ok(bundle)
}

/// Render or copy every backend-declared supporting file.
///
/// Files whose name ends in the renderer's template extension are rendered
/// with the bundle; anything else is copied byte for byte. A source that
/// cannot be found in either template directory is skipped with a warning.
pub fn emit_supporting_files<B: Backend + ?Sized>(
    backend: &B,
    bundle: &RenderingContext,
    config: &GenerationConfig,
    emitter: &mut Emitter<'_>,
) -> Result<()> {
    let overwrite = |p: &Path| backend.should_overwrite(p);
    let output_dir = backend.output_dir();

    for descriptor in backend.supporting_files() {
        if !config.wants_supporting_file(&descriptor.destination) {
            debug!(file = %descriptor.destination, "Supporting file not selected");
            continue;
        }
        let folder = match descriptor.folder.as_deref() {
            Some(folder) if !folder.is_empty() => output_dir.join(folder),
            _ => output_dir.clone(),
        };
        let destination = folder.join(&descriptor.destination);

        let Some(source) = emitter.locate(&descriptor.template) else {
            warn!(
                template = %descriptor.template,
                destination = %destination.display(),
                "Supporting file source not found, skipping"
            );
            continue;
        };
        let wrap = |e: anyhow::Error| GenerateError::supporting_file(descriptor.to_string(), e);

        if emitter.renderer().is_template(&descriptor.template) {
            emitter
                .render_file(&descriptor.template, bundle, &destination, FileCategory::Supporting, &overwrite)
                .map_err(wrap)?;
        } else {
            emitter
                .copy_file(&source, &destination, FileCategory::Supporting, &overwrite)
                .map_err(wrap)?;
        }
    }
    Ok(())
}

/// Write the ignore-rule file (first run only) and the version stamp (every run)
pub fn write_metadata(output_dir: &Path, emitter: &mut Emitter<'_>) -> Result<()> {
    let ignore_path = ignore_file_path(output_dir);
    if !emitter.exists(&ignore_path) {
        let text = IgnoreFileTemplate {
            generator_version: crate::GENERATOR_VERSION,
        }
        .render()
        .map_err(|e| GenerateError::Template {
            template: IGNORE_FILE_NAME.to_string(),
            source: e.into(),
        })?;
        emitter
            .write_file(&ignore_path, text.as_bytes(), FileCategory::Metadata)
            .map_err(GenerateError::io(&ignore_path))?;
    }

    let version_path = version_file_path(output_dir);
    emitter
        .write_file(
            &version_path,
            format!("{}\n", crate::GENERATOR_VERSION).as_bytes(),
            FileCategory::Metadata,
        )
        .map_err(GenerateError::io(&version_path))?;
    Ok(())
}
