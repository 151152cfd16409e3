//! Operation pipeline: paths → tag groups → per-tag contexts → API files.

use http::Method;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::debug;

use super::auth::resolve_operation_auth;
use super::backend::{Backend, IntermediateOperation};
use super::context::{keys, set_vendor_extension, RenderingContext};
use super::error::{GenerateError, Result};
use super::gate::FileCategory;
use super::imports::resolve_operation_imports;
use super::metadata::RunMetadata;
use super::options::GenerationOptions;
use super::output::Emitter;
use super::params::merge_path_parameters;
use crate::spec::{ApiDescription, Operation, Tag};

/// Operations grouped under their sanitized tag, ordered by tag
pub type OperationGroups = BTreeMap<String, Vec<IntermediateOperation>>;

/// Tag name used when an operation declares none
pub const DEFAULT_TAG: &str = "default";

/// Resolve an operation's tag names against the declared tag objects.
///
/// Unknown names become bare tags; no tags at all yields [`DEFAULT_TAG`].
pub fn resolve_tags(description: &ApiDescription, operation: &Operation) -> Vec<Tag> {
    let mut tags: Vec<Tag> = operation
        .tags
        .iter()
        .flatten()
        .map(|name| {
            description
                .declared_tag(name)
                .cloned()
                .unwrap_or_else(|| Tag::named(name.clone()))
        })
        .collect();
    if tags.is_empty() {
        tags.push(Tag::named(DEFAULT_TAG));
    }
    tags
}

fn parse_method(method: &str) -> anyhow::Result<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid HTTP method '{method}': {e}"))
}

/// Project every operation of every path into tag groups.
///
/// Methods are visited in the fixed order get, head, put, post, delete,
/// patch, options. The operation is projected once per resolved tag.
pub fn process_paths<B: Backend + ?Sized>(backend: &B, description: &ApiDescription) -> Result<OperationGroups> {
    let mut groups = OperationGroups::new();
    let Some(paths) = description.paths.as_ref() else {
        return Ok(groups);
    };
    let schemes = description.security_schemes();
    let global = description.security.as_deref();

    for (path, item) in paths {
        for (method_name, operation) in item.operations() {
            let tags = resolve_tags(description, operation);
            let merged = Operation {
                parameters: Some(merge_path_parameters(
                    operation.parameters.as_deref(),
                    &item.parameters,
                )),
                ..operation.clone()
            };
            let escaped_path = backend.escape_quotation_mark(path);

            for tag in &tags {
                let wrap = |source: anyhow::Error| GenerateError::Operation {
                    tag: tag.name.clone(),
                    operation_id: operation.operation_id.clone(),
                    method: method_name.to_string(),
                    path: path.clone(),
                    source,
                };
                let method = parse_method(method_name).map_err(wrap)?;
                let mut projected = backend
                    .from_operation(&escaped_path, &method, &merged, description)
                    .map_err(wrap)?;
                projected.tags = tags.clone();

                let auth = resolve_operation_auth(merged.security.as_deref(), global, &schemes);
                if !auth.is_empty() {
                    projected.auth_methods = backend.from_security(auth);
                    projected.has_auth_methods = true;
                    projected.set_vendor_extension(keys::HAS_AUTH_METHODS_EXT, true);
                }

                backend.add_operation_to_group(&backend.sanitize_tag(&tag.name), projected, &mut groups);
            }
        }
    }
    Ok(groups)
}

/// Suffix every repeated nickname after the first with a running counter.
///
/// The counter is shared by the whole group and collisions are only checked
/// against the nicknames as they were before renaming.
pub fn disambiguate_nicknames(operations: &mut [IntermediateOperation]) {
    let mut seen = HashSet::new();
    let mut counter = 0;
    for op in operations.iter_mut() {
        let original = op.nickname.clone();
        if seen.contains(&original) {
            counter += 1;
            op.nickname = format!("{original}_{counter}");
        }
        seen.insert(original);
    }
}

/// Set `hasMore: true` on every element but the last
pub fn mark_has_more(entries: &mut [Value]) {
    let last = entries.len().saturating_sub(1);
    for (i, entry) in entries.iter_mut().enumerate() {
        if i < last {
            if let Some(obj) = entry.as_object_mut() {
                obj.insert(keys::HAS_MORE.to_string(), Value::Bool(true));
            }
        }
    }
}

fn sort_params_flag(properties: &Map<String, Value>) -> bool {
    match properties.get(keys::SORT_PARAMS_BY_REQUIRED_FLAG) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => true,
    }
}

/// Build the rendering context of one tag group
pub fn build_group_context<B: Backend + ?Sized>(
    backend: &B,
    tag: &str,
    mut operations: Vec<IntermediateOperation>,
    all_models: &[Value],
    run: &RunMetadata,
) -> anyhow::Result<RenderingContext> {
    operations.sort_by(|a, b| a.nickname.cmp(&b.nickname));
    disambiguate_nicknames(&mut operations);

    let raw_imports: BTreeSet<String> = operations
        .iter()
        .flat_map(|op| op.imports.iter().cloned())
        .collect();
    let imports = resolve_operation_imports(backend, &raw_imports);

    let mut ops = Map::new();
    ops.insert(keys::CLASSNAME.to_string(), Value::String(backend.api_name(tag)));
    ops.insert(keys::PATH_PREFIX.to_string(), Value::String(backend.api_var_name(tag)));
    ops.insert(keys::OPERATION.to_string(), serde_json::to_value(&operations)?);

    let mut ctx = RenderingContext::new();
    ctx.insert(keys::OPERATIONS, Value::Object(ops));
    ctx.insert(keys::PACKAGE, run.api_package.clone());
    ctx.insert(keys::HAS_IMPORT, !imports.is_empty());
    ctx.insert_serialized(keys::IMPORTS, &imports)?;

    backend.post_process_operations(&mut ctx)?;
    backend.post_process_operations_with_models(&mut ctx, all_models)?;

    if let Some(last) = ctx
        .get_mut(keys::OPERATIONS)
        .and_then(|o| o.get_mut(keys::OPERATION))
        .and_then(Value::as_array_mut)
        .and_then(|list| list.last_mut())
    {
        set_vendor_extension(last, keys::HAS_MORE_EXT, false);
    }

    if !run.auth_methods.is_empty() {
        ctx.insert_serialized(keys::AUTH_METHODS, &run.auth_methods)?;
        ctx.insert(keys::HAS_AUTH_METHODS, true);
    }
    ctx.insert(keys::BASE_PATH, run.server.base_path.clone());
    ctx.insert(keys::BASE_PATH_WITHOUT_HOST, run.server.base_path_without_host.clone());
    ctx.insert(keys::CONTEXT_PATH, run.server.context_path.clone());
    ctx.insert(keys::BASE_NAME, tag);
    ctx.insert(keys::MODEL_PACKAGE, run.model_package.clone());
    ctx.extend(&run.properties);
    ctx.insert(keys::CLASSNAME, backend.api_name(tag));
    ctx.insert(keys::CLASS_VAR_NAME, backend.api_var_name(tag));
    ctx.insert(keys::IMPORT_PATH, backend.api_import(tag));
    ctx.insert(keys::CLASS_FILENAME, backend.api_filename(tag));
    if !run.vendor_extensions.is_empty() {
        ctx.insert(keys::VENDOR_EXTENSIONS, Value::Object(run.vendor_extensions.clone()));
    }
    ctx.insert(keys::SORT_PARAMS_BY_REQUIRED_FLAG, sort_params_flag(&run.properties));
    ctx.insert(keys::HAS_MODEL, !all_models.is_empty());
    Ok(ctx)
}

/// Build every tag group's context and write the API, API test and API doc files.
///
/// Returns the `apiInfo.apis` list: one context per group, all but the last
/// flagged with `hasMore`.
pub fn emit_apis<B: Backend + ?Sized>(
    backend: &B,
    groups: OperationGroups,
    allow_list: Option<&BTreeSet<String>>,
    options: &GenerationOptions,
    all_models: &[Value],
    run: &RunMetadata,
    emitter: &mut Emitter<'_>,
) -> Result<Vec<Value>> {
    let overwrite = |p: &Path| backend.should_overwrite(p);
    let mut all_operations = Vec::new();

    for (tag, operations) in groups {
        if allow_list.is_some_and(|allowed| !allowed.contains(&tag)) {
            debug!(tag = %tag, "Tag not in allow-list");
            continue;
        }
        let wrap = |source: anyhow::Error| GenerateError::ApiFile {
            tag: tag.clone(),
            source,
        };
        let ctx = build_group_context(backend, &tag, operations, all_models, run).map_err(wrap)?;
        all_operations.push(ctx.clone().into_value());

        for (template, suffix) in backend.api_templates() {
            let file = backend
                .api_folder()
                .join(format!("{}{}", backend.api_filename(&tag), suffix));
            emitter
                .render_file(&template, &ctx, &file, FileCategory::Source, &overwrite)
                .map_err(wrap)?;
        }
        if options.api_tests {
            for (template, suffix) in backend.api_test_templates() {
                let file = backend
                    .api_test_folder()
                    .join(format!("{}{}", backend.api_test_filename(&tag), suffix));
                emitter
                    .render_file(&template, &ctx, &file, FileCategory::Test, &overwrite)
                    .map_err(wrap)?;
            }
        }
        if options.api_docs {
            for (template, suffix) in backend.api_doc_templates() {
                let file = backend
                    .api_doc_folder()
                    .join(format!("{}{}", backend.api_doc_filename(&tag), suffix));
                emitter
                    .render_file(&template, &ctx, &file, FileCategory::Documentation, &overwrite)
                    .map_err(wrap)?;
            }
        }
    }

    mark_has_more(&mut all_operations);
    Ok(all_operations)
}
