//! Pipeline controller.
//!
//! [`Generator`] owns the description, the backend and the run configuration
//! and sequences the stages: options → models → operations → bundle and
//! supporting files → final backend hook. Both entry points run the same
//! pipeline; [`Generator::generate_bundle`] just routes output through an
//! in-memory sink and hands back the bundle instead of the file list.

use serde::Serialize;
use tracing::{debug, info};

use super::auth::all_auth_methods;
use super::backend::Backend;
use super::config::GenerationConfig;
use super::context::RenderingContext;
use super::error::{GenerateError, Result};
use super::gate::{IgnoreProcessor, OutputGate};
use super::metadata::{derive_server_info, project_info, RunMetadata};
use super::models::{emit_models, process_models};
use super::operations::{emit_apis, process_paths};
use super::options::{resolve_options, GenerationOptions, OptionSources};
use super::output::{DryRunSink, Emitter, FsSink, GeneratedFile, OutputSink};
use super::properties::GeneratorProperties;
use super::supporting::{build_bundle, emit_supporting_files, write_metadata};
use super::templates::{MiniJinjaRenderer, TemplateRenderer};
use crate::spec::ApiDescription;

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

struct RunOutput {
    files: Vec<GeneratedFile>,
    bundle: RenderingContext,
}

/// Drives one generation run.
///
/// # Example
///
/// ```rust,ignore
/// use brrtrouter_codegen::generator::{Generator, GenerationConfig, ManifestBackend};
/// use brrtrouter_codegen::spec::load_description;
///
/// let description = load_description("openapi.yaml".as_ref())?;
/// let backend = ManifestBackend::from_file("brrtrouter-codegen.toml".as_ref())?;
/// let files = Generator::new()
///     .with_description(description)
///     .with_backend(backend)
///     .with_config(GenerationConfig::from_env())
///     .generate()?;
/// ```
pub struct Generator {
    description: Option<ApiDescription>,
    backend: Option<Box<dyn Backend>>,
    config: GenerationConfig,
    renderer: Box<dyn TemplateRenderer>,
    sink: Box<dyn OutputSink>,
}

impl Default for Generator {
    fn default() -> Self {
        Generator {
            description: None,
            backend: None,
            config: GenerationConfig::default(),
            renderer: Box::new(MiniJinjaRenderer),
            sink: Box::new(FsSink),
        }
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: ApiDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_backend<B: Backend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    pub fn with_boxed_backend(mut self, backend: Box<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Send output somewhere other than the filesystem
    pub fn with_sink(mut self, sink: Box<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Run every enabled pipeline and return the files written
    pub fn generate(&mut self) -> Result<Vec<GeneratedFile>> {
        let output = self.run(false)?;
        info!(files = output.files.len(), "Generation complete");
        Ok(output.files)
    }

    /// Run the same pipelines without touching the filesystem and return the
    /// aggregate bundle
    pub fn generate_bundle(&mut self) -> Result<RenderingContext> {
        Ok(self.run(true)?.bundle)
    }

    fn run(&mut self, dry_run: bool) -> Result<RunOutput> {
        let Generator {
            description,
            backend,
            config,
            renderer,
            sink,
        } = self;
        let description = description.as_ref().ok_or(GenerateError::MissingDescription)?;
        let backend: &dyn Backend = backend.as_deref().ok_or(GenerateError::MissingConfiguration)?;

        let sources = OptionSources {
            explicit: config.overrides,
            external: config.properties_toggles,
            backend: backend.backend_defaults(),
        };
        let options = resolve_options(&sources);
        info!(
            backend = %backend.fully_qualified_name(),
            apis = options.apis,
            models = options.models,
            supporting_files = options.supporting_files,
            "Starting generation"
        );
        let properties = run_properties(backend, config, description, &sources, &options)?;

        backend
            .preprocess_description(description)
            .map_err(GenerateError::hook("preprocess_description"))?;
        if config.debug.description {
            info!(description = %pretty(description), "Description");
        }

        let schemes = description.security_schemes();
        let run = RunMetadata {
            server: derive_server_info(description, backend),
            properties: properties.entries(),
            vendor_extensions: description.vendor_extensions().into_iter().collect(),
            auth_methods: backend.from_security(all_auth_methods(&schemes)),
            api_package: backend.api_package(),
            model_package: backend.model_package(),
        };

        let output_dir = backend.output_dir();
        let ignore_override = config
            .ignore_file_override
            .clone()
            .or_else(|| backend.ignore_file_override());
        let gate = OutputGate::new(IgnoreProcessor::load(&output_dir, ignore_override.as_deref()));

        let mut dry_sink = DryRunSink::new();
        let sink: &mut dyn OutputSink = if dry_run { &mut dry_sink } else { &mut **sink };
        let mut emitter = Emitter::new(
            &gate,
            sink,
            &**renderer,
            backend.template_dir(),
            backend.common_template_dir(),
        );

        let all_models = if options.models {
            let processed = process_models(backend, &description.schemas(), config.model_filter(), &run.properties)?;
            if config.debug.models {
                let contexts: Vec<_> = processed.iter().map(|m| m.context.as_map()).collect();
                info!(models = %pretty(&contexts), "Processed models");
            }
            emit_models(backend, &processed, &options, &mut emitter)?
        } else {
            debug!("Model generation disabled");
            Vec::new()
        };

        let all_operations = if options.apis {
            let groups = process_paths(backend, description)?;
            if config.debug.operations {
                info!(operations = %pretty(&groups), "Processed operations");
            }
            emit_apis(backend, groups, config.api_filter(), &options, &all_models, &run, &mut emitter)?
        } else {
            debug!("API generation disabled");
            Vec::new()
        };

        let bundle = build_bundle(backend, description, all_models, all_operations, &run)
            .map_err(|e| GenerateError::supporting_file("<bundle>", e))?;
        if config.debug.supporting_files {
            info!(bundle = %pretty(&bundle), "Supporting file bundle");
        }
        if options.supporting_files {
            emit_supporting_files(backend, &bundle, config, &mut emitter)?;
        } else {
            debug!("Supporting file generation disabled");
        }
        if config.generate_metadata {
            write_metadata(&output_dir, &mut emitter)?;
        }

        backend
            .process_description(description)
            .map_err(GenerateError::hook("process_description"))?;

        Ok(RunOutput {
            files: emitter.into_files(),
            bundle,
        })
    }
}

/// Assemble the property map for a run.
///
/// Backend-declared properties come first, caller-supplied ones override
/// them, then the resolved toggles and the info block are stamped in.
fn run_properties(
    backend: &dyn Backend,
    config: &GenerationConfig,
    description: &ApiDescription,
    sources: &OptionSources,
    options: &GenerationOptions,
) -> Result<GeneratorProperties> {
    let mut properties = GeneratorProperties::for_run(backend.fully_qualified_name(), config.input_spec.clone());
    for (key, value) in backend.additional_properties() {
        properties.insert(key, value);
    }
    for (key, value) in &config.properties {
        properties.insert(key.clone(), value.clone());
    }
    options.stamp(sources, &mut properties);
    backend
        .process_opts(&mut properties)
        .map_err(GenerateError::hook("process_opts"))?;
    properties.app = project_info(description.info.as_ref(), backend);
    Ok(properties)
}
