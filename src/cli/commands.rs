use crate::generator::manifest::resolve_manifest_path;
use crate::generator::{
    DryRunSink, GenerationConfig, Generator, ManifestBackend, Toggle, MANIFEST_FILE_NAME,
};
use crate::logging::{init_logging, LogConfig};
use crate::spec::load_description;
use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

/// Command-line interface for the BRRTRouter code generator
#[derive(Parser, Debug)]
#[command(name = "brrtrouter-codegen", version)]
#[command(about = "Generate source files from an OpenAPI description", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate model, API and supporting files
    Generate(GenerateArgs),
    /// Print the supporting-file bundle as JSON; nothing is written
    Bundle(GenerateArgs),
}

/// Inputs and switches shared by `generate` and `bundle`
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Path to the OpenAPI description (YAML or JSON)
    #[arg(short, long)]
    pub spec: PathBuf,

    /// Backend manifest; defaults to brrtrouter-codegen.toml next to the spec
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Override the manifest's output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Generate API files, optionally only for a comma-separated list of tags
    #[arg(long, num_args = 0..=1, value_name = "TAGS")]
    pub apis: Option<Option<String>>,

    /// Generate models, optionally only for a comma-separated list of schemas
    #[arg(long, num_args = 0..=1, value_name = "SCHEMAS")]
    pub models: Option<Option<String>>,

    /// Generate supporting files, optionally only a comma-separated list of destinations
    #[arg(long, num_args = 0..=1, value_name = "FILES")]
    pub supporting_files: Option<Option<String>>,

    #[arg(long, default_value_t = false)]
    pub no_model_tests: bool,

    #[arg(long, default_value_t = false)]
    pub no_model_docs: bool,

    #[arg(long, default_value_t = false)]
    pub no_api_tests: bool,

    #[arg(long, default_value_t = false)]
    pub no_api_docs: bool,

    /// Skip the ignore-rule file and version stamp
    #[arg(long, default_value_t = false)]
    pub no_metadata: bool,

    /// Use this ignore-rule file instead of the one in the output directory
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Show what would be written without touching the filesystem
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Extra template property as key=value (repeatable)
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
    pub define: Vec<String>,
}

/// Parse a `key=value` property definition.
///
/// `true`/`false` become booleans, integers become numbers, anything else
/// stays a string.
pub fn parse_define(raw: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid property '{raw}': expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid property '{raw}': empty key");
    }
    let value = match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => other
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(other.to_string())),
    };
    Ok((key.to_string(), value))
}

fn selection(raw: Option<&str>) -> Option<BTreeSet<String>> {
    raw.map(crate::generator::config::split_list)
        .filter(|list| !list.is_empty())
}

impl GenerateArgs {
    /// Layer the command-line switches over `config`
    pub fn apply(&self, config: &mut GenerationConfig) -> anyhow::Result<()> {
        if let Some(tags) = &self.apis {
            config.overrides.set(Toggle::Apis, Some(true));
            config.apis = selection(tags.as_deref());
        }
        if let Some(models) = &self.models {
            config.overrides.set(Toggle::Models, Some(true));
            config.models = selection(models.as_deref());
        }
        if let Some(files) = &self.supporting_files {
            config.overrides.set(Toggle::SupportingFiles, Some(true));
            match selection(files.as_deref()) {
                Some(list) => {
                    config.supporting_files = Some(list);
                    config.supporting_files_all = false;
                }
                None => config.supporting_files_all = true,
            }
        }
        for (flag, toggle) in [
            (self.no_model_tests, Toggle::ModelTests),
            (self.no_model_docs, Toggle::ModelDocs),
            (self.no_api_tests, Toggle::ApiTests),
            (self.no_api_docs, Toggle::ApiDocs),
        ] {
            if flag {
                config.overrides.set(toggle, Some(false));
            }
        }
        if self.no_metadata {
            config.generate_metadata = false;
        }
        if let Some(path) = &self.ignore_file {
            config.ignore_file_override = Some(path.clone());
        }
        for raw in &self.define {
            let (key, value) = parse_define(raw)?;
            config.properties.insert(key, value);
        }
        config.input_spec = Some(self.spec.display().to_string());
        Ok(())
    }

    /// Build a generator from the description, manifest and switches
    pub fn generator(&self) -> anyhow::Result<Generator> {
        let description = load_description(&self.spec)?;
        let manifest_path = resolve_manifest_path(self.manifest.as_deref(), &self.spec)
            .ok_or_else(|| match &self.manifest {
                Some(path) => anyhow!("Manifest not found: {}", path.display()),
                None => anyhow!(
                    "No {} found next to {}; pass --manifest",
                    MANIFEST_FILE_NAME,
                    self.spec.display()
                ),
            })?;
        info!(manifest = %manifest_path.display(), "Using backend manifest");
        let mut backend = ManifestBackend::from_file(&manifest_path)?;
        if let Some(output) = &self.output {
            backend = backend.with_output_dir(output.clone());
        }

        let mut config = GenerationConfig::from_env();
        self.apply(&mut config)?;

        Ok(Generator::new()
            .with_description(description)
            .with_backend(backend)
            .with_config(config))
    }
}

/// Execute the parsed command line
///
/// # Errors
///
/// Returns an error if:
/// - Logging cannot be initialized
/// - The description or manifest cannot be loaded
/// - Generation fails
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    init_logging(&log_config)?;

    match cli.command {
        Commands::Generate(args) => {
            let mut generator = args.generator()?;
            if args.dry_run {
                generator = generator.with_sink(Box::new(DryRunSink::new()));
            }
            let files = generator.generate()?;
            if args.dry_run {
                for file in &files {
                    println!("would write {} ({:?})", file.path.display(), file.category);
                }
            }
            info!(files = files.len(), dry_run = args.dry_run, "Done");
            Ok(())
        }
        Commands::Bundle(args) => {
            let bundle = args.generator()?.generate_bundle()?;
            let json = serde_json::to_string_pretty(&bundle).context("Failed to serialize bundle")?;
            println!("{json}");
            Ok(())
        }
    }
}
