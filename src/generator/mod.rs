//! # Generator Module
//!
//! The generator module turns a parsed API description into model, API and
//! supporting files for a pluggable target-language backend.
//!
//! ## Overview
//!
//! A run projects the description into rendering contexts and hands each one
//! to a template:
//! - **Models** - one context per schema, keyed and ordered by display name
//! - **APIs** - one context per tag, holding that tag's operations
//! - **Supporting files** - one aggregate bundle for project-level files
//! - **Metadata** - an ignore-rule file and a version stamp at the output root
//!
//! ## Architecture
//!
//! ```text
//! GenerationConfig ─┐
//!                   ├─► options ─► models ─► operations ─► bundle ─► supporting files
//! ApiDescription ───┤                 │           │            │
//! Backend ──────────┘                 └── Emitter (gate + sink + renderer) ──┘
//! ```
//!
//! 1. **Option resolution** - toggles from config, properties and backend defaults
//! 2. **Model pipeline** - schema projection, composed-model merge, alias handling
//! 3. **Operation pipeline** - tags, inherited parameters, auth, id collisions
//! 4. **Supporting-file pipeline** - the bundle, copied and rendered project files
//!
//! Every write goes through the [`OutputGate`]: ignore rules first, then the
//! backend's overwrite policy. Test files are never replaced once present.
//!
//! ## Backends
//!
//! A backend is any type implementing the capability traits in [`backend`]:
//! [`Naming`], [`TypeMapping`], [`SchemaProjector`], [`OperationProjector`],
//! [`PostProcessor`], [`FileLayout`] and [`BackendSettings`]. Most methods
//! have defaults. [`ManifestBackend`] is a data-driven implementation
//! configured from `brrtrouter-codegen.toml`.
//!
//! ## Usage
//!
//! ### CLI Usage
//!
//! ```bash
//! cargo run --bin brrtrouter-codegen -- generate \
//!     --spec openapi.yaml \
//!     --manifest brrtrouter-codegen.toml
//! ```
//!
//! ### Programmatic Usage
//!
//! ```rust,ignore
//! use brrtrouter_codegen::generator::{Generator, GenerationConfig, ManifestBackend};
//! use brrtrouter_codegen::spec::load_description;
//!
//! # fn main() -> anyhow::Result<()> {
//! let files = Generator::new()
//!     .with_description(load_description("openapi.yaml".as_ref())?)
//!     .with_backend(ManifestBackend::from_file("brrtrouter-codegen.toml".as_ref())?)
//!     .with_config(GenerationConfig::default())
//!     .generate()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Templates
//!
//! Files ending in `.jinja` are rendered with MiniJinja; anything else listed
//! as a supporting file is copied verbatim. Templates are looked up in the
//! backend's template directory first, then in its common template directory.

pub mod auth;
pub mod backend;
pub mod config;
pub mod context;
mod controller;
pub mod error;
pub mod gate;
pub mod imports;
pub mod manifest;
pub mod metadata;
pub mod models;
pub mod naming;
pub mod operations;
pub mod options;
pub mod output;
pub mod params;
pub mod properties;
pub mod supporting;
pub mod templates;

pub use auth::AuthMethod;
pub use backend::{
    Backend, BackendSettings, FileLayout, IntermediateModel, IntermediateOperation, Naming,
    OperationProjector, PostProcessor, SchemaProjector, SupportingFileDescriptor, TypeMapping,
};
pub use config::{DebugSwitches, GenerationConfig};
pub use context::RenderingContext;
pub use controller::Generator;
pub use error::{GenerateError, Result};
pub use gate::{FileCategory, IgnoreProcessor, OutputGate};
pub use manifest::{Manifest, ManifestBackend, MANIFEST_FILE_NAME};
pub use models::{ProcessedModel, ProcessedModels};
pub use naming::{to_camel_case, to_snake_case};
pub use operations::OperationGroups;
pub use options::{GenerationOptions, Toggle, ToggleOverrides};
pub use output::{DryRunSink, FsSink, GeneratedFile, OutputSink};
pub use properties::GeneratorProperties;
pub use templates::{MiniJinjaRenderer, TemplateRenderer};
