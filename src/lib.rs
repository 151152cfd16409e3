//! # BRRTRouter Codegen
//!
//! **brrtrouter-codegen** is the core of the BRRTRouter
//! code generator. It reads an [OpenAPI 3](https://spec.openapis.org/oas/v3.1.0)
//! description and projects it into rendering contexts for models, APIs and
//! supporting files. A pluggable backend decides names, types and templates.
//!
//! ## Architecture
//!
//! - **[`spec`]** - typed API description and YAML/JSON loading
//! - **[`generator`]** - option resolution, the model/operation/supporting
//!   pipelines, output gating and the backend traits
//! - **[`cli`]** - the `brrtrouter-codegen` command line
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(brrtrouter-codegen)
//!     participant Spec as spec::load_description
//!     participant Gen as generator::Generator
//!     participant Backend
//!     participant FS as File System
//!
//!     User->>CLI: generate --spec openapi.yaml
//!     CLI->>Spec: load_description("openapi.yaml")
//!     Spec-->>CLI: ApiDescription
//!     CLI->>Gen: with_backend(ManifestBackend)
//!     Gen->>Backend: from_model / from_operation
//!     Backend-->>Gen: IntermediateModel / IntermediateOperation
//!     Gen->>Backend: post-processing hooks
//!     Gen->>FS: gated writes (ignore rules, overwrite policy)
//!     Gen-->>CLI: Vec<GeneratedFile>
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brrtrouter_codegen::generator::{Generator, GenerationConfig, ManifestBackend};
//! use brrtrouter_codegen::spec::load_description;
//!
//! let files = Generator::new()
//!     .with_description(load_description("openapi.yaml".as_ref())?)
//!     .with_backend(ManifestBackend::from_file("brrtrouter-codegen.toml".as_ref())?)
//!     .with_config(GenerationConfig::from_env())
//!     .generate()?;
//! println!("{} files", files.len());
//! ```

pub mod cli;
pub mod generator;
pub mod logging;
pub mod spec;

/// Version stamped into generated metadata and template properties
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use spec::{load_description, parse_description, ApiDescription};
