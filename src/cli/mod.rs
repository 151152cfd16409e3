//! # CLI Module
//!
//! Command-line front end for the generator core.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Generate models, APIs and supporting files for the backend described by a
//! manifest:
//!
//! ```bash
//! brrtrouter-codegen generate --spec openapi.yaml --manifest brrtrouter-codegen.toml
//! ```
//!
//! Options:
//! - `--spec <FILE>` - OpenAPI description (YAML or JSON, required)
//! - `--manifest <FILE>` - backend manifest (default: `brrtrouter-codegen.toml` next to the spec)
//! - `--output <DIR>` - override the manifest's output directory
//! - `--models [LIST]`, `--apis [LIST]`, `--supporting-files [LIST]` - select categories,
//!   optionally restricted to a comma-separated allow-list
//! - `--no-model-tests`, `--no-model-docs`, `--no-api-tests`, `--no-api-docs`
//! - `--no-metadata` - skip the ignore file and version stamp
//! - `--ignore-file <FILE>` - use a different ignore-rule file
//! - `-D key=value` - extra template property (repeatable)
//! - `--dry-run` - list what would be written without touching disk
//!
//! ### `bundle`
//!
//! Print the aggregate supporting-file bundle as JSON, without writing files:
//!
//! ```bash
//! brrtrouter-codegen bundle --spec openapi.yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use brrtrouter_codegen::cli::{Cli, run_cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{parse_define, run_cli, Cli, Commands, GenerateArgs};
