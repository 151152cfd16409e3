//! Run configuration injected into the generator.
//!
//! Nothing in the pipeline reads process state on its own; everything that
//! can influence a run arrives through [`GenerationConfig`]. The CLI builds
//! one from flags and [`GenerationConfig::from_env`].
//!
//! ## Environment Variables
//!
//! | Variable | Meaning |
//! |---|---|
//! | `BRRTR_GEN_APIS` | `true`/`false`, or a comma-separated tag allow-list |
//! | `BRRTR_GEN_MODELS` | `true`/`false`, or a comma-separated model allow-list |
//! | `BRRTR_GEN_SUPPORTING_FILES` | `true`/`false`, or a comma-separated destination allow-list |
//! | `BRRTR_GEN_MODEL_TESTS` / `_MODEL_DOCS` / `_API_TESTS` / `_API_DOCS` | sub-toggles |
//! | `BRRTR_GEN_IGNORE_FILE` | override path of the ignore-rule file |
//! | `BRRTR_GEN_METADATA` | `false` skips the ignore-rule file and version stamp |
//! | `BRRTR_GEN_DEBUG` | comma-separated subset of `description,models,operations,supporting` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use tracing::warn;

use super::options::{Toggle, ToggleOverrides};

/// Pretty-print switches; they never change what gets generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSwitches {
    pub description: bool,
    pub models: bool,
    pub operations: bool,
    pub supporting_files: bool,
}

/// Everything a caller can configure about a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Per-run overrides; highest precedence
    pub overrides: ToggleOverrides,
    /// Externally supplied toggle properties
    pub properties_toggles: ToggleOverrides,
    /// Only generate models with these schema names; empty means all
    pub models: Option<BTreeSet<String>>,
    /// Only generate API files for these tags; empty means all
    pub apis: Option<BTreeSet<String>>,
    /// Only generate supporting files with these destination names
    pub supporting_files: Option<BTreeSet<String>>,
    /// Generate every supporting file regardless of `supporting_files`
    pub supporting_files_all: bool,
    /// Write the ignore-rule file and version stamp
    pub generate_metadata: bool,
    pub ignore_file_override: Option<PathBuf>,
    /// Identifier of the input description, usually its path
    pub input_spec: Option<String>,
    /// Extra template properties supplied by the caller
    pub properties: Map<String, Value>,
    pub debug: DebugSwitches,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            overrides: ToggleOverrides::default(),
            properties_toggles: ToggleOverrides::default(),
            models: None,
            apis: None,
            supporting_files: None,
            supporting_files_all: false,
            generate_metadata: true,
            ignore_file_override: None,
            input_spec: None,
            properties: Map::new(),
            debug: DebugSwitches::default(),
        }
    }
}

/// A list-or-boolean switch value as found in environment variables
enum SwitchValue {
    Flag(bool),
    List(BTreeSet<String>),
}

fn parse_switch(raw: &str) -> SwitchValue {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => SwitchValue::Flag(true),
        "false" => SwitchValue::Flag(false),
        _ => SwitchValue::List(split_list(raw)),
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true`/`false` in any case; anything else is logged and ignored
fn parse_bool(var: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => {
            warn!(var, value = raw, "Unrecognised boolean, ignoring");
            None
        }
    }
}

impl GenerationConfig {
    /// Load from `BRRTR_GEN_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = GenerationConfig::default();

        if let Some(raw) = lookup("BRRTR_GEN_APIS") {
            match parse_switch(&raw) {
                SwitchValue::Flag(b) => config.properties_toggles.apis = Some(b),
                SwitchValue::List(list) => {
                    config.properties_toggles.apis = Some(true);
                    config.apis = Some(list);
                }
            }
        }
        if let Some(raw) = lookup("BRRTR_GEN_MODELS") {
            match parse_switch(&raw) {
                SwitchValue::Flag(b) => config.properties_toggles.models = Some(b),
                SwitchValue::List(list) => {
                    config.properties_toggles.models = Some(true);
                    config.models = Some(list);
                }
            }
        }
        if let Some(raw) = lookup("BRRTR_GEN_SUPPORTING_FILES") {
            match parse_switch(&raw) {
                SwitchValue::Flag(false) => config.properties_toggles.supporting_files = Some(false),
                SwitchValue::Flag(true) => {
                    config.properties_toggles.supporting_files = Some(true);
                    config.supporting_files_all = true;
                }
                SwitchValue::List(list) => {
                    config.properties_toggles.supporting_files = Some(true);
                    config.supporting_files = Some(list);
                }
            }
        }
        for (var, toggle) in [
            ("BRRTR_GEN_MODEL_TESTS", Toggle::ModelTests),
            ("BRRTR_GEN_MODEL_DOCS", Toggle::ModelDocs),
            ("BRRTR_GEN_API_TESTS", Toggle::ApiTests),
            ("BRRTR_GEN_API_DOCS", Toggle::ApiDocs),
            ("BRRTR_GEN_USE_OAS2", Toggle::UseOas2),
        ] {
            if let Some(value) = lookup(var).and_then(|raw| parse_bool(var, &raw)) {
                config.properties_toggles.set(toggle, Some(value));
            }
        }
        if let Some(raw) = lookup("BRRTR_GEN_IGNORE_FILE") {
            if !raw.trim().is_empty() {
                config.ignore_file_override = Some(PathBuf::from(raw.trim()));
            }
        }
        if let Some(value) = lookup("BRRTR_GEN_METADATA").and_then(|raw| parse_bool("BRRTR_GEN_METADATA", &raw)) {
            config.generate_metadata = value;
        }
        if let Some(raw) = lookup("BRRTR_GEN_DEBUG") {
            let parts = split_list(&raw);
            config.debug = DebugSwitches {
                description: parts.contains("description"),
                models: parts.contains("models"),
                operations: parts.contains("operations"),
                supporting_files: parts.contains("supporting"),
            };
        }
        config
    }

    /// Model allow-list, `None` when every model is wanted
    pub fn model_filter(&self) -> Option<&BTreeSet<String>> {
        self.models.as_ref().filter(|s| !s.is_empty())
    }

    /// Tag allow-list, `None` when every tag is wanted
    pub fn api_filter(&self) -> Option<&BTreeSet<String>> {
        self.apis.as_ref().filter(|s| !s.is_empty())
    }

    /// Whether a supporting file with this destination name passes the selective filter
    pub fn wants_supporting_file(&self, destination: &str) -> bool {
        if self.supporting_files_all {
            return true;
        }
        match self.supporting_files.as_ref() {
            Some(list) if !list.is_empty() => list.contains(destination),
            _ => true,
        }
    }
}
