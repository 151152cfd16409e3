//! Generation toggle resolution.
//!
//! Each toggle is resolved through a fixed chain of sources, first set value
//! wins: explicit per-run override → externally supplied property → backend
//! default → hard default.
//!
//! The three top-level categories (`apis`, `models`, `supportingFiles`) are
//! resolved together. When none of them is set anywhere in the chain all three
//! are enabled; as soon as one is set, every unset category is disabled. The
//! test/doc sub-toggles are independent of the top-level state and default to
//! enabled.

use serde::{Deserialize, Serialize};

use super::properties::GeneratorProperties;

/// Every switch the generator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Toggle {
    Apis,
    Models,
    SupportingFiles,
    ModelTests,
    ModelDocs,
    ApiTests,
    ApiDocs,
    UseOas2,
}

impl Toggle {
    pub const ALL: [Toggle; 8] = [
        Toggle::Apis,
        Toggle::Models,
        Toggle::SupportingFiles,
        Toggle::ModelTests,
        Toggle::ModelDocs,
        Toggle::ApiTests,
        Toggle::ApiDocs,
        Toggle::UseOas2,
    ];

    /// Property name used in configuration sources
    pub fn key(self) -> &'static str {
        match self {
            Toggle::Apis => "apis",
            Toggle::Models => "models",
            Toggle::SupportingFiles => "supportingFiles",
            Toggle::ModelTests => "modelTests",
            Toggle::ModelDocs => "modelDocs",
            Toggle::ApiTests => "apiTests",
            Toggle::ApiDocs => "apiDocs",
            Toggle::UseOas2 => "useOas2",
        }
    }
}

/// One layer of toggle values; `None` means "not set by this source"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToggleOverrides {
    pub apis: Option<bool>,
    pub models: Option<bool>,
    pub supporting_files: Option<bool>,
    pub model_tests: Option<bool>,
    pub model_docs: Option<bool>,
    pub api_tests: Option<bool>,
    pub api_docs: Option<bool>,
    pub use_oas2: Option<bool>,
}

impl ToggleOverrides {
    pub fn get(&self, toggle: Toggle) -> Option<bool> {
        match toggle {
            Toggle::Apis => self.apis,
            Toggle::Models => self.models,
            Toggle::SupportingFiles => self.supporting_files,
            Toggle::ModelTests => self.model_tests,
            Toggle::ModelDocs => self.model_docs,
            Toggle::ApiTests => self.api_tests,
            Toggle::ApiDocs => self.api_docs,
            Toggle::UseOas2 => self.use_oas2,
        }
    }

    pub fn set(&mut self, toggle: Toggle, value: Option<bool>) {
        let slot = match toggle {
            Toggle::Apis => &mut self.apis,
            Toggle::Models => &mut self.models,
            Toggle::SupportingFiles => &mut self.supporting_files,
            Toggle::ModelTests => &mut self.model_tests,
            Toggle::ModelDocs => &mut self.model_docs,
            Toggle::ApiTests => &mut self.api_tests,
            Toggle::ApiDocs => &mut self.api_docs,
            Toggle::UseOas2 => &mut self.use_oas2,
        };
        *slot = value;
    }

    pub fn with(mut self, toggle: Toggle, value: bool) -> Self {
        self.set(toggle, Some(value));
        self
    }
}

/// The sources consulted for each toggle, highest precedence first
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionSources {
    pub explicit: ToggleOverrides,
    pub external: ToggleOverrides,
    pub backend: ToggleOverrides,
}

impl OptionSources {
    /// First value set along the precedence chain
    pub fn probe(&self, toggle: Toggle) -> Option<bool> {
        self.explicit
            .get(toggle)
            .or_else(|| self.external.get(toggle))
            .or_else(|| self.backend.get(toggle))
    }
}

/// Final, fully resolved generation switches for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub apis: bool,
    pub models: bool,
    pub supporting_files: bool,
    pub model_tests: bool,
    pub model_docs: bool,
    pub api_tests: bool,
    pub api_docs: bool,
    pub use_oas2: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        resolve_options(&OptionSources::default())
    }
}

/// Resolve every toggle from its sources
pub fn resolve_options(sources: &OptionSources) -> GenerationOptions {
    let apis = sources.probe(Toggle::Apis);
    let models = sources.probe(Toggle::Models);
    let supporting = sources.probe(Toggle::SupportingFiles);

    let (apis, models, supporting_files) = if apis.is_none()
        && models.is_none()
        && supporting.is_none()
    {
        (true, true, true)
    } else {
        (
            apis.unwrap_or(false),
            models.unwrap_or(false),
            supporting.unwrap_or(false),
        )
    };

    GenerationOptions {
        apis,
        models,
        supporting_files,
        model_tests: sources.probe(Toggle::ModelTests).unwrap_or(true),
        model_docs: sources.probe(Toggle::ModelDocs).unwrap_or(true),
        api_tests: sources.probe(Toggle::ApiTests).unwrap_or(true),
        api_docs: sources.probe(Toggle::ApiDocs).unwrap_or(true),
        use_oas2: sources.probe(Toggle::UseOas2).unwrap_or(false),
    }
}

impl GenerationOptions {
    /// Record the resolved switches in the template properties.
    ///
    /// `useOas2` is only written when a source set it explicitly and the
    /// property is not already supplied externally.
    pub fn stamp(&self, sources: &OptionSources, properties: &mut GeneratorProperties) {
        properties.generate_api_tests = self.api_tests;
        properties.generate_model_tests = self.model_tests;
        properties.generate_api_docs = self.api_docs;
        properties.generate_model_docs = self.model_docs;
        let explicit_oas2 = sources
            .explicit
            .get(Toggle::UseOas2)
            .or_else(|| sources.external.get(Toggle::UseOas2));
        if explicit_oas2.is_some() && !properties.extra.contains_key(Toggle::UseOas2.key()) {
            properties.use_oas2 = Some(self.use_oas2);
        }
        if !self.api_tests && !self.model_tests {
            properties.exclude_tests = Some(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_set_enables_everything() {
        let opts = resolve_options(&OptionSources::default());
        assert!(opts.apis && opts.models && opts.supporting_files);
        assert!(opts.model_tests && opts.model_docs && opts.api_tests && opts.api_docs);
        assert!(!opts.use_oas2);
    }

    #[test]
    fn test_one_top_level_set_disables_the_rest() {
        for toggle in [Toggle::Apis, Toggle::Models, Toggle::SupportingFiles] {
            let sources = OptionSources {
                external: ToggleOverrides::default().with(toggle, true),
                ..Default::default()
            };
            let opts = resolve_options(&sources);
            assert_eq!(opts.apis, toggle == Toggle::Apis);
            assert_eq!(opts.models, toggle == Toggle::Models);
            assert_eq!(opts.supporting_files, toggle == Toggle::SupportingFiles);
        }
    }

    #[test]
    fn test_explicit_false_counts_as_set() {
        let sources = OptionSources {
            external: ToggleOverrides::default().with(Toggle::Models, false),
            ..Default::default()
        };
        let opts = resolve_options(&sources);
        assert!(!opts.apis && !opts.models && !opts.supporting_files);
    }

    #[test]
    fn test_precedence_chain() {
        let sources = OptionSources {
            explicit: ToggleOverrides::default().with(Toggle::ApiDocs, true),
            external: ToggleOverrides::default()
                .with(Toggle::ApiDocs, false)
                .with(Toggle::ModelDocs, false),
            backend: ToggleOverrides::default()
                .with(Toggle::ModelDocs, true)
                .with(Toggle::ApiTests, false),
        };
        let opts = resolve_options(&sources);
        assert!(opts.api_docs);
        assert!(!opts.model_docs);
        assert!(!opts.api_tests);
        assert!(opts.model_tests);
    }

    #[test]
    fn test_backend_default_is_a_top_level_source() {
        let sources = OptionSources {
            backend: ToggleOverrides::default().with(Toggle::Apis, true),
            ..Default::default()
        };
        let opts = resolve_options(&sources);
        assert!(opts.apis);
        assert!(!opts.models);
    }

    #[test]
    fn test_sub_toggles_ignore_top_level_state() {
        let sources = OptionSources {
            external: ToggleOverrides::default().with(Toggle::SupportingFiles, true),
            ..Default::default()
        };
        let opts = resolve_options(&sources);
        assert!(!opts.models);
        assert!(opts.model_tests && opts.model_docs);
    }

    #[test]
    fn test_stamp_sets_exclude_tests_and_oas2() {
        let sources = OptionSources {
            explicit: ToggleOverrides::default()
                .with(Toggle::ApiTests, false)
                .with(Toggle::ModelTests, false)
                .with(Toggle::UseOas2, true),
            ..Default::default()
        };
        let opts = resolve_options(&sources);
        let mut props = GeneratorProperties::default();
        opts.stamp(&sources, &mut props);
        assert_eq!(props.exclude_tests, Some(true));
        assert_eq!(props.use_oas2, Some(true));
        assert!(!props.generate_api_tests);
    }

    #[test]
    fn test_stamp_keeps_external_oas2_property() {
        let sources = OptionSources {
            explicit: ToggleOverrides::default().with(Toggle::UseOas2, true),
            ..Default::default()
        };
        let mut props = GeneratorProperties::default();
        props
            .extra
            .insert("useOas2".to_string(), serde_json::Value::Bool(false));
        resolve_options(&sources).stamp(&sources, &mut props);
        assert_eq!(props.use_oas2, None);
    }
}
