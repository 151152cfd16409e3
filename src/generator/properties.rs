use serde::Serialize;
use serde_json::{Map, Value};

/// Info-block entries projected for templates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    pub app_version: String,
    pub app_description: String,
    pub unescaped_app_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
}

/// Properties shared by every rendering context of a run.
///
/// Well-known entries are typed fields; anything supplied by the caller or
/// declared by the backend lives in `extra`. Typed fields win over `extra`
/// entries of the same name when the map is flattened for templates.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorProperties {
    pub generator_version: String,
    pub generated_date: String,
    pub generated_year: String,
    pub generator_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_spec: Option<String>,
    pub generate_api_tests: bool,
    pub generate_model_tests: bool,
    pub generate_api_docs: bool,
    pub generate_model_docs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_oas2: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_tests: Option<bool>,
    #[serde(flatten)]
    pub app: Option<AppInfo>,
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

impl GeneratorProperties {
    /// Stamp version and timestamp values for a fresh run
    pub fn for_run(generator_class: impl Into<String>, input_spec: Option<String>) -> Self {
        let now = chrono::Utc::now();
        GeneratorProperties {
            generator_version: crate::GENERATOR_VERSION.to_string(),
            generated_date: now.to_rfc3339(),
            generated_year: now.format("%Y").to_string(),
            generator_class: generator_class.into(),
            input_spec,
            ..Default::default()
        }
    }

    /// Add an entry; never removes anything
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Look up a flattened entry by its template key
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    /// Flatten into the key/value form copied into every context
    pub fn entries(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        if let Ok(Value::Object(typed)) = serde_json::to_value(self) {
            map.extend(typed);
        }
        map
    }
}
