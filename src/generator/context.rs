//! Rendering contexts handed to the template backend.
//!
//! A [`RenderingContext`] is an ordered string-keyed map of JSON values. The
//! key names are a contract with templates; the [`keys`] module lists every
//! key this crate writes and the `*_KEYS` arrays document which keys each
//! context kind is guaranteed to carry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key names shared with templates
pub mod keys {
    pub const API_PACKAGE: &str = "apiPackage";
    pub const MODEL_PACKAGE: &str = "modelPackage";
    pub const API_FOLDER: &str = "apiFolder";
    pub const BASE_PATH: &str = "basePath";
    pub const BASE_PATH_WITHOUT_HOST: &str = "basePathWithoutHost";
    pub const CONTEXT_PATH: &str = "contextPath";
    pub const SCHEME: &str = "scheme";
    pub const HOST: &str = "host";
    pub const API_INFO: &str = "apiInfo";
    pub const APIS: &str = "apis";
    pub const MODELS: &str = "models";
    pub const HAS_MODEL: &str = "hasModel";
    pub const AUTH_METHODS: &str = "authMethods";
    pub const HAS_AUTH_METHODS: &str = "hasAuthMethods";
    pub const EXTERNAL_DOCS: &str = "externalDocs";
    pub const OPEN_API: &str = "openAPI";

    pub const MODEL: &str = "model";
    pub const SCHEMA: &str = "schema";
    pub const IMPORT_PATH: &str = "importPath";
    pub const IMPORTS: &str = "imports";
    pub const IMPORT: &str = "import";
    pub const HAS_IMPORT: &str = "hasImport";
    pub const PACKAGE: &str = "package";
    pub const CLASSNAME: &str = "classname";
    pub const CLASS_VAR_NAME: &str = "classVarName";
    pub const CLASS_FILENAME: &str = "classFilename";
    pub const BASE_NAME: &str = "baseName";
    pub const PATH_PREFIX: &str = "pathPrefix";
    pub const OPERATIONS: &str = "operations";
    pub const OPERATION: &str = "operation";
    pub const VENDOR_EXTENSIONS: &str = "vendorExtensions";
    pub const SORT_PARAMS_BY_REQUIRED_FLAG: &str = "sortParamsByRequiredFlag";
    pub const HAS_MORE: &str = "hasMore";

    pub const IS_COMPOSED_MODEL_EXT: &str = "x-is-composed-model";
    pub const IS_ALIAS_EXT: &str = "x-is-alias";
    pub const HAS_MORE_MODELS_EXT: &str = "x-has-more-models";
    pub const HAS_MORE_EXT: &str = "x-has-more";
    pub const HAS_AUTH_METHODS_EXT: &str = "x-has-auth-methods";
}

/// Keys every aggregate bundle carries (backend properties come on top)
pub const BUNDLE_KEYS: &[&str] = &[
    keys::API_PACKAGE,
    keys::MODEL_PACKAGE,
    keys::API_FOLDER,
    keys::BASE_PATH,
    keys::BASE_PATH_WITHOUT_HOST,
    keys::CONTEXT_PATH,
    keys::SCHEME,
    "apiInfo.apis",
    keys::MODELS,
    keys::HAS_MODEL,
];

/// Keys of each entry in a per-model context's `models` list
pub const MODEL_ENTRY_KEYS: &[&str] = &[keys::MODEL, keys::SCHEMA, keys::IMPORT_PATH];

/// Keys every per-tag operation context carries
pub const OPERATION_GROUP_KEYS: &[&str] = &[
    keys::CLASSNAME,
    "operations.classname",
    "operations.pathPrefix",
    "operations.operation",
    keys::IMPORTS,
    keys::HAS_IMPORT,
    keys::BASE_PATH,
    keys::BASE_PATH_WITHOUT_HOST,
    keys::CONTEXT_PATH,
    keys::MODEL_PACKAGE,
    keys::HAS_MODEL,
];

/// Ordered key/value context passed opaquely to the template renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderingContext(Map<String, Value>);

impl RenderingContext {
    pub fn new() -> Self {
        RenderingContext(Map::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert any serializable value, failing if it does not serialize to JSON
    pub fn insert_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> anyhow::Result<()> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Copy every entry of `entries` into the context, replacing existing keys
    pub fn extend(&mut self, entries: &Map<String, Value>) {
        for (k, v) in entries {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Resolve a dotted path such as `apiInfo.apis`
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Contract keys from `required` that this context lacks
    pub fn missing_keys<'k>(&self, required: &[&'k str]) -> Vec<&'k str> {
        required
            .iter()
            .copied()
            .filter(|k| self.lookup(k).is_none())
            .collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RenderingContext {
    fn from(map: Map<String, Value>) -> Self {
        RenderingContext(map)
    }
}

/// Set `vendorExtensions.<key>` on a serialized model or operation
pub fn set_vendor_extension(target: &mut Value, key: &str, value: impl Into<Value>) {
    let Some(obj) = target.as_object_mut() else {
        return;
    };
    let ext = obj
        .entry(keys::VENDOR_EXTENSIONS)
        .or_insert_with(|| Value::Object(Map::new()));
    if !ext.is_object() {
        *ext = Value::Object(Map::new());
    }
    if let Some(ext) = ext.as_object_mut() {
        ext.insert(key.to_string(), value.into());
    }
}

/// Read `vendorExtensions.<key>` as a flag; strings "true"/"false" are accepted
pub fn vendor_flag(target: &Value, key: &str) -> bool {
    match target.get(keys::VENDOR_EXTENSIONS).and_then(|e| e.get(key)) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_dotted_path() {
        let mut ctx = RenderingContext::new();
        ctx.insert("apiInfo", json!({ "apis": [] }));
        assert!(ctx.lookup("apiInfo.apis").is_some());
        assert!(ctx.lookup("apiInfo.missing").is_none());
        assert_eq!(ctx.missing_keys(&["apiInfo.apis", "models"]), vec!["models"]);
    }

    #[test]
    fn test_vendor_extension_roundtrip() {
        let mut model = json!({ "name": "Pet" });
        assert!(!vendor_flag(&model, keys::IS_ALIAS_EXT));
        set_vendor_extension(&mut model, keys::IS_ALIAS_EXT, true);
        assert!(vendor_flag(&model, keys::IS_ALIAS_EXT));
        let stringly = json!({ "vendorExtensions": { "x-is-alias": "TRUE" } });
        assert!(vendor_flag(&stringly, keys::IS_ALIAS_EXT));
    }
}
