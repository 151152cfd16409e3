use super::types::{ApiDescription, HTTP_METHODS};
use anyhow::Context;
use std::path::Path;

/// Lowercase operation keys and drop anything under a path item that is
/// neither a known field, a supported verb, nor an `x-` extension.
fn normalize_path_items(val: &mut serde_json::Value) {
    let Some(serde_json::Value::Object(paths_map)) = val.get_mut("paths") else {
        return;
    };
    for item in paths_map.values_mut() {
        if let serde_json::Value::Object(obj) = item {
            let keys: Vec<String> = obj.keys().cloned().collect();
            for k in keys {
                let lk = k.to_ascii_lowercase();
                let keep = match lk.as_str() {
                    "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                    m if HTTP_METHODS.contains(&m) => true,
                    _ => k.starts_with("x-"),
                };
                if !keep {
                    obj.remove(&k);
                } else if lk != k && HTTP_METHODS.contains(&lk.as_str()) {
                    if let Some(op) = obj.remove(&k) {
                        obj.insert(lk, op);
                    }
                }
            }
        }
    }
}

/// Replace `#/components/parameters/*` references in path items and
/// operations with the referenced parameter object.
fn inline_parameter_refs(val: &mut serde_json::Value) {
    let components = val
        .pointer("/components/parameters")
        .and_then(|p| p.as_object())
        .cloned()
        .unwrap_or_default();
    if components.is_empty() {
        return;
    }
    let resolve = |params: &mut serde_json::Value| {
        let Some(list) = params.as_array_mut() else {
            return;
        };
        for param in list.iter_mut() {
            let target = param
                .get("$ref")
                .and_then(|r| r.as_str())
                .and_then(|r| r.strip_prefix("#/components/parameters/"))
                .and_then(|name| components.get(name))
                .cloned();
            if let Some(target) = target {
                *param = target;
            }
        }
    };
    let Some(serde_json::Value::Object(paths_map)) = val.get_mut("paths") else {
        return;
    };
    for item in paths_map.values_mut() {
        let Some(obj) = item.as_object_mut() else {
            continue;
        };
        for (key, entry) in obj.iter_mut() {
            if key == "parameters" {
                resolve(entry);
            } else if HTTP_METHODS.contains(&key.as_str()) {
                if let Some(params) = entry.get_mut("parameters") {
                    resolve(params);
                }
            }
        }
    }
}

/// Parse a description from text; `yaml` selects YAML, otherwise JSON
pub fn parse_description(content: &str, yaml: bool) -> anyhow::Result<ApiDescription> {
    let mut value: serde_json::Value = if yaml {
        serde_yaml::from_str(content).context("Failed to parse YAML description")?
    } else {
        serde_json::from_str(content).context("Failed to parse JSON description")?
    };
    normalize_path_items(&mut value);
    inline_parameter_refs(&mut value);
    let description: ApiDescription =
        serde_json::from_value(value).context("Description does not match the expected shape")?;
    Ok(description)
}

/// Load a description from disk, choosing the format by file extension
pub fn load_description(file_path: &Path) -> anyhow::Result<ApiDescription> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read description: {}", file_path.display()))?;
    let yaml = matches!(
        file_path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    parse_description(&content, yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_path_items() {
        let mut v = json!({
            "paths": {
                "/x": { "GET": {}, "patch": {}, "unknown": {}, "x-keep": true }
            }
        });
        normalize_path_items(&mut v);
        let item = &v["paths"]["/x"];
        assert!(item.get("unknown").is_none());
        assert!(item.get("GET").is_none());
        assert!(item.get("get").is_some());
        assert!(item.get("x-keep").is_some());
    }

    #[test]
    fn test_inline_parameter_refs() {
        let mut v = json!({
            "components": { "parameters": { "Limit": { "name": "limit", "in": "query" } } },
            "paths": {
                "/x": {
                    "parameters": [{ "$ref": "#/components/parameters/Limit" }],
                    "get": { "parameters": [{ "$ref": "#/components/parameters/Limit" }] }
                }
            }
        });
        inline_parameter_refs(&mut v);
        assert_eq!(v["paths"]["/x"]["parameters"][0]["name"], "limit");
        assert_eq!(v["paths"]["/x"]["get"]["parameters"][0]["in"], "query");
    }

    #[test]
    fn test_parse_keeps_empty_security_distinct() {
        let yaml = r#"
openapi: 3.0.0
info: { title: Demo, version: "1.0" }
security:
  - api_key: []
paths:
  /open:
    get:
      security: []
  /inherited:
    get: {}
"#;
        let d = parse_description(yaml, true).unwrap();
        let paths = d.paths.as_ref().unwrap();
        let open = paths["/open"].get.as_ref().unwrap();
        let inherited = paths["/inherited"].get.as_ref().unwrap();
        assert_eq!(open.security, Some(vec![]));
        assert!(inherited.security.is_none());
        assert_eq!(d.security.as_ref().map(|s| s.len()), Some(1));
    }
}
