//! Project-level values derived from the description before any entity is
//! processed: the info block and the first server URL.

use tracing::warn;
use url::Url;

use serde_json::{Map, Value};

use super::auth::AuthMethod;
use super::backend::Naming;
use super::properties::AppInfo;
use crate::spec::{ApiDescription, Info, Server};

const DEFAULT_VERSION: &str = "1.0.0";
const DEFAULT_DESCRIPTION: &str = "No description provided (generated by brrtrouter-codegen)";
const LOCAL_BASE: &str = "http://localhost";

/// Server-derived values shared by the bundle and every operation group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub scheme: String,
    /// Server URL without a trailing slash
    pub base_path: String,
    /// Path component of the server URL, empty for `/`
    pub context_path: String,
    pub base_path_without_host: String,
    /// Host of the server URL, when the URL has one
    pub host: Option<String>,
}

/// Run-wide values copied into operation groups and the bundle
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub server: ServerInfo,
    /// Flattened property entries
    pub properties: Map<String, Value>,
    /// Description-level `x-` extensions
    pub vendor_extensions: Map<String, Value>,
    /// Every declared security scheme, already passed through the backend
    pub auth_methods: Vec<AuthMethod>,
    pub api_package: String,
    pub model_package: String,
}

/// Substitute `{name}` placeholders with their declared defaults
fn expand_variables(server: &Server) -> String {
    let mut url = server.url.clone();
    for (name, variable) in &server.variables {
        url = url.replace(&format!("{{{name}}}"), &variable.default);
    }
    url
}

/// First server URL, plus whether the description spelled out its scheme
fn server_url(description: &ApiDescription) -> Option<(Url, bool)> {
    let server = description.servers.first()?;
    let expanded = expand_variables(server);
    let explicit_scheme = expanded.contains("://");
    let absolute = if explicit_scheme {
        expanded
    } else {
        format!("{LOCAL_BASE}/{}", expanded.trim_start_matches('/'))
    };
    match Url::parse(&absolute) {
        Ok(url) => Some((url, explicit_scheme)),
        Err(e) => {
            warn!(url = %absolute, error = %e, "Unparseable server URL, using {LOCAL_BASE}");
            None
        }
    }
}

/// Derive scheme, base path, context path and host from the first server.
///
/// With no usable server the base path is `http://localhost`, the context
/// path is empty and the scheme is `https`. Relative server URLs are resolved
/// against `http://localhost` but still report `https` as their scheme.
pub fn derive_server_info<N: Naming + ?Sized>(description: &ApiDescription, naming: &N) -> ServerInfo {
    let resolved = server_url(description);
    let url = resolved.as_ref().map(|(url, _)| url);
    let context_path = url
        .map(|u| u.path().trim_end_matches('/').to_string())
        .unwrap_or_default();
    let base_path = url
        .map(|u| u.as_str().trim_end_matches('/').to_string())
        .unwrap_or_else(|| LOCAL_BASE.to_string());
    let scheme = resolved
        .as_ref()
        .filter(|(_, explicit)| *explicit)
        .map(|(u, _)| u.scheme().to_string())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "https".to_string());
    let context_path = naming.escape_text(&context_path);
    ServerInfo {
        scheme: naming.escape_text(&scheme),
        base_path: naming.escape_text(&base_path),
        base_path_without_host: naming.escape_text(&context_path),
        context_path,
        host: url.and_then(|u| u.host_str().map(str::to_string)),
    }
}

/// Project the info block into template entries.
///
/// Returns `None` when the description has no info block. A missing version
/// is substituted with `1.0.0`.
pub fn project_info<N: Naming + ?Sized>(info: Option<&Info>, naming: &N) -> Option<AppInfo> {
    let info = info?;
    let version = match info.version.as_deref() {
        Some(v) => naming.escape_text(v),
        None => {
            warn!("Missing required field info version. Default version set to {DEFAULT_VERSION}");
            DEFAULT_VERSION.to_string()
        }
    };
    let (app_description, unescaped_app_description) = match info.description.as_deref() {
        Some(d) if !d.is_empty() => (naming.escape_text(d), d.to_string()),
        _ => (DEFAULT_DESCRIPTION.to_string(), DEFAULT_DESCRIPTION.to_string()),
    };
    let contact = info.contact.as_ref();
    let license = info.license.as_ref();
    let escape = |s: &String| naming.escape_text(s);

    Some(AppInfo {
        app_name: info.title.as_ref().map(escape),
        app_version: version.clone(),
        app_description,
        unescaped_app_description,
        info_email: contact.and_then(|c| c.email.as_ref()).map(escape),
        info_name: contact.and_then(|c| c.name.as_ref()).map(escape),
        info_url: contact.and_then(|c| c.url.as_ref()).map(escape),
        license_info: license.and_then(|l| l.name.as_ref()).map(escape),
        license_url: license.and_then(|l| l.url.as_ref()).map(escape),
        version,
        terms_of_service: info.terms_of_service.as_ref().map(escape),
    })
}
