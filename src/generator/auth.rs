use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::spec::{SecurityRequirement, SecurityScheme};

/// A security scheme that applies to an operation or to the whole API
#[derive(Debug, Clone, Serialize)]
pub struct AuthMethod {
    pub name: String,
    pub scheme: SecurityScheme,
}

/// Schemes named by `requirements`, in encounter order, each at most once.
///
/// Names that do not resolve against `schemes` are ignored.
pub fn auth_methods_for(
    requirements: &[SecurityRequirement],
    schemes: &BTreeMap<String, SecurityScheme>,
) -> Vec<AuthMethod> {
    let mut seen = BTreeSet::new();
    let mut methods = Vec::new();
    for requirement in requirements {
        for name in requirement.keys() {
            let Some(scheme) = schemes.get(name) else {
                continue;
            };
            if seen.insert(name.clone()) {
                methods.push(AuthMethod {
                    name: name.clone(),
                    scheme: scheme.clone(),
                });
            }
        }
    }
    methods
}

/// Effective auth for one operation.
///
/// `Some(&[])` means the operation explicitly opts out of auth. Otherwise the
/// operation's own requirements are used and, if they resolve to nothing,
/// the global requirements.
pub fn resolve_operation_auth(
    operation_security: Option<&[SecurityRequirement]>,
    global_security: Option<&[SecurityRequirement]>,
    schemes: &BTreeMap<String, SecurityScheme>,
) -> Vec<AuthMethod> {
    if operation_security.is_some_and(|s| s.is_empty()) {
        return Vec::new();
    }
    let own = operation_security
        .map(|reqs| auth_methods_for(reqs, schemes))
        .unwrap_or_default();
    if !own.is_empty() {
        return own;
    }
    global_security
        .map(|reqs| auth_methods_for(reqs, schemes))
        .unwrap_or_default()
}

/// Every declared scheme, for the project-wide bundle
pub fn all_auth_methods(schemes: &BTreeMap<String, SecurityScheme>) -> Vec<AuthMethod> {
    schemes
        .iter()
        .map(|(name, scheme)| AuthMethod {
            name: name.clone(),
            scheme: scheme.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemes() -> BTreeMap<String, SecurityScheme> {
        let mut map = BTreeMap::new();
        map.insert(
            "bearer".to_string(),
            SecurityScheme::Http {
                scheme: "bearer".to_string(),
                bearer_format: Some("JWT".to_string()),
                description: None,
            },
        );
        map.insert(
            "api_key".to_string(),
            SecurityScheme::ApiKey {
                name: "X-API-Key".to_string(),
                location: "header".to_string(),
                description: None,
            },
        );
        map
    }

    fn req(names: &[&str]) -> SecurityRequirement {
        names.iter().map(|n| (n.to_string(), Vec::new())).collect()
    }

    fn names(methods: &[AuthMethod]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_empty_security_disables_auth() {
        let global = vec![req(&["bearer"])];
        let resolved = resolve_operation_auth(Some(&[][..]), Some(global.as_slice()), &schemes());
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_absent_security_inherits_global() {
        let global = vec![req(&["bearer"])];
        let resolved = resolve_operation_auth(None, Some(global.as_slice()), &schemes());
        assert_eq!(names(&resolved), vec!["bearer"]);
    }

    #[test]
    fn test_operation_security_wins_over_global() {
        let global = vec![req(&["bearer"])];
        let own = vec![req(&["api_key"])];
        let resolved = resolve_operation_auth(Some(own.as_slice()), Some(global.as_slice()), &schemes());
        assert_eq!(names(&resolved), vec!["api_key"]);
    }

    #[test]
    fn test_unresolvable_operation_security_falls_back() {
        let global = vec![req(&["bearer"])];
        let own = vec![req(&["unknown"])];
        let resolved = resolve_operation_auth(Some(own.as_slice()), Some(global.as_slice()), &schemes());
        assert_eq!(names(&resolved), vec!["bearer"]);
    }

    #[test]
    fn test_duplicates_collapse_in_encounter_order() {
        let reqs = vec![req(&["bearer"]), req(&["api_key", "bearer"])];
        let resolved = auth_methods_for(&reqs, &schemes());
        assert_eq!(names(&resolved), vec!["bearer", "api_key"]);
    }

    #[test]
    fn test_all_auth_methods() {
        assert_eq!(names(&all_auth_methods(&schemes())), vec!["api_key", "bearer"]);
    }
}
