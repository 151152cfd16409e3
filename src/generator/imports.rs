use serde::Serialize;
use std::collections::BTreeSet;

use super::backend::{Naming, TypeMapping};

/// One `imports` list entry as seen by templates
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ImportEntry {
    pub import: String,
}

/// Import entries for an operation group.
///
/// Each raw reference goes through the backend's import mapping and falls back
/// to the backend's model import path. The result is sorted and deduplicated.
pub fn resolve_operation_imports<'a, B, I>(backend: &B, raw: I) -> Vec<ImportEntry>
where
    B: Naming + TypeMapping + ?Sized,
    I: IntoIterator<Item = &'a String>,
{
    let mapping = backend.import_mapping();
    let entries: BTreeSet<String> = raw
        .into_iter()
        .map(|r| {
            mapping
                .get(r)
                .cloned()
                .unwrap_or_else(|| backend.model_import(r))
        })
        .filter(|import| !import.is_empty())
        .collect();
    entries
        .into_iter()
        .map(|import| ImportEntry { import })
        .collect()
}

/// Import entries for a model.
///
/// Like [`resolve_operation_imports`], plus instantiation types. Anything the
/// target language includes by default is dropped.
pub fn resolve_model_imports<'a, B, I>(backend: &B, raw: I) -> Vec<ImportEntry>
where
    B: Naming + TypeMapping + ?Sized,
    I: IntoIterator<Item = &'a String>,
{
    let mapping = backend.import_mapping();
    let instantiation = backend.instantiation_types();
    let default_includes = backend.default_includes();
    let mut entries = BTreeSet::new();
    for r in raw {
        let mapped = mapping
            .get(r)
            .cloned()
            .unwrap_or_else(|| backend.model_import(r));
        if !mapped.is_empty() && !default_includes.contains(&mapped) {
            entries.insert(mapped);
        }
        if let Some(instantiated) = instantiation.get(r) {
            if !default_includes.contains(instantiated) {
                entries.insert(instantiated.clone());
            }
        }
    }
    entries
        .into_iter()
        .map(|import| ImportEntry { import })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Mapped;

    impl Naming for Mapped {
        fn model_import(&self, name: &str) -> String {
            format!("crate::models::{name}")
        }
    }

    impl TypeMapping for Mapped {
        fn import_mapping(&self) -> BTreeMap<String, String> {
            BTreeMap::from([("Uuid".to_string(), "uuid::Uuid".to_string())])
        }
        fn instantiation_types(&self) -> BTreeMap<String, String> {
            BTreeMap::from([("array".to_string(), "std::vec::Vec".to_string())])
        }
        fn default_includes(&self) -> BTreeSet<String> {
            BTreeSet::from(["crate::models::array".to_string(), "std::vec::Vec".to_string()])
        }
    }

    fn imports(entries: &[ImportEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.import.as_str()).collect()
    }

    #[test]
    fn test_operation_imports_sorted_and_deduped() {
        let raw = vec!["Pet".to_string(), "Uuid".to_string(), "Pet".to_string()];
        let resolved = resolve_operation_imports(&Mapped, &raw);
        assert_eq!(imports(&resolved), vec!["crate::models::Pet", "uuid::Uuid"]);
    }

    #[test]
    fn test_model_imports_respect_default_includes() {
        let raw = vec!["array".to_string(), "Tag".to_string()];
        let resolved = resolve_model_imports(&Mapped, &raw);
        assert_eq!(imports(&resolved), vec!["crate::models::Tag"]);
    }
}
