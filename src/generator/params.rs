use std::collections::BTreeSet;
use std::fmt;

use crate::spec::{Parameter, ParameterLocation};

/// Dedup key of a parameter: name plus location
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId {
    pub name: String,
    pub location: ParameterLocation,
}

impl ParameterId {
    pub fn of(param: &Parameter) -> Self {
        ParameterId {
            name: param.name.clone(),
            location: param.location,
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.location)
    }
}

/// Operation parameters followed by inherited path-level parameters.
///
/// A path-level parameter is only added when no operation-level parameter
/// has the same [`ParameterId`]; the operation-level declaration wins.
pub fn merge_path_parameters(
    operation_params: Option<&[Parameter]>,
    path_params: &[Parameter],
) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = operation_params.map(<[_]>::to_vec).unwrap_or_default();
    let mut seen: BTreeSet<ParameterId> = merged.iter().map(ParameterId::of).collect();
    for param in path_params {
        if seen.insert(ParameterId::of(param)) {
            merged.push(param.clone());
        }
    }
    merged
}
