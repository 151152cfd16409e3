use std::fmt;
use std::path::{Path, PathBuf};

/// Result alias used by the generation pipelines
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Fatal generation error
///
/// Every variant that wraps a backend or I/O failure carries enough context to
/// identify the entity being processed when the run aborted. Recoverable
/// conditions (missing info version, unusable ignore override, missing copy
/// source) are logged and never surface here.
#[derive(Debug)]
pub enum GenerateError {
    /// No API description was supplied to the generator
    MissingDescription,
    /// No backend configuration was supplied to the generator
    MissingConfiguration,
    /// Projecting a schema into an intermediate model failed
    Model {
        name: String,
        source: anyhow::Error,
    },
    /// Emitting the files of an already projected model failed
    ModelFile {
        name: String,
        source: anyhow::Error,
    },
    /// Projecting one operation failed
    Operation {
        tag: String,
        operation_id: Option<String>,
        method: String,
        path: String,
        source: anyhow::Error,
    },
    /// Emitting the files of one tag group failed
    ApiFile {
        tag: String,
        source: anyhow::Error,
    },
    /// Rendering, copying or writing a supporting file failed
    SupportingFile {
        descriptor: String,
        source: anyhow::Error,
    },
    /// Writing a metadata stamp (ignore file or VERSION) failed
    Io {
        path: PathBuf,
        source: anyhow::Error,
    },
    /// The template engine rejected a template
    Template {
        template: String,
        source: anyhow::Error,
    },
    /// A run-level backend hook failed
    Hook {
        hook: &'static str,
        source: anyhow::Error,
    },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::MissingDescription => write!(f, "missing API description input"),
            GenerateError::MissingConfiguration => write!(f, "missing backend configuration input"),
            GenerateError::Model { name, source } => write!(
                f,
                "Could not process model '{name}'. Please make sure that your schema is correct: {source}"
            ),
            GenerateError::ModelFile { name, source } => {
                write!(f, "Could not generate model '{name}': {source}")
            }
            GenerateError::Operation {
                tag,
                operation_id,
                method,
                path,
                source,
            } => write!(
                f,
                "Could not process operation (tag: {tag}, operation: {}, resource: {method} {path}): {source}",
                operation_id.as_deref().unwrap_or("<none>")
            ),
            GenerateError::ApiFile { tag, source } => {
                write!(f, "Could not generate api file for '{tag}': {source}")
            }
            GenerateError::SupportingFile { descriptor, source } => {
                write!(f, "Could not generate supporting file '{descriptor}': {source}")
            }
            GenerateError::Io { path, source } => {
                write!(f, "Could not write '{}': {source}", path.display())
            }
            GenerateError::Template { template, source } => {
                write!(f, "Could not render template '{template}': {source}")
            }
            GenerateError::Hook { hook, source } => write!(f, "Backend hook '{hook}' failed: {source}"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::MissingDescription | GenerateError::MissingConfiguration => None,
            GenerateError::Model { source, .. }
            | GenerateError::ModelFile { source, .. }
            | GenerateError::Operation { source, .. }
            | GenerateError::ApiFile { source, .. }
            | GenerateError::SupportingFile { source, .. }
            | GenerateError::Template { source, .. }
            | GenerateError::Io { source, .. }
            | GenerateError::Hook { source, .. } => Some(&**source),
        }
    }
}

impl GenerateError {
    pub(crate) fn supporting_file(descriptor: impl Into<String>, source: anyhow::Error) -> Self {
        GenerateError::SupportingFile {
            descriptor: descriptor.into(),
            source,
        }
    }

    pub(crate) fn hook(hook: &'static str) -> impl Fn(anyhow::Error) -> Self {
        move |source| GenerateError::Hook { hook, source }
    }

    pub(crate) fn io(path: &Path) -> impl Fn(anyhow::Error) -> Self + '_ {
        move |source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
