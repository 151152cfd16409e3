//! Per-file write decisions: ignore rules first, then the overwrite policy.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the ignore-rule file at the output root
pub const IGNORE_FILE_NAME: &str = ".brrtrouter-codegen-ignore";

/// What kind of file is about to be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Source,
    Documentation,
    /// Never replaced once present
    Test,
    Supporting,
    /// Ignore file and version stamp; not subject to the gate
    Metadata,
}

/// Outcome of [`OutputGate::decide`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Write,
    SkipIgnored,
    SkipExisting,
}

impl GateDecision {
    pub fn should_write(self) -> bool {
        self == GateDecision::Write
    }
}

/// Gitignore-style path predicate rooted at the output directory
#[derive(Debug, Clone)]
pub struct IgnoreProcessor {
    root: PathBuf,
    matcher: Option<Gitignore>,
    source: Option<PathBuf>,
}

impl IgnoreProcessor {
    /// Load rules from `override_path` when it is a readable rule file,
    /// otherwise from `<output_dir>/.brrtrouter-codegen-ignore`.
    ///
    /// A missing default file means nothing is ignored.
    pub fn load(output_dir: &Path, override_path: Option<&Path>) -> Self {
        if let Some(path) = override_path {
            match Self::build(output_dir, path) {
                Ok(matcher) => {
                    debug!(path = %path.display(), "Using ignore file override");
                    return IgnoreProcessor {
                        root: output_dir.to_path_buf(),
                        matcher: Some(matcher),
                        source: Some(path.to_path_buf()),
                    };
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Ignore file override is not usable, falling back to the default location"
                    );
                }
            }
        }

        let default_path = output_dir.join(IGNORE_FILE_NAME);
        if default_path.is_file() {
            match Self::build(output_dir, &default_path) {
                Ok(matcher) => {
                    return IgnoreProcessor {
                        root: output_dir.to_path_buf(),
                        matcher: Some(matcher),
                        source: Some(default_path),
                    };
                }
                Err(e) => warn!(path = %default_path.display(), error = %e, "Ignoring malformed ignore file"),
            }
        }
        Self::allow_all(output_dir)
    }

    /// A processor without rules
    pub fn allow_all(output_dir: &Path) -> Self {
        IgnoreProcessor {
            root: output_dir.to_path_buf(),
            matcher: None,
            source: None,
        }
    }

    fn build(root: &Path, path: &Path) -> anyhow::Result<Gitignore> {
        if !path.is_file() {
            anyhow::bail!("not a file");
        }
        let mut builder = GitignoreBuilder::new(root);
        if let Some(err) = builder.add(path) {
            return Err(err.into());
        }
        Ok(builder.build()?)
    }

    /// Rule file in effect, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Whether writing `path` is allowed by the rules
    pub fn allows(&self, path: &Path) -> bool {
        let Some(matcher) = &self.matcher else {
            return true;
        };
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if relative.as_os_str().is_empty() || relative.has_root() {
            return true;
        }
        !matcher
            .matched_path_or_any_parents(relative, false)
            .is_ignore()
    }
}

/// Combines the ignore processor with the overwrite policy
#[derive(Debug, Clone)]
pub struct OutputGate {
    ignore: IgnoreProcessor,
}

impl OutputGate {
    pub fn new(ignore: IgnoreProcessor) -> Self {
        OutputGate { ignore }
    }

    pub fn ignore(&self) -> &IgnoreProcessor {
        &self.ignore
    }

    /// Decide whether `path` may be written.
    ///
    /// `exists` reports whether the destination is already present;
    /// `should_overwrite` is only consulted for an existing non-test file.
    pub fn decide<F>(&self, path: &Path, category: FileCategory, exists: bool, should_overwrite: F) -> GateDecision
    where
        F: FnOnce(&Path) -> bool,
    {
        if category == FileCategory::Metadata {
            return GateDecision::Write;
        }
        if !self.ignore.allows(path) {
            return GateDecision::SkipIgnored;
        }
        if !exists {
            return GateDecision::Write;
        }
        match category {
            FileCategory::Test => GateDecision::SkipExisting,
            _ if should_overwrite(path) => GateDecision::Write,
            _ => GateDecision::SkipExisting,
        }
    }
}
