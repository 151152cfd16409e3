//! Where generated bytes go.
//!
//! The pipeline never touches the filesystem directly for output; it goes
//! through an [`OutputSink`]. [`FsSink`] writes to disk, [`DryRunSink`] keeps
//! everything in memory (used by the `bundle` command and by tests).

use anyhow::{anyhow, Context};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::context::RenderingContext;
use super::gate::{FileCategory, GateDecision, OutputGate};
use super::templates::{resolve_template, TemplateRenderer};

/// A file produced by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub category: FileCategory,
}

pub trait OutputSink {
    /// Whether `path` is already present in this sink
    fn exists(&self, path: &Path) -> bool;
    fn write(&mut self, path: &Path, contents: &[u8]) -> anyhow::Result<()>;
    fn copy(&mut self, from: &Path, to: &Path) -> anyhow::Result<()>;
}

/// Writes straight to the filesystem, creating parent directories
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&mut self, path: &Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn copy(&mut self, from: &Path, to: &Path) -> anyhow::Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::copy(from, to).with_context(|| {
            format!("Failed to copy {} to {}", from.display(), to.display())
        })?;
        Ok(())
    }
}

/// Records writes in memory; reads existence from disk and earlier writes
#[derive(Debug, Default, Clone)]
pub struct DryRunSink {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &BTreeMap<PathBuf, Vec<u8>> {
        &self.files
    }

    /// Contents of a recorded file as text
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl OutputSink for DryRunSink {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || path.exists()
    }

    fn write(&mut self, path: &Path, contents: &[u8]) -> anyhow::Result<()> {
        self.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn copy(&mut self, from: &Path, to: &Path) -> anyhow::Result<()> {
        let bytes = fs::read(from).with_context(|| format!("Failed to read {}", from.display()))?;
        self.files.insert(to.to_path_buf(), bytes);
        Ok(())
    }
}

/// Gated writes through a sink, recording every produced file
pub struct Emitter<'a> {
    gate: &'a OutputGate,
    sink: &'a mut dyn OutputSink,
    renderer: &'a dyn TemplateRenderer,
    template_dir: PathBuf,
    common_template_dir: Option<PathBuf>,
    files: Vec<GeneratedFile>,
}

impl<'a> Emitter<'a> {
    pub fn new(
        gate: &'a OutputGate,
        sink: &'a mut dyn OutputSink,
        renderer: &'a dyn TemplateRenderer,
        template_dir: PathBuf,
        common_template_dir: Option<PathBuf>,
    ) -> Self {
        Emitter {
            gate,
            sink,
            renderer,
            template_dir,
            common_template_dir,
            files: Vec::new(),
        }
    }

    pub fn renderer(&self) -> &dyn TemplateRenderer {
        self.renderer
    }

    /// Locate a template or plain file by name
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        resolve_template(name, &self.template_dir, self.common_template_dir.as_deref())
    }

    fn admit(
        &self,
        destination: &Path,
        category: FileCategory,
        should_overwrite: &dyn Fn(&Path) -> bool,
    ) -> bool {
        let exists = self.sink.exists(destination);
        match self
            .gate
            .decide(destination, category, exists, |p| should_overwrite(p))
        {
            GateDecision::Write => true,
            GateDecision::SkipIgnored => {
                info!(path = %destination.display(), "Skipped by ignore rules");
                false
            }
            GateDecision::SkipExisting => {
                info!(path = %destination.display(), "Skipped overwriting existing file");
                false
            }
        }
    }

    /// Render `template` with `context` into `destination`.
    ///
    /// Returns `Ok(false)` when the gate skipped the file.
    pub fn render_file(
        &mut self,
        template: &str,
        context: &RenderingContext,
        destination: &Path,
        category: FileCategory,
        should_overwrite: &dyn Fn(&Path) -> bool,
    ) -> anyhow::Result<bool> {
        if !self.admit(destination, category, should_overwrite) {
            return Ok(false);
        }
        let template_path = self
            .locate(template)
            .ok_or_else(|| anyhow!("template '{template}' not found"))?;
        let text = self.renderer.render(&template_path, context)?;
        self.write_file(destination, text.as_bytes(), category)?;
        Ok(true)
    }

    /// Copy `source` verbatim into `destination`, subject to the gate
    pub fn copy_file(
        &mut self,
        source: &Path,
        destination: &Path,
        category: FileCategory,
        should_overwrite: &dyn Fn(&Path) -> bool,
    ) -> anyhow::Result<bool> {
        if !self.admit(destination, category, should_overwrite) {
            return Ok(false);
        }
        self.sink.copy(source, destination)?;
        debug!(from = %source.display(), to = %destination.display(), "Copied file");
        self.files.push(GeneratedFile {
            path: destination.to_path_buf(),
            category,
        });
        Ok(true)
    }

    /// Write bytes without consulting the gate
    pub fn write_file(&mut self, destination: &Path, contents: &[u8], category: FileCategory) -> anyhow::Result<()> {
        self.sink.write(destination, contents)?;
        debug!(path = %destination.display(), "Wrote file");
        self.files.push(GeneratedFile {
            path: destination.to_path_buf(),
            category,
        });
        Ok(())
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.sink.exists(path)
    }

    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<GeneratedFile> {
        self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_sink_creates_parents() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/c.txt");
        let mut sink = FsSink;
        assert!(!sink.exists(&target));
        sink.write(&target, b"hello").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello");

        let copied = dir.path().join("d/e.txt");
        sink.copy(&target, &copied).unwrap();
        assert_eq!(fs::read_to_string(&copied).unwrap(), "hello");
    }

    #[test]
    fn test_emitter_respects_gate() {
        use crate::generator::gate::IgnoreProcessor;
        use crate::generator::templates::MiniJinjaRenderer;

        let templates = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(templates.path().join("api.jinja"), "{{ classname }}").unwrap();
        let existing = out.path().join("existing.txt");
        fs::write(&existing, "old").unwrap();

        let gate = OutputGate::new(IgnoreProcessor::allow_all(out.path()));
        let mut sink = DryRunSink::new();
        let renderer = MiniJinjaRenderer;
        let mut emitter = Emitter::new(&gate, &mut sink, &renderer, templates.path().to_path_buf(), None);

        let mut ctx = RenderingContext::new();
        ctx.insert("classname", "PetsApi");
        let fresh = out.path().join("pets_api.txt");
        assert!(emitter
            .render_file("api.jinja", &ctx, &fresh, FileCategory::Source, &|_| false)
            .unwrap());
        assert!(!emitter
            .render_file("api.jinja", &ctx, &existing, FileCategory::Source, &|_| false)
            .unwrap());
        assert!(emitter
            .render_file("missing.jinja", &ctx, &out.path().join("x"), FileCategory::Source, &|_| true)
            .is_err());
        assert_eq!(emitter.files().len(), 1);
        drop(emitter);
        assert_eq!(sink.contents(&fresh).as_deref(), Some("PetsApi"));
    }

    #[test]
    fn test_dry_run_sink_records_without_touching_disk() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        let mut sink = DryRunSink::new();
        sink.write(&target, b"x").unwrap();
        assert!(sink.exists(&target));
        assert!(!target.exists());
        assert_eq!(sink.contents(&target).as_deref(), Some("x"));
    }
}
