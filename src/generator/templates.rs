//! Template lookup and rendering: backend templates through minijinja, the
//! built-in ignore file through askama.

use anyhow::Context;
use askama::Template;
use minijinja::Environment;
use std::fs;
use std::path::{Path, PathBuf};

use super::context::RenderingContext;

/// Extension marking a file as a template rather than a verbatim copy
pub const TEMPLATE_EXTENSION: &str = "jinja";

/// Turns a rendering context into text.
///
/// Implementations own the template syntax; the pipeline only decides which
/// template to use and where the output goes.
pub trait TemplateRenderer {
    /// Files ending in `.<extension>` are rendered, anything else is copied
    fn extension(&self) -> &str {
        TEMPLATE_EXTENSION
    }

    fn render(&self, template: &Path, context: &RenderingContext) -> anyhow::Result<String>;

    fn is_template(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension())
    }
}

/// MiniJinja-backed renderer
#[derive(Debug, Default, Clone, Copy)]
pub struct MiniJinjaRenderer;

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &Path, context: &RenderingContext) -> anyhow::Result<String> {
        let source = fs::read_to_string(template)
            .with_context(|| format!("Failed to read template {}", template.display()))?;
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template("tpl", &source)
            .with_context(|| format!("Invalid template {}", template.display()))?;
        let tmpl = env.get_template("tpl")?;
        let rendered = tmpl
            .render(context)
            .with_context(|| format!("Failed to render {}", template.display()))?;
        Ok(rendered)
    }
}

/// Locate `name` in the backend template dir, then in the shared one
pub fn resolve_template(name: &str, template_dir: &Path, common_dir: Option<&Path>) -> Option<PathBuf> {
    let local = template_dir.join(name);
    if local.is_file() {
        return Some(local);
    }
    common_dir.map(|d| d.join(name)).filter(|p| p.is_file())
}

/// Default ignore-rule file written on the first run
#[derive(Template)]
#[template(path = "codegen-ignore.txt", escape = "none")]
pub struct IgnoreFileTemplate<'a> {
    pub generator_version: &'a str,
}
