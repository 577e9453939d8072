//! Template rendering with an explicit list of lookup roots.
//!
//! Built-in templates are compiled into the binary. Extra directories are
//! searched after them, in the order they were added, so that user files
//! picked up during reclassification can be included by bare name.

use std::path::{Component, Path, PathBuf};

use minijinja::{Environment, ErrorKind};
use serde::Serialize;

use crate::backend::error::BackendError;

const BUILTIN: &[(&str, &str)] = &[
    (
        "vivado/vivado-project.tcl.j2",
        include_str!("../../templates/vivado/vivado-project.tcl.j2"),
    ),
    (
        "vivado/vivado-run.tcl.j2",
        include_str!("../../templates/vivado/vivado-run.tcl.j2"),
    ),
    (
        "vivado/vivado-program.tcl.j2",
        include_str!("../../templates/vivado/vivado-program.tcl.j2"),
    ),
    (
        "alintpro/alintpro.do.j2",
        include_str!("../../templates/alintpro/alintpro.do.j2"),
    ),
    (
        "vunit/run.py.j2",
        include_str!("../../templates/vunit/run.py.j2"),
    ),
];

/// Renders named templates against a serializable context.
///
/// The root list is never modified in place; [`TemplateRenderer::with_root`]
/// returns an extended copy, so one build cannot leak roots into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRenderer {
    roots: Vec<PathBuf>,
}

impl TemplateRenderer {
    /// Renderer that only knows the built-in templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup roots searched after the built-in templates.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Copy of this renderer with `root` appended.
    pub fn with_root(&self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut roots = self.roots.clone();
        if !roots.contains(&root) {
            tracing::debug!("template lookup root: {}", root.display());
            roots.push(root);
        }
        TemplateRenderer { roots }
    }

    /// Copy of this renderer with every root appended in order.
    pub fn with_roots<I, P>(&self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        roots
            .into_iter()
            .fold(self.clone(), |renderer, root| renderer.with_root(root))
    }

    /// Render `template` to a string.
    pub fn render_to_string<S: Serialize>(&self, template: &str, ctx: &S) -> Result<String, BackendError> {
        let env = self.environment();
        let to_error = |e: minijinja::Error| BackendError::Template {
            template: template.to_string(),
            message: describe(&e),
        };

        let tmpl = env.get_template(template).map_err(to_error)?;
        tmpl.render(ctx).map_err(to_error)
    }

    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        let roots = self.roots.clone();
        env.set_loader(move |name| {
            if let Some((_, source)) = BUILTIN.iter().find(|(n, _)| *n == name) {
                return Ok(Some(source.to_string()));
            }
            load_from_roots(&roots, name)
        });
        env
    }
}

fn load_from_roots(roots: &[PathBuf], name: &str) -> Result<Option<String>, minijinja::Error> {
    let relative = Path::new(name);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Ok(None);
    }

    for root in roots {
        let candidate = root.join(relative);
        if candidate.is_file() {
            return std::fs::read_to_string(&candidate).map(Some).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read {}", candidate.display()),
                )
                .with_source(e)
            });
        }
    }

    Ok(None)
}

fn describe(err: &minijinja::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
