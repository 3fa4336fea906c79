//! Embedded minijinja templates for job scripts and scheduler files.

use include_dir::{Dir, DirEntry, include_dir};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::domain::AppError;

static TEMPLATES_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/src/assets/templates");

/// Renders the templates under `src/assets/templates`.
///
/// Names are paths relative to that directory, e.g. `pbs_job.sh.j2` or
/// `commands/shapelets.sh.j2`. Undefined variables are errors.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        let mut files = Vec::new();
        collect_templates(&TEMPLATES_DIR, &mut files);
        for (name, source) in files {
            env.add_template(name, source).map_err(|e| AppError::TemplateError {
                template: name.to_string(),
                details: e.to_string(),
            })?;
        }

        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, AppError> {
        let template_error = |e: minijinja::Error| AppError::TemplateError {
            template: name.to_string(),
            details: e.to_string(),
        };

        let template = self.env.get_template(name).map_err(template_error)?;
        template.render(ctx).map_err(template_error)
    }

    /// Render a module's command body from `commands/`.
    pub fn render_command<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, AppError> {
        self.render(&format!("commands/{}", name), ctx)
    }

    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.env.templates().map(|(name, _)| name).collect();
        names.sort_unstable();
        names
    }
}

fn collect_templates(dir: &'static Dir<'static>, files: &mut Vec<(&'static str, &'static str)>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => collect_templates(sub, files),
            DirEntry::File(file) => {
                let name = file.path().to_str();
                let source = file.contents_utf8();
                if let (Some(name), Some(source)) = (name, source)
                    && name.ends_with(".j2")
                {
                    files.push((name, source));
                }
            }
        }
    }
}
