//! Jinja templates for outgoing email bodies.
//!
//! Templates live in `templates/email/` and are loaded once, on first render.

use minijinja::{Environment, Value};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Template directory relative to the project root
const TEMPLATE_DIR: &str = "templates/email";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    let template_path = Path::new(TEMPLATE_DIR);
    if template_path.exists() {
        load_templates_recursive(&mut env, template_path, template_path);
    } else {
        tracing::warn!("Email template directory {} not found", TEMPLATE_DIR);
    }

    env
}

fn load_templates_recursive(env: &mut Environment<'static>, base_path: &Path, current_path: &Path) {
    let Ok(entries) = std::fs::read_dir(current_path) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path);
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == "jinja") {
            continue;
        }

        let (Ok(relative), Ok(content)) =
            (path.strip_prefix(base_path), std::fs::read_to_string(&path))
        else {
            continue;
        };

        let template_name = relative.to_string_lossy().replace('\\', "/");
        match env.add_template_owned(template_name.clone(), content) {
            Ok(()) => tracing::debug!("Loaded email template: {}", template_name),
            Err(e) => tracing::warn!("Failed to load template {}: {}", template_name, e),
        }
    }
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render `template_name` (relative to `templates/email/`) with `ctx`.
pub fn render_template(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_missing_template() {
        let result = render_template("definitely_not_here.jinja", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_task_assigned_template_renders() {
        let body = render_template(
            "task_assigned.jinja",
            context! {
                volunteer_name => "Asha",
                job_title => "Distribute water",
                issue_title => "Flooded underpass",
                start_date => "2026-10-20",
                link => "http://localhost/jobs",
            },
        )
        .unwrap();

        assert!(body.contains("Asha"));
        assert!(body.contains("Distribute water"));
        assert!(body.contains("2026-10-20"));
    }
}
