use handlebars::Handlebars;
use thiserror::Error;

/// Template failures are a distinct error kind: at rule save time they
/// block the save, at firing time they block with a message attributed to
/// the rule, unlike generic runtime errors which are absorbed.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template syntax error: {0}")]
    Syntax(String),
    #[error("Template render error: {0}")]
    Render(String),
}

pub struct TemplateService {
    registry: Handlebars<'static>,
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateService {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        // Output goes into push payloads, not HTML pages
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(false);
        Self { registry }
    }

    /// Parse-only check, run when a rule is saved.
    pub fn validate(&self, template: &str) -> Result<(), TemplateError> {
        handlebars::Template::compile(template)
            .map(|_| ())
            .map_err(|e| TemplateError::Syntax(e.to_string()))
    }

    /// Renders against `{doc, today}`.
    pub fn render(
        &self,
        template: &str,
        doc: &serde_json::Value,
    ) -> Result<String, TemplateError> {
        let context = serde_json::json!({
            "doc": doc,
            "today": chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
        });
        self.registry
            .render_template(template, &context)
            .map_err(|e| TemplateError::Render(e.to_string()))
    }
}
