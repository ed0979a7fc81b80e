//! Template rendering for QC documents.
//!
//! Uses Handlebars with custom helpers:
//! - percent: Format an optional rate (`0.975 -> "97.5%"`, null -> `"n/a"`)
//! - badge: CSS class for a status badge
//! - markdown: Section body to an HTML fragment (use with `{{{ }}}`)
//!
//! HTML is rendered with escaping on; Markdown with escaping off.

use handlebars::{handlebars_helper, no_escape, Handlebars};
use qc_core::{format_rate, DocumentFormat, QcError};
use serde_json::Value;

use crate::markup;
use crate::templates::{template_name, TemplatesFile};

handlebars_helper!(percent: |rate: Json| format_rate(rate.as_f64()));

handlebars_helper!(badge: |status: str| format!("badge badge-{}", status.to_ascii_lowercase()));

handlebars_helper!(markdown: |body: str| markup::to_html(body));

/// Compiled renderer with registered helpers, one registry per escaping mode
pub struct TemplateRenderer {
    html: Handlebars<'static>,
    text: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Compile every format's template; syntax errors surface here
    pub fn new(templates: &TemplatesFile) -> Result<Self, QcError> {
        let mut html = Handlebars::new();
        register_helpers(&mut html);
        register(&mut html, templates, DocumentFormat::Html)?;

        let mut text = Handlebars::new();
        text.register_escape_fn(no_escape);
        register_helpers(&mut text);
        register(&mut text, templates, DocumentFormat::Markdown)?;

        Ok(Self { html, text })
    }

    /// Render the template for `format` with data
    pub fn render(&self, format: DocumentFormat, data: &Value) -> Result<String, QcError> {
        let registry = match format {
            DocumentFormat::Html => &self.html,
            DocumentFormat::Markdown => &self.text,
        };
        registry
            .render(template_name(format), data)
            .map_err(|e| QcError::Render(format!("{} template: {}", template_name(format), e)))
    }
}

fn register_helpers(handlebars: &mut Handlebars<'static>) {
    handlebars.register_helper("percent", Box::new(percent));
    handlebars.register_helper("badge", Box::new(badge));
    handlebars.register_helper("markdown", Box::new(markdown));
}

fn register(
    handlebars: &mut Handlebars<'static>,
    templates: &TemplatesFile,
    format: DocumentFormat,
) -> Result<(), QcError> {
    let source = templates.for_format(format)?;
    handlebars
        .register_template_string(template_name(format), source)
        .map_err(|e| QcError::Render(format!("{} template: {}", template_name(format), e)))
}
