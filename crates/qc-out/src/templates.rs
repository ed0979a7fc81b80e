//! Document template loading.
//!
//! Templates live in a YAML file with one named entry per output format
//! (`html`, `markdown`). The bundled file is compiled in; a custom file can
//! replace it as long as it provides both entries.

use qc_core::{DocumentFormat, QcError};
use serde::Deserialize;
use std::collections::HashMap;

const BUNDLED: &str = include_str!("../templates/document-templates.yaml");

/// Top-level templates file structure
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub description: String,
    pub template: String,
}

/// Template name for an output format
pub fn template_name(format: DocumentFormat) -> &'static str {
    match format {
        DocumentFormat::Html => "html",
        DocumentFormat::Markdown => "markdown",
    }
}

impl TemplatesFile {
    /// The templates shipped with the crate
    pub fn bundled() -> Result<Self, QcError> {
        Self::from_yaml(BUNDLED)
    }

    /// Load templates from a YAML file
    pub fn load(path: &str) -> Result<Self, QcError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QcError::Render(format!("failed to read templates file {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// Parse templates from YAML content. Every output format must be covered.
    pub fn from_yaml(yaml: &str) -> Result<Self, QcError> {
        let file: TemplatesFile = serde_yaml::from_str(yaml)
            .map_err(|e| QcError::Render(format!("failed to parse templates YAML: {}", e)))?;

        for format in [DocumentFormat::Html, DocumentFormat::Markdown] {
            if file.get(template_name(format)).is_none() {
                return Err(QcError::Render(format!(
                    "templates file has no '{}' template",
                    template_name(format)
                )));
            }
        }
        Ok(file)
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Template source for an output format
    pub fn for_format(&self, format: DocumentFormat) -> Result<&str, QcError> {
        self.get(template_name(format))
            .map(|t| t.template.as_str())
            .ok_or_else(|| QcError::Render(format!("no template for {:?}", format)))
    }
}
