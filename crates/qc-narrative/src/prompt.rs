//! Prompt template rendering.
//!
//! Handlebars with HTML escaping turned off (the output is a prompt, not
//! markup). The built-in `eq` helper drives per-slot wording.

use handlebars::Handlebars;
use qc_core::{format_rate, QualityCounters, Status, TimeWindow};
use serde::Serialize;
use thiserror::Error;

const DEFAULT_TEMPLATE: &str = include_str!("../templates/report-prompt.hbs");
const TEMPLATE_NAME: &str = "report_prompt";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Render failed: {0}")]
    Render(String),
}

/// Everything the template can reference
#[derive(Debug, Clone, Serialize)]
pub struct PromptData {
    pub window: String,
    pub total: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub accept_pct: String,
    pub loss_pct: String,
    pub status: String,
    pub legend: String,
    pub assessment: String,
    pub word_budget: u32,
    pub min_actions: usize,
    pub action_slots: Vec<usize>,
}

impl PromptData {
    pub fn new(
        counters: &QualityCounters,
        status: Status,
        window: &TimeWindow,
        legend: String,
        assessment: String,
        word_budget: u32,
        min_actions: usize,
    ) -> Self {
        Self {
            window: window.label.clone(),
            total: counters.total(),
            accepted: counters.accepted(),
            rejected: counters.rejected(),
            accept_pct: format_rate(counters.accept_rate()),
            loss_pct: format_rate(counters.loss_rate()),
            status: status.to_string(),
            legend,
            assessment,
            word_budget,
            min_actions,
            action_slots: (1..=min_actions).collect(),
        }
    }
}

pub struct PromptTemplate {
    handlebars: Handlebars<'static>,
}

impl PromptTemplate {
    /// Compile a template; syntax errors surface here, not per build
    pub fn new(source: &str) -> Result<Self, PromptError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| PromptError::Template(e.to_string()))?;
        Ok(Self { handlebars })
    }

    /// The report brief shipped with the crate
    pub fn bundled() -> Result<Self, PromptError> {
        Self::new(DEFAULT_TEMPLATE)
    }

    pub fn render(&self, data: &PromptData) -> Result<String, PromptError> {
        self.handlebars
            .render(TEMPLATE_NAME, data)
            .map_err(|e| PromptError::Render(e.to_string()))
    }
}
