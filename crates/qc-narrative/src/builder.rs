//! Report Prompt Builder
//!
//! Counters + status + window in, a fully populated [`Report`] out. The
//! generation call is the only I/O; zero-data windows never reach it.

use std::sync::Arc;
use std::time::Duration;

use qc_core::{
    format_rate, BuildContext, NarrativeSection, QcError, QualityCounters, Report, SectionKind, Status,
    TimeWindow,
};
use qc_quality::StatusClassifier;
use tracing::{debug, info};

use crate::generation::{GenerationRequest, GenerationService, SamplingConfig};
use crate::parser::{parse_sections, split_status_lead};
use crate::prompt::{PromptData, PromptTemplate};

pub const DEFAULT_WORD_BUDGET: u32 = 200;
pub const DEFAULT_MIN_ACTIONS: usize = 3;
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

const NO_DATA_ACTIONS: [&str; 3] = [
    "Confirm the sorting line was running during this window",
    "Check that the classifier is writing results to the telemetry store",
    "Re-run the report for a window that includes production hours",
];

pub struct ReportPromptBuilder {
    generator: Arc<dyn GenerationService>,
    template: PromptTemplate,
    classifier: StatusClassifier,
    sampling: SamplingConfig,
    timeout: Duration,
    word_budget: u32,
    min_actions: usize,
}

impl ReportPromptBuilder {
    /// Builder with the bundled prompt and default sampling
    pub fn new(
        generator: Arc<dyn GenerationService>,
        classifier: StatusClassifier,
    ) -> Result<Self, QcError> {
        let template =
            PromptTemplate::bundled().map_err(|e| QcError::Render(format!("prompt: {}", e)))?;
        Ok(Self {
            generator,
            template,
            classifier,
            sampling: SamplingConfig::default(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
            word_budget: DEFAULT_WORD_BUDGET,
            min_actions: DEFAULT_MIN_ACTIONS,
        })
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_word_budget(mut self, words: u32) -> Self {
        self.word_budget = words;
        self
    }

    pub fn with_min_actions(mut self, min_actions: usize) -> Self {
        self.min_actions = min_actions;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The exact request `build_report` would send
    pub fn build_request(
        &self,
        counters: &QualityCounters,
        status: Status,
        window: &TimeWindow,
    ) -> Result<GenerationRequest, QcError> {
        let data = PromptData::new(
            counters,
            status,
            window,
            self.classifier.thresholds().legend(),
            self.classifier.assessment(status),
            self.word_budget,
            self.min_actions,
        );
        let prompt = self
            .template
            .render(&data)
            .map_err(|e| QcError::Render(format!("prompt: {}", e)))?;

        Ok(GenerationRequest {
            prompt,
            sampling: self.sampling.clone(),
            timeout: self.timeout,
        })
    }

    /// Generate, parse and assemble the report for one window
    pub async fn build_report(
        &self,
        counters: &QualityCounters,
        status: Status,
        window: &TimeWindow,
        ctx: &BuildContext,
    ) -> Result<Report, QcError> {
        if counters.is_empty() {
            info!(trace_id = %ctx.trace_id, window = %window.label, "no data in window, skipping generation");
            return self.no_data_report(window, ctx);
        }

        let request = self.build_request(counters, status, window)?;
        debug!(
            trace_id = %ctx.trace_id,
            prompt_chars = request.prompt.len(),
            "requesting narrative"
        );

        let raw = self.generator.complete(&request).await?;
        let mut sections = parse_sections(&raw, self.min_actions)?;

        // Numbers and status in the report come from the counters, never from generated text
        for section in sections.iter_mut() {
            match section.kind {
                SectionKind::KeyMetrics => section.body = metrics_table(counters, status),
                SectionKind::StatusAssessment => {
                    section.body = self.status_assessment(&section.body, status)?
                }
                _ => {}
            }
        }
        if !sections.iter().any(|s| s.kind == SectionKind::Metadata) {
            sections.push(NarrativeSection::new(
                SectionKind::Metadata,
                metadata_body(window),
            ));
        }

        Report::new(window.clone(), *counters, status, sections, ctx.now)
    }

    /// Lead with the computed status and its assessment, keep the generated
    /// commentary. A reply claiming a different status is malformed.
    fn status_assessment(&self, generated: &str, status: Status) -> Result<String, QcError> {
        let (claimed, commentary) = split_status_lead(generated);
        if let Some(claimed) = claimed.filter(|c| *c != status) {
            return Err(QcError::MalformedGeneration(format!(
                "status assessment claims {} but the counters give {}",
                claimed, status
            )));
        }

        let assessment = self.classifier.assessment(status);
        let commentary = commentary
            .strip_prefix(assessment.as_str())
            .unwrap_or(commentary)
            .trim();

        let mut body = format!("Status: **{}**\n\n{}", status, assessment);
        if !commentary.is_empty() {
            body.push_str("\n\n");
            body.push_str(commentary);
        }
        Ok(body)
    }

    fn no_data_report(&self, window: &TimeWindow, ctx: &BuildContext) -> Result<Report, QcError> {
        let counters = QualityCounters::new(0, 0);
        let actions = NO_DATA_ACTIONS
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{}. {}", i + 1, a))
            .collect::<Vec<_>>()
            .join("\n");

        let sections = vec![
            NarrativeSection::new(
                SectionKind::NoData,
                format!(
                    "No items were classified during {}. There is no data for this window; \
                     this is not a failure of the reporting pipeline.",
                    window.label
                ),
            ),
            NarrativeSection::new(
                SectionKind::KeyMetrics,
                metrics_table(&counters, Status::Undefined),
            ),
            NarrativeSection::new(
                SectionKind::StatusAssessment,
                self.status_assessment("", Status::Undefined)?,
            ),
            NarrativeSection::new(SectionKind::TopActions, actions),
            NarrativeSection::new(SectionKind::Metadata, metadata_body(window)),
        ];

        Report::new(window.clone(), counters, Status::Undefined, sections, ctx.now)
    }
}

/// Key Metrics table derived from the counters
pub fn metrics_table(counters: &QualityCounters, status: Status) -> String {
    let accept_pct = format_rate(counters.accept_rate());
    let loss_pct = format_rate(counters.loss_rate());
    let total = counters.total();
    let accepted_flag = if counters.is_empty() { "-" } else { "✓" };

    [
        "| Metric | Value | Status |".to_string(),
        "|--------|-------|--------|".to_string(),
        format!("| Total Processed | {} | - |", total),
        format!(
            "| Accepted (Fresh) | {}/{} ({}) | {} |",
            counters.accepted(),
            total,
            accept_pct,
            accepted_flag
        ),
        format!(
            "| Rejected (Dry) | {}/{} ({}) | {} |",
            counters.rejected(),
            total,
            loss_pct,
            status
        ),
        format!("| Loss Rate | {} | {} |", loss_pct, status),
    ]
    .join("\n")
}

fn metadata_body(window: &TimeWindow) -> String {
    format!(
        "*Report period: {}*\n*Requires Quality Manager approval before distribution*",
        window.label
    )
}
