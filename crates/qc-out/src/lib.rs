//! QC-OUT: Report to Document Renderer
//!
//! Turns a [`Report`] into a styled, paginated document and publishes it
//! atomically under a deterministic name.
//!
//! # Example
//!
//! ```ignore
//! use qc_out::DocumentRenderer;
//! use qc_core::DocumentFormat;
//!
//! let renderer = DocumentRenderer::new("reports")?;
//! let artifact = renderer.render(&report, DocumentFormat::Html)?;
//! println!("{}", artifact.path.display());
//! ```
//!
//! Rendering is a pure function of the report: the same report always yields
//! the same bytes and the same file name. Only `DocumentArtifact::created_at`
//! records when the file was published.

pub mod markup;
pub mod renderer;
pub mod templates;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use qc_core::window::COMPACT_TS;
use qc_core::{
    format_rate, Clock, DocumentArtifact, DocumentFormat, QcError, Report, SystemClock,
    QC_VERSION,
};
use renderer::TemplateRenderer;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use templates::TemplatesFile;
use tracing::info;

/// Prefix shared by every published report file
pub const FILE_PREFIX: &str = "qc-report";

pub struct DocumentRenderer {
    output_dir: PathBuf,
    renderer: TemplateRenderer,
    clock: Arc<dyn Clock>,
}

impl DocumentRenderer {
    /// Renderer using the bundled templates
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, QcError> {
        Self::with_templates(output_dir, &TemplatesFile::bundled()?)
    }

    pub fn with_templates(
        output_dir: impl Into<PathBuf>,
        templates: &TemplatesFile,
    ) -> Result<Self, QcError> {
        Ok(Self {
            output_dir: output_dir.into(),
            renderer: TemplateRenderer::new(templates)?,
            clock: Arc::new(SystemClock),
        })
    }

    /// Clock used to stamp `created_at` on published artifacts
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `qc-report_<window slug>_<generated_at>.<ext>`
    pub fn file_name(report: &Report, format: DocumentFormat) -> String {
        format!(
            "{}_{}_{}.{}",
            FILE_PREFIX,
            report.window.slug(),
            report.generated_at.format(COMPACT_TS),
            format.extension()
        )
    }

    /// Document text without touching the filesystem
    pub fn render_to_string(&self, report: &Report, format: DocumentFormat) -> Result<String, QcError> {
        self.renderer.render(format, &document_data(report))
    }

    /// Render and atomically publish. Either the complete document appears
    /// at its final path or nothing does.
    pub fn render(&self, report: &Report, format: DocumentFormat) -> Result<DocumentArtifact, QcError> {
        let content = self.render_to_string(report, format)?;
        let path = self.output_dir.join(Self::file_name(report, format));

        publish(&self.output_dir, &path, content.as_bytes())?;

        let artifact = DocumentArtifact {
            path,
            format,
            created_at: self.clock.now(),
            source_report_hash: report.content_hash(),
        };
        info!(
            path = %artifact.path.display(),
            hash = %artifact.source_report_hash,
            "published report document"
        );
        Ok(artifact)
    }
}

/// Write to a temp file in the target directory, then rename over the
/// final path. The temp file is removed if anything fails before persist.
fn publish(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), QcError> {
    let io_err = |what: &str, e: std::io::Error| {
        QcError::Render(format!("{} {}: {}", what, path.display(), e))
    };

    std::fs::create_dir_all(dir).map_err(|e| io_err("creating directory for", e))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_err("staging", e))?;
    tmp.write_all(bytes).map_err(|e| io_err("writing", e))?;
    tmp.as_file().sync_all().map_err(|e| io_err("syncing", e))?;
    tmp.persist(path).map_err(|e| io_err("publishing", e.error))?;
    Ok(())
}

fn document_data(report: &Report) -> Value {
    let sections: Vec<Value> = report
        .narrative_sections
        .iter()
        .map(|s| json!({ "kind": s.kind, "heading": s.heading, "body": s.body }))
        .collect();

    json!({
        "version": QC_VERSION,
        "report_hash": report.content_hash(),
        "generated_at": report.generated_at.format("%B %d, %Y at %I:%M %p UTC").to_string(),
        "window": {
            "label": report.window.label,
            "start": report.window.start.format("%Y-%m-%d %H:%M UTC").to_string(),
            "end": report.window.end.format("%Y-%m-%d %H:%M UTC").to_string(),
        },
        "status": report.status.as_str(),
        "no_data": report.is_no_data(),
        "counters": {
            "total": report.counters.total(),
            "accepted": report.counters.accepted(),
            "rejected": report.counters.rejected(),
            "accept_rate": report.counters.accept_rate(),
            "loss_rate": report.counters.loss_rate(),
            "loss_pct": format_rate(report.counters.loss_rate()),
        },
        "sections": sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use qc_core::{NarrativeSection, QualityCounters, SectionKind, Status, WindowSpec};

    fn report(accepted: u64, rejected: u64, status: Status) -> Report {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let window = WindowSpec::LastHours(24).resolve(now, None).unwrap();
        Report::new(
            window,
            QualityCounters::new(accepted, rejected),
            status,
            vec![
                NarrativeSection::new(SectionKind::KeyMetrics, "| Metric | Value |\n|---|---|\n| Total | 100 |"),
                NarrativeSection::new(SectionKind::StatusAssessment, "Status: **CRITICAL**\n\nAct now."),
                NarrativeSection::new(SectionKind::TopActions, "1. a\n2. b\n3. c"),
            ],
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let r = report(80, 20, Status::Critical);
        assert_eq!(
            DocumentRenderer::file_name(&r, DocumentFormat::Html),
            "qc-report_last-24-hours_20261017T120000Z-20261018T120000Z_20261018T120000Z.html"
        );
        assert!(DocumentRenderer::file_name(&r, DocumentFormat::Markdown).ends_with(".md"));
    }

    #[test]
    fn test_html_has_chrome_and_badge() {
        let renderer = DocumentRenderer::new("unused").unwrap();
        let html = renderer
            .render_to_string(&report(80, 20, Status::Critical), DocumentFormat::Html)
            .unwrap();
        assert!(html.contains("Smart Harvest Quality Control System"));
        assert!(html.contains("Generated: October 18, 2026 at 12:00 PM UTC"));
        assert!(html.contains("counter(page) ' of ' counter(pages)"));
        assert!(html.contains("badge badge-critical"));
        assert!(html.contains("<td>80/100 (80%)</td>"));
        assert!(html.contains("Confidential - For Internal Use Only"));
        assert!(html.contains("<meta name=\"qc-report-hash\" content=\"blake3:"));
    }

    #[test]
    fn test_markdown_keeps_section_bodies() {
        let renderer = DocumentRenderer::new("unused").unwrap();
        let md = renderer
            .render_to_string(&report(80, 20, Status::Critical), DocumentFormat::Markdown)
            .unwrap();
        assert!(md.starts_with("<!-- qc-report-hash: blake3:"));
        assert!(md.contains("### Top Actions\n\n1. a\n2. b\n3. c"));
        assert!(md.contains("**Status:** CRITICAL"));
    }

    #[test]
    fn test_render_is_pure() {
        let renderer = DocumentRenderer::new("unused").unwrap();
        let r = report(95, 5, Status::Warning);
        assert_eq!(
            renderer.render_to_string(&r, DocumentFormat::Html).unwrap(),
            renderer.render_to_string(&r, DocumentFormat::Html).unwrap()
        );
    }
}
