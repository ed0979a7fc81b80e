//! Data Model: TelemetryEvent, QualityCounters, Status, Report, DocumentArtifact
use crate::error::QcError;
use crate::window::TimeWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Canonical classification label. External vocabularies are translated
/// into this set where events enter the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Accepted,
    Rejected,
}

/// One classified item, as recorded by the classification service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub timestamp: DateTime<Utc>,
    pub label: Label,
    /// Classifier confidence in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl TelemetryEvent {
    pub fn new(timestamp: DateTime<Utc>, label: Label) -> Self {
        Self {
            timestamp,
            label,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Aggregation result for one window. `accepted + rejected == total` holds
/// for every value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawCounters")]
pub struct QualityCounters {
    total: u64,
    accepted: u64,
    rejected: u64,
}

#[derive(Deserialize)]
struct RawCounters {
    total: u64,
    accepted: u64,
    rejected: u64,
}

impl TryFrom<RawCounters> for QualityCounters {
    type Error = String;

    fn try_from(raw: RawCounters) -> Result<Self, Self::Error> {
        if raw.accepted.checked_add(raw.rejected) != Some(raw.total) {
            return Err(format!(
                "inconsistent counters: {} accepted + {} rejected != {} total",
                raw.accepted, raw.rejected, raw.total
            ));
        }
        Ok(Self::new(raw.accepted, raw.rejected))
    }
}

impl QualityCounters {
    pub fn new(accepted: u64, rejected: u64) -> Self {
        Self {
            total: accepted + rejected,
            accepted,
            rejected,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// `rejected / total`; undefined (None) for an empty window
    pub fn loss_rate(&self) -> Option<f64> {
        ratio(self.rejected, self.total)
    }

    pub fn accept_rate(&self) -> Option<f64> {
        ratio(self.accepted, self.total)
    }
}

/// `0.2 → "20%"`, `0.975 → "97.5%"`, undefined → `"n/a"`
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        None => "n/a".to_string(),
        Some(r) => {
            let tenths = (r * 1000.0).round() / 10.0;
            if tenths.fract() == 0.0 {
                format!("{:.0}%", tenths)
            } else {
                format!("{:.1}%", tenths)
            }
        }
    }
}

fn ratio(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(part as f64 / total as f64)
    }
}

/// Operational status derived from the loss rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Critical,
    /// No items in the window
    Undefined,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical report sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    KeyMetrics,
    StatusAssessment,
    TopActions,
    RootCauses,
    Metadata,
    NoData,
}

impl SectionKind {
    pub const REQUIRED: [SectionKind; 3] = [
        SectionKind::KeyMetrics,
        SectionKind::StatusAssessment,
        SectionKind::TopActions,
    ];

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::KeyMetrics => "Key Metrics",
            Self::StatusAssessment => "Status Assessment",
            Self::TopActions => "Top Actions",
            Self::RootCauses => "Root Causes",
            Self::Metadata => "Metadata",
            Self::NoData => "No Data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub kind: SectionKind,
    pub heading: String,
    /// Markdown body
    pub body: String,
}

impl NarrativeSection {
    pub fn new(kind: SectionKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            heading: kind.title().to_string(),
            body: body.into(),
        }
    }
}

/// Immutable result of one build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub window: TimeWindow,
    pub counters: QualityCounters,
    pub status: Status,
    pub narrative_sections: Vec<NarrativeSection>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct HashedContent<'a> {
    window: &'a TimeWindow,
    counters: &'a QualityCounters,
    status: Status,
    narrative_sections: &'a [NarrativeSection],
}

impl Report {
    /// Rejects section lists missing any required section
    pub fn new(
        window: TimeWindow,
        counters: QualityCounters,
        status: Status,
        narrative_sections: Vec<NarrativeSection>,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, QcError> {
        let missing: Vec<&str> = SectionKind::REQUIRED
            .iter()
            .filter(|kind| !narrative_sections.iter().any(|s| s.kind == **kind))
            .map(|kind| kind.title())
            .collect();
        if !missing.is_empty() {
            return Err(QcError::MalformedGeneration(format!(
                "missing required sections: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            window,
            counters,
            status,
            narrative_sections,
            generated_at,
        })
    }

    pub fn section(&self, kind: SectionKind) -> Option<&NarrativeSection> {
        self.narrative_sections.iter().find(|s| s.kind == kind)
    }

    pub fn is_no_data(&self) -> bool {
        self.status == Status::Undefined
    }

    /// blake3 over window, counters, status and sections. `generated_at`
    /// is excluded so rebuilding an unchanged window yields the same hash.
    pub fn content_hash(&self) -> String {
        let content = HashedContent {
            window: &self.window,
            counters: &self.counters,
            status: self.status,
            narrative_sections: &self.narrative_sections,
        };
        let bytes = serde_json::to_vec(&content).unwrap_or_default();
        format!("blake3:{}", blake3::hash(&bytes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Print-ready paginated HTML
    Html,
    Markdown,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Markdown => "text/markdown",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "md" | "markdown" => Ok(Self::Markdown),
            other => Err(QcError::Render(format!("unsupported format '{}'", other))),
        }
    }
}

/// A published document plus its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentArtifact {
    pub path: PathBuf,
    pub format: DocumentFormat,
    /// Publish time
    pub created_at: DateTime<Utc>,
    pub source_report_hash: String,
}

impl DocumentArtifact {
    /// Same source report, so the caller may skip re-rendering
    pub fn is_duplicate_of(&self, other: &DocumentArtifact) -> bool {
        self.source_report_hash == other.source_report_hash && self.format == other.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowSpec;
    use chrono::TimeZone;

    fn window() -> TimeWindow {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        WindowSpec::LastHours(24).resolve(now, None).unwrap()
    }

    fn sections() -> Vec<NarrativeSection> {
        vec![
            NarrativeSection::new(SectionKind::KeyMetrics, "| Metric | Value |"),
            NarrativeSection::new(SectionKind::StatusAssessment, "OK"),
            NarrativeSection::new(SectionKind::TopActions, "1. a\n2. b\n3. c"),
        ]
    }

    #[test]
    fn test_counters_invariant_and_rates() {
        let c = QualityCounters::new(80, 20);
        assert_eq!(c.total(), 100);
        assert_eq!(c.accepted() + c.rejected(), c.total());
        assert_eq!(c.loss_rate(), Some(0.2));
        assert_eq!(c.accept_rate(), Some(0.8));
    }

    #[test]
    fn test_empty_counters_have_no_loss_rate() {
        let c = QualityCounters::new(0, 0);
        assert!(c.is_empty());
        assert_eq!(c.loss_rate(), None);
    }

    #[test]
    fn test_counters_deserialize_rejects_inconsistent_totals() {
        let ok: QualityCounters =
            serde_json::from_str(r#"{"total":10,"accepted":7,"rejected":3}"#).unwrap();
        assert_eq!(ok, QualityCounters::new(7, 3));

        let bad = serde_json::from_str::<QualityCounters>(r#"{"total":10,"accepted":7,"rejected":4}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Status::Critical).unwrap(), "\"CRITICAL\"");
        assert_eq!(Status::Undefined.to_string(), "UNDEFINED");
    }

    #[test]
    fn test_report_requires_sections() {
        let mut partial = sections();
        partial.pop();
        let err = Report::new(window(), QualityCounters::new(1, 0), Status::Ok, partial, Utc::now())
            .unwrap_err();
        assert!(matches!(err, QcError::MalformedGeneration(ref m) if m.contains("Top Actions")));
    }

    #[test]
    fn test_content_hash_ignores_generated_at() {
        let t1 = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 10, 18, 13, 0, 0).unwrap();
        let a = Report::new(window(), QualityCounters::new(9, 1), Status::Warning, sections(), t1).unwrap();
        let b = Report::new(window(), QualityCounters::new(9, 1), Status::Warning, sections(), t2).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert!(a.content_hash().starts_with("blake3:"));

        let c = Report::new(window(), QualityCounters::new(8, 2), Status::Critical, sections(), t1).unwrap();
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(Some(1.0)), "100%");
        assert_eq!(format_rate(Some(0.2)), "20%");
        assert_eq!(format_rate(Some(0.975)), "97.5%");
        assert_eq!(format_rate(Some(1.0 / 3.0)), "33.3%");
        assert_eq!(format_rate(None), "n/a");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("HTML".parse::<DocumentFormat>().unwrap(), DocumentFormat::Html);
        assert_eq!("md".parse::<DocumentFormat>().unwrap(), DocumentFormat::Markdown);
        assert!("pdf".parse::<DocumentFormat>().is_err());
    }
}
