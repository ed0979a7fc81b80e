//! QC Core: data model, error taxonomy and build context
//!
//! Shared vocabulary for every stage of the quality-control reporting
//! pipeline: aggregate → classify → narrate → render.

pub mod context;
pub mod data_model;
pub mod error;
pub mod stage;
pub mod window;

pub use context::{BuildContext, Clock, FixedClock, SystemClock};
pub use data_model::{
    format_rate, DocumentArtifact, DocumentFormat, Label, NarrativeSection, QualityCounters, Report,
    SectionKind, Status, TelemetryEvent,
};
pub use error::{BuildError, GenerationErrorKind, QcError};
pub use stage::PipelineStage;
pub use window::{TimeWindow, WindowSpec};

/// Engine version stamped into rendered documents
pub const QC_VERSION: &str = "1.0.0";
