//! QC Pipeline: the single entry point for report builds
//!
//! # Example
//!
//! ```ignore
//! use qc_pipeline::ReportOrchestrator;
//!
//! let orchestrator = ReportOrchestrator::from_collaborators(store, generator, renderer)?;
//! let (report, artifact) = orchestrator
//!     .produce(&"last-24-hours".parse()?, DocumentFormat::Html)
//!     .await?;
//! ```
//!
//! Retry policy: `StoreUnavailable` is retried with exponential backoff,
//! a generation timeout is retried once, everything else surfaces as a
//! [`qc_core::BuildError`] naming the failed stage and window.

pub mod orchestrator;
pub mod retry;

pub use orchestrator::{ReportOrchestrator, DEFAULT_STORE_TIMEOUT};
pub use retry::RetryPolicy;
