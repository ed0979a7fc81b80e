//! QC Quality: loss-rate thresholds and status classification
//!
//! # Example
//!
//! ```ignore
//! use qc_quality::{classify, StatusClassifier, StatusThresholds};
//!
//! let status = classify(&QualityCounters::new(80, 20));
//! assert_eq!(status, Status::Critical);
//!
//! let strict = StatusClassifier::new(StatusThresholds::from_yaml(yaml)?);
//! ```

pub mod classifier;
pub mod thresholds;

pub use classifier::StatusClassifier;
pub use thresholds::{StatusThresholds, ThresholdError};

use qc_core::{QualityCounters, Status};

/// Classify with the default sorting-line thresholds
pub fn classify(counters: &QualityCounters) -> Status {
    StatusClassifier::default().classify(counters)
}
