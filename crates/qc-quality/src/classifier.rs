//! Status classification
//!
//! Maps quality counters to an operational status. Pure and total: every
//! `QualityCounters` value has exactly one status.

use super::thresholds::StatusThresholds;
use qc_core::{QualityCounters, Status};

/// Classifier bound to one thresholds profile
#[derive(Debug, Clone, Default)]
pub struct StatusClassifier {
    thresholds: StatusThresholds,
}

impl StatusClassifier {
    pub fn new(thresholds: StatusThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &StatusThresholds {
        &self.thresholds
    }

    pub fn classify(&self, counters: &QualityCounters) -> Status {
        match counters.loss_rate() {
            None => Status::Undefined,
            Some(rate) if rate >= self.thresholds.critical => Status::Critical,
            Some(rate) if rate >= self.thresholds.warning => Status::Warning,
            Some(_) => Status::Ok,
        }
    }

    /// One-line assessment matching the status band
    pub fn assessment(&self, status: Status) -> String {
        let w = self.thresholds.warning * 100.0;
        let c = self.thresholds.critical * 100.0;
        match status {
            Status::Critical => format!(
                "Immediate Action Required: loss rate at or above the {:.0}% threshold.",
                c
            ),
            Status::Warning => format!(
                "Attention Needed: loss rate above normal range ({:.0}-{:.0}%).",
                w, c
            ),
            Status::Ok => "Normal Operations: loss rate within acceptable limits.".to_string(),
            Status::Undefined => {
                "No Data: no items were classified in this window; loss rate is undefined."
                    .to_string()
            }
        }
    }
}
