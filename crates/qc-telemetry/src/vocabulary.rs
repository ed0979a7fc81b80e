//! External label vocabulary → canonical [`Label`]
//!
//! The sorting line records `Fresh` / `Dry` (older deployments wrote
//! `Rotten`). Translation happens once, at ingestion.

use crate::store::StoreError;
use qc_core::Label;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelVocabulary {
    /// Lowercased external label → canonical label
    entries: HashMap<String, Label>,
}

impl LabelVocabulary {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_alias(mut self, raw: impl AsRef<str>, label: Label) -> Self {
        self.entries.insert(raw.as_ref().trim().to_lowercase(), label);
        self
    }

    /// Case-insensitive; unknown labels are a schema violation
    pub fn translate(&self, raw: &str) -> Result<Label, StoreError> {
        self.entries
            .get(&raw.trim().to_lowercase())
            .copied()
            .ok_or_else(|| StoreError::Schema(format!("unknown classification label '{}'", raw)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self::empty()
            .with_alias("fresh", Label::Accepted)
            .with_alias("accepted", Label::Accepted)
            .with_alias("dry", Label::Rejected)
            .with_alias("rotten", Label::Rejected)
            .with_alias("rejected", Label::Rejected)
    }
}
