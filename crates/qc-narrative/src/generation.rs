//! Generation service contract
use std::time::Duration;

use async_trait::async_trait;
use qc_core::QcError;
use serde::{Deserialize, Serialize};

/// Sampling kept low-variance: reports feed audit trails, so identical
/// inputs should give near-identical text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.85,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub sampling: SamplingConfig,
    pub timeout: Duration,
}

/// Black-box text completion. Failures are reported as
/// `QcError::GenerationService` with the kind (timeout/auth/quota/upstream)
/// filled in; implementations never retry.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, QcError>;
}
