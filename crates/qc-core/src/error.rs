//! Unified Error Model
use crate::stage::PipelineStage;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure classes reported by the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    Timeout,
    Auth,
    Quota,
    /// Any other transport or upstream failure (5xx, undecodable body)
    Upstream,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Timeout => "TIMEOUT",
            Self::Auth => "AUTH",
            Self::Quota => "QUOTA",
            Self::Upstream => "UPSTREAM",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QcError {
    #[error("WINDOW/{0}")]
    InvalidWindow(String),

    #[error("STORE/UNAVAILABLE: {0}")]
    StoreUnavailable(String),

    #[error("STORE/SCHEMA: {0}")]
    StoreSchema(String),

    #[error("GEN/{kind}: {message}")]
    GenerationService {
        kind: GenerationErrorKind,
        message: String,
    },

    #[error("GEN/MALFORMED: {0}")]
    MalformedGeneration(String),

    #[error("RENDER/{0}")]
    Render(String),
}

impl QcError {
    pub fn generation(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self::GenerationService {
            kind,
            message: message.into(),
        }
    }

    /// Stable machine-readable kind, used by the API error body and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidWindow(_) => "invalid_window",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::StoreSchema(_) => "store_schema_error",
            Self::GenerationService { kind, .. } => match kind {
                GenerationErrorKind::Timeout => "generation_timeout",
                GenerationErrorKind::Auth => "generation_auth",
                GenerationErrorKind::Quota => "generation_quota",
                GenerationErrorKind::Upstream => "generation_upstream",
            },
            Self::MalformedGeneration(_) => "malformed_generation",
            Self::Render(_) => "render_error",
        }
    }

    /// Transient infra failures the orchestrator may retry locally
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_)
                | Self::GenerationService {
                    kind: GenerationErrorKind::Timeout,
                    ..
                }
        )
    }
}

/// A failed build: the underlying error plus the stage and window it hit
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{stage} stage failed for window '{window}': {source}")]
pub struct BuildError {
    pub stage: PipelineStage,
    pub window: String,
    #[source]
    pub source: QcError,
}

impl BuildError {
    pub fn new(stage: PipelineStage, window: impl Into<String>, source: QcError) -> Self {
        Self {
            stage,
            window: window.into(),
            source,
        }
    }
}
