//! Pipeline stages, in execution order
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Window resolution + telemetry aggregation
    Aggregate,
    Classify,
    /// Prompt building, generation call and response parsing
    Narrate,
    Render,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::Aggregate,
        PipelineStage::Classify,
        PipelineStage::Narrate,
        PipelineStage::Render,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Aggregate => "aggregate",
            Self::Classify => "classify",
            Self::Narrate => "narrate",
            Self::Render => "render",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}
