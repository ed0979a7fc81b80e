//! QC Narrative: generated analysis for quality reports
//!
//! - [`generation`]: the black-box completion contract
//! - [`gemini`]: HTTP client for the Gemini `generateContent` API
//! - [`prompt`]: handlebars report brief
//! - [`parser`]: strict markdown section parser
//! - [`builder`]: [`ReportPromptBuilder`], the component the orchestrator calls

pub mod builder;
pub mod gemini;
pub mod generation;
pub mod parser;
pub mod prompt;

pub use builder::{metrics_table, ReportPromptBuilder, DEFAULT_MIN_ACTIONS, DEFAULT_WORD_BUDGET};
pub use gemini::GeminiClient;
pub use generation::{GenerationRequest, GenerationService, SamplingConfig};
pub use parser::parse_sections;
pub use prompt::{PromptData, PromptError, PromptTemplate};
