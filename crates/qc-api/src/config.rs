//! Service configuration
//!
//! YAML file named by `QC_CONFIG` (optional), then environment overrides.
//! Secrets normally come from the environment only.

use std::path::PathBuf;
use std::time::Duration;

use qc_narrative::SamplingConfig;
use qc_pipeline::RetryPolicy;
use qc_quality::StatusThresholds;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8787";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONFIG/IO: cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CONFIG/PARSE: {0}")]
    Parse(String),
    #[error("CONFIG/MISSING: {0} is not set (config file or environment)")]
    Missing(&'static str),
    #[error("CONFIG/INVALID: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// `DB_API`
    pub url: Option<String>,
    /// `DB_SERVICE_ROLE_KEY`
    pub key: Option<String>,
    pub table: String,
    pub page_size: usize,
    pub timeout_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            table: "logs".to_string(),
            page_size: 1000,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationSection {
    /// `GEMINI_API_KEY`
    pub api_key: Option<String>,
    /// `GEMINI_MODEL`
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for GenerationSection {
    fn default() -> Self {
        let sampling = SamplingConfig::default();
        Self {
            api_key: None,
            model: qc_narrative::gemini::DEFAULT_MODEL.to_string(),
            base_url: qc_narrative::gemini::DEFAULT_BASE_URL.to_string(),
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_output_tokens: sampling.max_output_tokens,
            timeout_ms: 60_000,
        }
    }
}

impl GenerationSection {
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    /// `QC_ADDR`
    pub addr: String,
    pub store: StoreSection,
    pub generation: GenerationSection,
    pub thresholds: StatusThresholds,
    pub retry: RetryPolicy,
    /// `QC_REPORTS_DIR`
    pub reports_dir: PathBuf,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            store: StoreSection::default(),
            generation: GenerationSection::default(),
            thresholds: StatusThresholds::default(),
            retry: RetryPolicy::default(),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl QcConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// File from `QC_CONFIG` if set, then process environment, then validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("QC_CONFIG") {
            Ok(path) => {
                let yaml = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path: path.clone(), source })?;
                Self::from_yaml(&yaml)?
            }
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from an environment lookup; empty values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = get("QC_ADDR") {
            self.addr = addr;
        }
        if let Some(url) = get("DB_API") {
            self.store.url = Some(url);
        }
        if let Some(key) = get("DB_SERVICE_ROLE_KEY") {
            self.store.key = Some(key);
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.generation.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.generation.model = model;
        }
        if let Some(dir) = get("QC_REPORTS_DIR") {
            self.reports_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.is_none() {
            return Err(ConfigError::Missing("DB_API"));
        }
        if self.store.key.is_none() {
            return Err(ConfigError::Missing("DB_SERVICE_ROLE_KEY"));
        }
        if self.generation.api_key.is_none() {
            return Err(ConfigError::Missing("GEMINI_API_KEY"));
        }
        self.thresholds
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.retry.store_attempts == 0 {
            return Err(ConfigError::Invalid("retry.store_attempts must be at least 1".into()));
        }
        if self.store.page_size == 0 {
            return Err(ConfigError::Invalid("store.page_size must be at least 1".into()));
        }
        Ok(())
    }
}
