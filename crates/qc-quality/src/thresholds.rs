//! Status thresholds profile
//!
//! Loss-rate bands for the sorting line. Each band is inclusive on its
//! lower bound: `[0, warning)` OK, `[warning, critical)` WARNING,
//! `[critical, 1]` CRITICAL.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ThresholdError {
    #[error("thresholds must satisfy 0 < warning ({warning}) < critical ({critical}) <= 1")]
    OutOfOrder { warning: f64, critical: f64 },
    #[error("invalid thresholds YAML: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusThresholds {
    /// Profile name (e.g., "sorting-line@1.0")
    #[serde(default = "default_name")]
    pub name: String,

    /// Lowest loss rate classified WARNING
    pub warning: f64,

    /// Lowest loss rate classified CRITICAL
    pub critical: f64,
}

fn default_name() -> String {
    "custom".to_string()
}

impl StatusThresholds {
    /// 5% / 15%: the date-packing line's market-value limits
    pub fn sorting_line() -> Self {
        Self {
            name: "sorting-line@1.0".to_string(),
            warning: 0.05,
            critical: 0.15,
        }
    }

    pub fn new(warning: f64, critical: f64) -> Result<Self, ThresholdError> {
        let thresholds = Self {
            name: default_name(),
            warning,
            critical,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        let ordered = self.warning > 0.0 && self.warning < self.critical && self.critical <= 1.0;
        if ordered {
            Ok(())
        } else {
            Err(ThresholdError::OutOfOrder {
                warning: self.warning,
                critical: self.critical,
            })
        }
    }

    /// Load profile from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ThresholdError> {
        let thresholds: Self =
            serde_yaml::from_str(yaml).map_err(|e| ThresholdError::Parse(e.to_string()))?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Legend used in prompts and documents, e.g. "OK < 5%, WARNING 5-15%, CRITICAL >= 15%"
    pub fn legend(&self) -> String {
        format!(
            "OK < {w}%, WARNING {w}-{c}%, CRITICAL >= {c}%",
            w = percent(self.warning),
            c = percent(self.critical)
        )
    }
}

fn percent(rate: f64) -> String {
    let p = rate * 100.0;
    if (p - p.round()).abs() < 1e-9 {
        format!("{}", p.round() as i64)
    } else {
        format!("{:.1}", p)
    }
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self::sorting_line()
    }
}
