//! Time windows: caller-facing specs and resolved half-open intervals
use crate::error::QcError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compact UTC stamp used in slugs and artifact names
pub const COMPACT_TS: &str = "%Y%m%dT%H%M%SZ";

/// What the caller asked for. Symbolic variants resolve against the
/// build's "now" snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowSpecRepr", into = "WindowSpecRepr")]
pub enum WindowSpec {
    LastHours(u32),
    LastDays(u32),
    Explicit {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    AllTime,
}

/// Wire form: either an alias string or `{start, end}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WindowSpecRepr {
    Alias(String),
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl TryFrom<WindowSpecRepr> for WindowSpec {
    type Error = QcError;

    fn try_from(repr: WindowSpecRepr) -> Result<Self, Self::Error> {
        match repr {
            WindowSpecRepr::Alias(alias) => alias.parse(),
            WindowSpecRepr::Range { start, end } => WindowSpec::explicit(start, end),
        }
    }
}

impl From<WindowSpec> for WindowSpecRepr {
    fn from(spec: WindowSpec) -> Self {
        match spec {
            WindowSpec::Explicit { start, end } => WindowSpecRepr::Range { start, end },
            other => WindowSpecRepr::Alias(other.alias()),
        }
    }
}

impl WindowSpec {
    pub fn explicit(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, QcError> {
        if start >= end {
            return Err(QcError::InvalidWindow(format!(
                "start {} must be before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self::Explicit { start, end })
    }

    /// `last-24-hours`, `last-7-days`, `all-time`, or `range`
    pub fn alias(&self) -> String {
        match self {
            Self::LastHours(1) => "last-1-hour".to_string(),
            Self::LastHours(n) => format!("last-{}-hours", n),
            Self::LastDays(1) => "last-1-day".to_string(),
            Self::LastDays(n) => format!("last-{}-days", n),
            Self::Explicit { .. } => "range".to_string(),
            Self::AllTime => "all-time".to_string(),
        }
    }

    pub fn is_all_time(&self) -> bool {
        matches!(self, Self::AllTime)
    }

    /// Resolve into a concrete interval.
    ///
    /// `earliest` is the store's minimum event timestamp and is only read
    /// for `AllTime`; an empty store resolves to `[UNIX_EPOCH, now)`.
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        earliest: Option<DateTime<Utc>>,
    ) -> Result<TimeWindow, QcError> {
        match self {
            Self::LastHours(n) => {
                let back = lookback(Duration::try_hours(i64::from(*n)), *n, "hours")?;
                let start = checked_back(now, back)?;
                let label = format!("Last {} hour{}", n, if *n > 1 { "s" } else { "" });
                TimeWindow::new(start, now, self.alias(), label)
            }
            Self::LastDays(n) => {
                let back = lookback(Duration::try_days(i64::from(*n)), *n, "days")?;
                let start = checked_back(now, back)?;
                let label = format!("Last {} day{}", n, if *n > 1 { "s" } else { "" });
                TimeWindow::new(start, now, self.alias(), label)
            }
            Self::Explicit { start, end } => {
                let label = format!(
                    "{} to {}",
                    start.format("%Y-%m-%d %H:%M"),
                    end.format("%Y-%m-%d %H:%M")
                );
                TimeWindow::new(*start, *end, self.alias(), label)
            }
            Self::AllTime => {
                let start = earliest
                    .filter(|t| *t < now)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                TimeWindow::new(start, now, self.alias(), "All time".to_string())
            }
        }
    }
}

fn lookback(delta: Option<Duration>, n: u32, unit: &str) -> Result<Duration, QcError> {
    if n == 0 {
        return Err(QcError::InvalidWindow(format!("last-0-{} is an empty window", unit)));
    }
    delta.ok_or_else(|| QcError::InvalidWindow(format!("{} {} is out of range", n, unit)))
}

fn checked_back(now: DateTime<Utc>, back: Duration) -> Result<DateTime<Utc>, QcError> {
    now.checked_sub_signed(back)
        .ok_or_else(|| QcError::InvalidWindow("lookback reaches before the representable range".into()))
}

impl FromStr for WindowSpec {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "all-time" || normalized == "all" {
            return Ok(Self::AllTime);
        }

        let rest = normalized
            .strip_prefix("last-")
            .ok_or_else(|| QcError::InvalidWindow(format!("unknown window alias '{}'", s)))?;
        let (count, unit) = rest
            .split_once('-')
            .ok_or_else(|| QcError::InvalidWindow(format!("unknown window alias '{}'", s)))?;
        let n: u32 = count
            .parse()
            .map_err(|_| QcError::InvalidWindow(format!("bad count in window alias '{}'", s)))?;
        if n == 0 {
            return Err(QcError::InvalidWindow(format!("empty window alias '{}'", s)));
        }

        match unit {
            "hour" | "hours" => Ok(Self::LastHours(n)),
            "day" | "days" => Ok(Self::LastDays(n)),
            _ => Err(QcError::InvalidWindow(format!("unknown window unit in '{}'", s))),
        }
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Explicit { start, end } => {
                write!(f, "[{}, {})", start.to_rfc3339(), end.to_rfc3339())
            }
            other => f.write_str(&other.alias()),
        }
    }
}

/// A resolved half-open interval `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Alias of the spec that produced it (`last-24-hours`, `range`, ...)
    pub alias: String,
    /// Human label for documents and prompts
    pub label: String,
}

impl TimeWindow {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        alias: String,
        label: String,
    ) -> Result<Self, QcError> {
        if start >= end {
            return Err(QcError::InvalidWindow(format!(
                "resolved window [{}, {}) is empty",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self {
            start,
            end,
            alias,
            label,
        })
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts < self.end
    }

    /// Filesystem-safe identity: alias plus both bounds
    pub fn slug(&self) -> String {
        format!(
            "{}_{}-{}",
            self.alias,
            self.start.format(COMPACT_TS),
            self.end.format(COMPACT_TS)
        )
    }
}
