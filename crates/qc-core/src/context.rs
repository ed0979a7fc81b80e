//! Build Context: the per-build "now" snapshot and trace id
use chrono::{DateTime, Utc};

/// Source of "now". Read exactly once per build.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant (tests, replays)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct BuildContext {
    pub trace_id: String,
    /// Reused for window resolution and for the report's `generated_at`
    pub now: DateTime<Utc>,
}

impl BuildContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            now,
        }
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.now())
    }
}
