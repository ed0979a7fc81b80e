//! Prometheus registry for report builds, served on `/v1/metrics`.
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use qc_core::{PipelineStage, Status};

pub struct ApiMetrics {
    registry: Registry,
    reports_total: IntCounterVec,
    failures_total: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reports_total = IntCounterVec::new(
            Opts::new("qc_reports_total", "Reports built, by status"),
            &["status"],
        )?;
        let failures_total = IntCounterVec::new(
            Opts::new("qc_report_failures_total", "Failed builds, by pipeline stage"),
            &["stage"],
        )?;
        registry.register(Box::new(reports_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;

        Ok(Self {
            registry,
            reports_total,
            failures_total,
        })
    }

    pub fn record_report(&self, status: Status) {
        self.reports_total.with_label_values(&[status.as_str()]).inc();
    }

    pub fn record_failure(&self, stage: PipelineStage) {
        self.failures_total.with_label_values(&[stage.id()]).inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_exported() {
        let metrics = ApiMetrics::new().unwrap();
        metrics.record_report(Status::Critical);
        metrics.record_report(Status::Critical);
        metrics.record_failure(PipelineStage::Narrate);

        let text = metrics.encode().unwrap();
        assert!(text.contains("qc_reports_total{status=\"CRITICAL\"} 2"));
        assert!(text.contains("qc_report_failures_total{stage=\"narrate\"} 1"));
    }
}
