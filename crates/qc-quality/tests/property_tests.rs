//! Classification bands over arbitrary counters and threshold profiles.

use proptest::prelude::*;
use qc_core::{QualityCounters, Status};
use qc_quality::{StatusClassifier, StatusThresholds};

const MAX_ITEMS: u64 = 1 << 32;

fn severity(status: Status) -> u8 {
    match status {
        Status::Undefined => 0,
        Status::Ok => 1,
        Status::Warning => 2,
        Status::Critical => 3,
    }
}

fn counters() -> impl Strategy<Value = QualityCounters> {
    (0..MAX_ITEMS, 0..MAX_ITEMS).prop_map(|(a, r)| QualityCounters::new(a, r))
}

/// Batch size plus two reject counts within it
fn same_batch() -> impl Strategy<Value = (u64, u64, u64)> {
    (1..100_000u64).prop_flat_map(|total| (Just(total), 0..=total, 0..=total))
}

/// Valid profiles: 0 < warning < critical <= 1
fn thresholds() -> impl Strategy<Value = StatusThresholds> {
    (1..999u32, 1..1000u32)
        .prop_filter("warning below critical", |(w, c)| w < c)
        .prop_map(|(w, c)| {
            StatusThresholds::new(w as f64 / 1000.0, c as f64 / 1000.0).unwrap()
        })
}

proptest! {
    #[test]
    fn classify_matches_band_definition(c in counters(), t in thresholds()) {
        let status = StatusClassifier::new(t.clone()).classify(&c);
        let expected = match c.loss_rate() {
            None => Status::Undefined,
            Some(rate) if rate >= t.critical => Status::Critical,
            Some(rate) if rate >= t.warning => Status::Warning,
            Some(_) => Status::Ok,
        };
        prop_assert_eq!(status, expected);
    }

    #[test]
    fn classify_is_deterministic(c in counters()) {
        let classifier = StatusClassifier::default();
        prop_assert_eq!(classifier.classify(&c), classifier.classify(&c));
    }

    #[test]
    fn severity_never_drops_as_loss_rises(a in counters(), b in counters(), t in thresholds()) {
        prop_assume!(!a.is_empty() && !b.is_empty());
        let classifier = StatusClassifier::new(t);
        let (low, high) = if a.loss_rate() <= b.loss_rate() { (a, b) } else { (b, a) };
        prop_assert!(
            severity(classifier.classify(&low)) <= severity(classifier.classify(&high)),
            "{:?} classified above {:?}",
            low,
            high
        );
    }

    #[test]
    fn more_rejects_in_same_batch_never_lower_status((total, x, y) in same_batch()) {
        let (r1, r2) = (x.min(y), x.max(y));
        let classifier = StatusClassifier::default();
        let before = classifier.classify(&QualityCounters::new(total - r1, r1));
        let after = classifier.classify(&QualityCounters::new(total - r2, r2));
        prop_assert!(severity(before) <= severity(after));
    }

    #[test]
    fn only_empty_windows_are_undefined(c in counters()) {
        let status = StatusClassifier::default().classify(&c);
        prop_assert_eq!(status == Status::Undefined, c.is_empty());
    }
}
