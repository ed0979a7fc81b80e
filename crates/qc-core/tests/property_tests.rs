//! Counter invariants over arbitrary inputs.

use proptest::prelude::*;
use qc_core::{format_rate, QualityCounters};

const MAX_ITEMS: u64 = 1 << 40;

proptest! {
    #[test]
    fn counters_sum_to_total(accepted in 0..MAX_ITEMS, rejected in 0..MAX_ITEMS) {
        let c = QualityCounters::new(accepted, rejected);
        prop_assert_eq!(c.accepted() + c.rejected(), c.total());
        prop_assert_eq!(c.is_empty(), c.total() == 0);
    }

    #[test]
    fn loss_rate_is_a_fraction(accepted in 0..MAX_ITEMS, rejected in 0..MAX_ITEMS) {
        let c = QualityCounters::new(accepted, rejected);
        match c.loss_rate() {
            None => prop_assert_eq!(c.total(), 0),
            Some(rate) => {
                prop_assert!((0.0..=1.0).contains(&rate), "loss rate {} out of range", rate);
                let accept = c.accept_rate().unwrap_or_default();
                prop_assert!((rate + accept - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn counters_survive_serde(accepted in 0..MAX_ITEMS, rejected in 0..MAX_ITEMS) {
        let c = QualityCounters::new(accepted, rejected);
        let json = serde_json::to_string(&c).unwrap();
        let back: QualityCounters = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, c);
    }

    #[test]
    fn inconsistent_totals_never_deserialize(
        accepted in 0..MAX_ITEMS,
        rejected in 0..MAX_ITEMS,
        skew in 1..1000u64,
    ) {
        let json = format!(
            r#"{{"total":{},"accepted":{},"rejected":{}}}"#,
            accepted + rejected + skew,
            accepted,
            rejected
        );
        prop_assert!(serde_json::from_str::<QualityCounters>(&json).is_err());
    }

    #[test]
    fn formatted_rate_is_a_percentage(accepted in 0..MAX_ITEMS, rejected in 1..MAX_ITEMS) {
        let text = format_rate(QualityCounters::new(accepted, rejected).loss_rate());
        prop_assert!(text.ends_with('%'));
        let value: f64 = text.trim_end_matches('%').parse().unwrap();
        prop_assert!((0.0..=100.0).contains(&value));
    }
}
