//! QC Telemetry: event store access and window aggregation
//!
//! The store is consumed only through [`TelemetryStore`]: a lazy, paginated
//! stream of already-classified events. External label vocabularies are
//! translated into [`qc_core::Label`] by the store adapters, so the
//! aggregator never sees raw strings.
//!
//! # Example
//!
//! ```ignore
//! use qc_telemetry::{InMemoryTelemetryStore, TelemetryAggregator};
//!
//! let store = Arc::new(InMemoryTelemetryStore::new());
//! let aggregator = TelemetryAggregator::new(store, Duration::from_secs(10));
//! let window = aggregator.resolve_window(&WindowSpec::LastHours(24), &ctx).await?;
//! let counters = aggregator.aggregate(&window).await?;
//! ```

pub mod aggregator;
pub mod memory;
pub mod rest;
pub mod store;
pub mod vocabulary;

pub use aggregator::TelemetryAggregator;
pub use memory::InMemoryTelemetryStore;
pub use rest::{RestStoreConfig, RestTelemetryStore};
pub use store::{EventStream, StoreError, TelemetryStore};
pub use vocabulary::LabelVocabulary;
