//! Order audit-trail engine for the repair-shop platform
//!
//! Records every transition of a repair order's status (public and
//! technical dimensions), attributes each transition to an actor, computes
//! how long the order dwelled in its previous state and reconstructs
//! timelines and aggregate metrics from the resulting append-only log.
//!
//! # Module structure
//!
//! ```text
//! trail-engine/src/
//! ├── core/          # configuration
//! ├── trail/         # event store, recorder, timeline, metrics, worker
//! └── utils/         # logging, time helpers
//! ```
//!
//! The engine owns no network protocol or CLI; callers link it as a library
//! and treat trail recording as observational: a failed trail write is
//! reported but must never block the order mutation it describes.

pub mod core;
pub mod trail;
pub mod utils;

// Re-export public types
pub use crate::core::Config;
pub use crate::trail::{
    DirectWriter, DwellResolver, ListOrder, MetricsAggregator, NewAction, NewTransition,
    RecordError, RecordOutcome, TimelineEntry, TimelineReader, TrailMetrics, TrailRecorder,
    TrailService, TrailStorage, TrailStoreError, TrailWorker, TrailWriter, ValidatedWriter,
    WritePath, WriteStrategy,
};
