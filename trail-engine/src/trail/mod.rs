//! Order trail module: append-only status and action history
//!
//! # Architecture
//!
//! ```text
//! Order mutation flow
//!   ├─ TrailService::record_transition() ─→ TrailRecorder ─→ WriteStrategy ─→ redb
//!   │                                           │ (resolve previous, derive dwell)
//!   └─ TrailService::log_action() ─→ mpsc ─→ TrailWorker ─→ TrailRecorder ─→ redb
//!
//! Timeline view / dashboards
//!   ├─ TrailService::timeline() ──→ TimelineReader ──→ redb
//!   └─ TrailService::*_metrics() ─→ MetricsAggregator ─→ redb
//! ```
//!
//! # Guarantees
//!
//! - **Append-only**: no update or delete interface on any event table
//! - **Ordered**: global insertion sequence breaks same-millisecond ties
//! - **Tenant-isolated**: every read validates or filters by tenant
//! - **Observational**: a failed write surfaces to the caller but never
//!   blocks the order mutation it describes
//!
//! Writes take no cross-operation lock: concurrent recorders may resolve
//! the same previous event and both measure a dwell from it. The log keeps
//! every entry; only the interpretation of "current previous event" races,
//! and the last-appended event wins for future resolutions.

pub mod metrics;
pub mod recorder;
pub mod resolver;
pub mod service;
pub mod storage;
pub mod timeline;
pub mod worker;
pub mod writer;

pub use metrics::{MetricsAggregator, TrailMetrics};
pub use recorder::{
    NewAction, NewTransition, RecordError, RecordOutcome, RecordResult, TrailRecorder,
};
pub use resolver::DwellResolver;
pub use service::TrailService;
pub use storage::{ListOrder, TrailStorage, TrailStoreError, TrailStoreResult};
pub use timeline::{TimelineEntry, TimelineReader};
pub use worker::TrailWorker;
pub use writer::{DirectWriter, TrailWriter, ValidatedWriter, WritePath, WriteStrategy};
