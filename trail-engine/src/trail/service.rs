//! Trail service
//!
//! `TrailService` is the single entry point collaborators hold:
//! - transition recording (awaited, callers want the outcome)
//! - fire-and-forget generic action logging (mpsc channel to a worker)
//! - timeline and metrics queries (direct reads)
//! - order registration and per-tenant operating timezones
//!
//! The channel send blocks when the buffer is full rather than dropping:
//! backpressure is acceptable, losing trail entries silently is not.

use super::metrics::{MetricsAggregator, TrailMetrics};
use super::recorder::{NewAction, NewTransition, RecordOutcome, RecordResult, TrailRecorder};
use super::storage::{TrailStorage, TrailStoreResult};
use super::timeline::{TimelineEntry, TimelineReader};
use crate::core::Config;
use chrono_tz::Tz;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Facade over the trail engine's write and read paths
pub struct TrailService {
    storage: TrailStorage,
    recorder: TrailRecorder,
    timeline: TimelineReader,
    metrics: MetricsAggregator,
    tx: mpsc::Sender<NewAction>,
    /// Operating timezone per tenant; tenants without an entry use the
    /// configured default
    tenant_timezones: DashMap<String, Tz>,
    default_timezone: Tz,
}

impl std::fmt::Debug for TrailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrailService")
            .field("default_timezone", &self.default_timezone)
            .finish_non_exhaustive()
    }
}

impl TrailService {
    /// Create the service and the receiver its worker consumes
    ///
    /// Spawn a [`super::worker::TrailWorker`] with the returned receiver to
    /// drain the fire-and-forget channel.
    pub fn new(
        storage: TrailStorage,
        config: &Config,
    ) -> (Arc<Self>, mpsc::Receiver<NewAction>) {
        let (tx, rx) = mpsc::channel(config.channel_buffer);
        let recorder = TrailRecorder::for_storage(&storage);
        let service = Arc::new(Self {
            recorder,
            timeline: TimelineReader::new(storage.clone()),
            metrics: MetricsAggregator::new(storage.clone()),
            storage,
            tx,
            tenant_timezones: DashMap::new(),
            default_timezone: config.default_timezone,
        });
        (service, rx)
    }

    // ========== Registration ==========

    /// Register an order under its owning tenant
    ///
    /// Called by the order intake flow before the first transition.
    pub fn register_order(&self, order_id: &str, tenant_id: &str) -> TrailStoreResult<()> {
        self.storage.register_order(order_id, tenant_id)
    }

    /// Set a tenant's operating timezone (used by `events_today`)
    pub fn set_tenant_timezone(&self, tenant_id: impl Into<String>, tz: Tz) {
        self.tenant_timezones.insert(tenant_id.into(), tz);
    }

    /// Operating timezone for a tenant, defaulting to the configured one
    pub fn timezone_for(&self, tenant_id: &str) -> Tz {
        self.tenant_timezones
            .get(tenant_id)
            .map(|entry| *entry)
            .unwrap_or(self.default_timezone)
    }

    // ========== Write path ==========

    /// Record a status transition and await the outcome
    ///
    /// A failure here is the audit step's failure only; the status change
    /// the caller already persisted stands regardless.
    pub async fn record_transition(&self, input: NewTransition) -> RecordResult<RecordOutcome> {
        self.recorder.record_transition(input).await
    }

    /// Queue a generic action entry for the background worker (non-blocking
    /// for the caller's own flow; waits only when the buffer is full)
    pub async fn log_action(&self, action: NewAction) {
        if self.tx.send(action).await.is_err() {
            tracing::error!("Trail action channel closed, entry lost!");
        }
    }

    /// Access to the recorder for awaited action recording and the
    /// convenience wrappers
    pub fn recorder(&self) -> &TrailRecorder {
        &self.recorder
    }

    // ========== Read path ==========

    /// Transition timeline for an order, most-recent first
    pub fn timeline(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> TrailStoreResult<Vec<TimelineEntry>> {
        self.timeline.timeline(tenant_id, order_id)
    }

    /// Transition history for an order, oldest first
    pub fn history(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> TrailStoreResult<Vec<shared::trail::TransitionEvent>> {
        self.timeline.history(tenant_id, order_id)
    }

    /// Metrics over one order's action log, "today" relative to now in the
    /// tenant's operating timezone
    pub fn order_metrics(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> TrailStoreResult<TrailMetrics> {
        self.metrics.order_metrics(
            tenant_id,
            order_id,
            self.timezone_for(tenant_id),
            shared::util::now_millis(),
        )
    }

    /// Metrics over a tenant's whole action log
    pub fn tenant_metrics(&self, tenant_id: &str) -> TrailStoreResult<TrailMetrics> {
        self.metrics.tenant_metrics(
            tenant_id,
            self.timezone_for(tenant_id),
            shared::util::now_millis(),
        )
    }

    /// Storage handle (read-only use)
    pub fn storage(&self) -> &TrailStorage {
        &self.storage
    }
}
