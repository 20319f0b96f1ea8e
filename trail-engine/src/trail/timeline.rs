//! Timeline reconstruction
//!
//! Pure reads over the transition log: reverse-chronological for display,
//! forward-chronological for metric derivation. Reads never block writers
//! and may miss an event that finished appending microseconds earlier;
//! a failed read surfaces as an error, never as an empty-but-successful
//! timeline.

use super::storage::{ListOrder, TrailStorage, TrailStoreResult};
use crate::utils::time::format_dwell;
use shared::trail::TransitionEvent;

/// Transition event prepared for display
///
/// First events (no previous status) and system-originated events (no
/// operator id) render without those fields; `actor_display` is never
/// empty and `dwell_display` is pre-formatted for the timeline view.
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub event: TransitionEvent,
    /// Human-readable dwell ("2d 3h 10m"), None for the order's first event
    pub dwell_display: Option<String>,
}

impl From<TransitionEvent> for TimelineEntry {
    fn from(event: TransitionEvent) -> Self {
        let dwell_display = event.dwell_duration.map(format_dwell);
        Self { event, dwell_display }
    }
}

/// Reads an order's trail back out of the store
#[derive(Clone)]
pub struct TimelineReader {
    storage: TrailStorage,
}

impl TimelineReader {
    pub fn new(storage: TrailStorage) -> Self {
        Self { storage }
    }

    /// Transition timeline for an order, most-recent first
    ///
    /// Verifies tenant ownership before reading; an order with no events
    /// yet yields an empty timeline, which is not an error.
    pub fn timeline(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> TrailStoreResult<Vec<TimelineEntry>> {
        self.storage.check_ownership(order_id, tenant_id)?;
        let events = self
            .storage
            .transitions_for_order(order_id, ListOrder::NewestFirst)?;
        Ok(events.into_iter().map(TimelineEntry::from).collect())
    }

    /// Transition history for an order, oldest first (metric derivation)
    pub fn history(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> TrailStoreResult<Vec<TransitionEvent>> {
        self.storage.check_ownership(order_id, tenant_id)?;
        self.storage
            .transitions_for_order(order_id, ListOrder::OldestFirst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::recorder::{NewTransition, TrailRecorder};
    use shared::actor::{Actor, Origin};
    use shared::status::{OrderStatus, TechnicalStatus};

    async fn record(
        recorder: &TrailRecorder,
        order_id: &str,
        tenant_id: &str,
        status: OrderStatus,
    ) {
        recorder
            .record_transition(NewTransition {
                tenant_id: tenant_id.into(),
                order_id: order_id.into(),
                new_status: status,
                new_technical_status: TechnicalStatus::NaoIniciada,
                actor: Actor::system(),
                reason: None,
                notes: None,
                origin: Origin::TechnicianPanel,
                context: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn timeline_is_most_recent_first_and_tolerates_first_event() {
        let storage = TrailStorage::open_in_memory().unwrap();
        storage.register_order("os:1", "tenant:a").unwrap();
        let recorder = TrailRecorder::for_storage(&storage);
        let reader = TimelineReader::new(storage);

        record(&recorder, "os:1", "tenant:a", OrderStatus::Aberta).await;
        record(&recorder, "os:1", "tenant:a", OrderStatus::EmAnalise).await;

        let entries = reader.timeline("tenant:a", "os:1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.new_status, OrderStatus::EmAnalise);
        assert!(entries[0].dwell_display.is_some());
        // First event renders without previous status or dwell
        assert!(entries[1].event.previous_status.is_none());
        assert!(entries[1].dwell_display.is_none());
        assert_eq!(entries[1].event.actor_name, "System");
    }

    #[tokio::test]
    async fn cross_tenant_timeline_is_rejected() {
        let storage = TrailStorage::open_in_memory().unwrap();
        storage.register_order("os:1", "tenant:a").unwrap();
        let reader = TimelineReader::new(storage);

        assert!(reader.timeline("tenant:b", "os:1").is_err());
        assert!(reader.timeline("tenant:a", "os:missing").is_err());
    }

    #[tokio::test]
    async fn empty_timeline_for_registered_order_is_not_an_error() {
        let storage = TrailStorage::open_in_memory().unwrap();
        storage.register_order("os:1", "tenant:a").unwrap();
        let reader = TimelineReader::new(storage);

        assert!(reader.timeline("tenant:a", "os:1").unwrap().is_empty());
    }
}
