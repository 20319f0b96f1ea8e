//! Previous-event resolution and dwell computation
//!
//! Given an order and the moment a new transition is being recorded, finds
//! the latest event already on the log and derives how long the order sat in
//! its previous state. The read is best-effort under concurrent writers:
//! two recorders racing on the same order may both resolve the same
//! previous event, and the last-appended one wins as "current" for future
//! resolutions. That interleaving is accepted, not an error.

use super::storage::{TrailStorage, TrailStoreResult};
use shared::trail::TransitionEvent;
use std::time::Duration;

/// Resolves the previous event of an order and the dwell since it
#[derive(Clone)]
pub struct DwellResolver {
    storage: TrailStorage,
}

impl DwellResolver {
    pub fn new(storage: TrailStorage) -> Self {
        Self { storage }
    }

    /// Latest transition event for the order at read time, or None if this
    /// is the order's first transition
    pub fn resolve_previous(&self, order_id: &str) -> TrailStoreResult<Option<TransitionEvent>> {
        self.storage.last_transition(order_id)
    }

    /// Elapsed wall-clock time since the previous event
    ///
    /// None when there is no previous event: the first transition has no
    /// measured dwell, and zero would wrongly claim a measured sub-instant
    /// one. A clock stepping backwards between writers clamps to zero.
    pub fn dwell_since(previous: Option<&TransitionEvent>, now_millis: i64) -> Option<Duration> {
        previous.map(|prev| {
            let elapsed = (now_millis - prev.created_at).max(0);
            Duration::from_millis(elapsed as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::actor::Origin;
    use shared::status::{OrderStatus, TechnicalStatus};

    fn event_at(created_at: i64) -> TransitionEvent {
        TransitionEvent {
            event_id: "evt".into(),
            sequence: 1,
            order_id: "os:1".into(),
            tenant_id: "tenant:a".into(),
            previous_status: None,
            new_status: OrderStatus::Aberta,
            previous_technical_status: None,
            new_technical_status: TechnicalStatus::NaoIniciada,
            actor_id: None,
            actor_name: "System".into(),
            reason: None,
            notes: None,
            dwell_duration: None,
            created_at,
            origin: Origin::Automation,
        }
    }

    #[test]
    fn first_event_has_no_dwell() {
        assert_eq!(DwellResolver::dwell_since(None, 1_000), None);
    }

    #[test]
    fn dwell_is_elapsed_time_since_previous() {
        let prev = event_at(1_000);
        let dwell = DwellResolver::dwell_since(Some(&prev), 1_000 + 2 * 3_600_000).unwrap();
        assert_eq!(dwell, Duration::from_secs(2 * 3600));
    }

    #[test]
    fn backwards_clock_clamps_to_zero() {
        let prev = event_at(5_000);
        let dwell = DwellResolver::dwell_since(Some(&prev), 4_000).unwrap();
        assert_eq!(dwell, Duration::ZERO);
    }
}
