//! Aggregate metrics over the action log
//!
//! Everything is computed from a full scan of the relevant event set at
//! query time; there is no incremental maintenance. Modes (most active
//! actor, most common category) break ties by first appearance in the
//! sequence-ordered scan. The tie-break is deterministic but not claimed to
//! be the "correct" answer among equals.

use super::storage::{ListOrder, TrailStorage, TrailStoreResult};
use crate::utils::time::{day_bounds_millis, local_date};
use chrono_tz::Tz;
use serde::Serialize;
use shared::trail::ActionEvent;
use std::collections::HashMap;

/// Aggregate summary for an order or a tenant
#[derive(Debug, Clone, Serialize)]
pub struct TrailMetrics {
    pub total_events: u64,
    /// Events whose timestamp falls on the reference calendar day in the
    /// tenant's operating timezone
    pub events_today: u64,
    pub most_active_actor: Option<String>,
    pub most_common_category: Option<String>,
    pub last_action_description: Option<String>,
}

/// Computes per-order and per-tenant summaries
#[derive(Clone)]
pub struct MetricsAggregator {
    storage: TrailStorage,
}

impl MetricsAggregator {
    pub fn new(storage: TrailStorage) -> Self {
        Self { storage }
    }

    /// Summary over one order's action log
    ///
    /// `as_of` is the reference instant for "today" (Unix millis); pass the
    /// current time for live metrics.
    pub fn order_metrics(
        &self,
        tenant_id: &str,
        order_id: &str,
        tz: Tz,
        as_of: i64,
    ) -> TrailStoreResult<TrailMetrics> {
        self.storage.check_ownership(order_id, tenant_id)?;
        let events = self.storage.actions_for_order(order_id, ListOrder::OldestFirst)?;
        Ok(aggregate(&events, tz, as_of))
    }

    /// Summary over a tenant's whole action log
    pub fn tenant_metrics(
        &self,
        tenant_id: &str,
        tz: Tz,
        as_of: i64,
    ) -> TrailStoreResult<TrailMetrics> {
        let events = self.storage.actions_for_tenant(tenant_id)?;
        Ok(aggregate(&events, tz, as_of))
    }
}

fn aggregate(events: &[ActionEvent], tz: Tz, as_of: i64) -> TrailMetrics {
    let (day_start, day_end) = day_bounds_millis(local_date(as_of, tz), tz);
    let events_today = events
        .iter()
        .filter(|e| e.created_at >= day_start && e.created_at < day_end)
        .count() as u64;

    TrailMetrics {
        total_events: events.len() as u64,
        events_today,
        most_active_actor: mode_first_seen(events.iter().map(|e| e.actor_name.as_str())),
        most_common_category: mode_first_seen(events.iter().map(|e| e.category.to_string())),
        last_action_description: events.last().map(|e| e.description.clone()),
    }
}

/// Highest-frequency value, ties broken by first appearance in the scan
fn mode_first_seen<I, S>(values: I) -> Option<String>
where
    I: Iterator<Item = S>,
    S: Into<String>,
{
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (index, value) in values.enumerate() {
        let entry = counts.entry(value.into()).or_insert((0, index));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}
