//! redb-based storage layer for the order trail
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `transitions` | `(order_id, sequence)` | `TransitionEvent` | Status transition log (append-only) |
//! | `actions` | `(order_id, sequence)` | `ActionEvent` | Generic action log (append-only) |
//! | `tenant_actions` | `(tenant_id, sequence)` | `order_id` | Tenant index for aggregate scans |
//! | `orders` | `order_id` | `tenant_id` | Order registry (tenant ownership) |
//! | `sequence_counter` | `()` | `u64` | Global insertion sequence |
//!
//! The insertion sequence is shared by both event kinds and is allocated
//! inside the write transaction, so two events recorded within the same
//! clock millisecond still have a total order.
//!
//! # Durability
//!
//! redb commits are immediate: `append_*` returns only after the event is
//! durably recorded, and a failed commit surfaces as an error instead of a
//! silently dropped entry. There is no update or delete operation on any
//! event table.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::trail::{ActionEvent, TransitionEvent};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Status transition log: key = (order_id, sequence), value = JSON-serialized TransitionEvent
const TRANSITIONS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("transitions");

/// Generic action log: key = (order_id, sequence), value = JSON-serialized ActionEvent
const ACTIONS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("actions");

/// Tenant index over the action log: key = (tenant_id, sequence), value = order_id
const TENANT_ACTIONS_TABLE: TableDefinition<(&str, u64), &str> =
    TableDefinition::new("tenant_actions");

/// Order registry: key = order_id, value = owning tenant_id
const ORDERS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("orders");

/// Sequence counter table: key = "seq", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const SEQUENCE_KEY: &str = "seq";

/// Read direction for per-order listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Forward-chronological (metric derivation)
    OldestFirst,
    /// Reverse-chronological (timeline display)
    NewestFirst,
}

/// Storage errors
///
/// Validation rejections (`OrderNotFound`, `TenantMismatch`) are terminal:
/// retrying the same write can never succeed, so they never trigger the
/// degraded fallback path. Everything coming out of the database layer is
/// treated as potentially transient.
#[derive(Debug, Error)]
pub enum TrailStoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order {order_id} does not belong to tenant {tenant_id}")]
    TenantMismatch { order_id: String, tenant_id: String },
}

impl TrailStoreError {
    /// Whether a retry through a different write path could still succeed
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            TrailStoreError::OrderNotFound(_)
                | TrailStoreError::TenantMismatch { .. }
                | TrailStoreError::Serialization(_)
        )
    }
}

pub type TrailStoreResult<T> = Result<T, TrailStoreError>;

/// Order trail storage backed by redb
///
/// Append-only design: only `append_*`, `register_order` and read methods
/// are exposed. Events are never updated or removed; corrections are new
/// events.
#[derive(Clone)]
pub struct TrailStorage {
    db: Arc<Database>,
}

impl TrailStorage {
    /// Open or create the database at the given path
    ///
    /// redb uses immediate durability: commits are persistent as soon as
    /// `commit()` returns, and the file is always in a consistent state
    /// after a crash.
    pub fn open(path: impl AsRef<Path>) -> TrailStoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> TrailStoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> TrailStoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TRANSITIONS_TABLE)?;
            let _ = write_txn.open_table(ACTIONS_TABLE)?;
            let _ = write_txn.open_table(TENANT_ACTIONS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(SEQUENCE_KEY)?.is_none() {
                seq_table.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Order Registry ==========

    /// Register an order under its owning tenant
    ///
    /// Idempotent for the same tenant; re-registering an order under a
    /// different tenant is rejected.
    pub fn register_order(&self, order_id: &str, tenant_id: &str) -> TrailStoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            if let Some(existing) = table.get(order_id)? {
                if existing.value() != tenant_id {
                    return Err(TrailStoreError::TenantMismatch {
                        order_id: order_id.to_string(),
                        tenant_id: tenant_id.to_string(),
                    });
                }
            } else {
                table.insert(order_id, tenant_id)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Owning tenant of an order, if the order is registered
    pub fn tenant_of(&self, order_id: &str) -> TrailStoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.get(order_id)?.map(|guard| guard.value().to_string()))
    }

    /// Verify that an order exists and belongs to the given tenant
    pub fn check_ownership(&self, order_id: &str, tenant_id: &str) -> TrailStoreResult<()> {
        match self.tenant_of(order_id)? {
            None => Err(TrailStoreError::OrderNotFound(order_id.to_string())),
            Some(owner) if owner != tenant_id => Err(TrailStoreError::TenantMismatch {
                order_id: order_id.to_string(),
                tenant_id: tenant_id.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    // ========== Sequence ==========

    /// Increment and return the global sequence (within transaction)
    fn increment_sequence(txn: &WriteTransaction) -> TrailStoreResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(SEQUENCE_KEY, next)?;
        Ok(next)
    }

    /// Current sequence value (read-only)
    pub fn current_sequence(&self) -> TrailStoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    // ========== Append ==========

    /// Append a transition event, assigning its insertion sequence
    ///
    /// Returns the stored event. Durable on return.
    pub fn append_transition(
        &self,
        mut event: TransitionEvent,
    ) -> TrailStoreResult<TransitionEvent> {
        let txn = self.db.begin_write()?;
        {
            event.sequence = Self::increment_sequence(&txn)?;

            let mut table = txn.open_table(TRANSITIONS_TABLE)?;
            let value = serde_json::to_vec(&event)?;
            table.insert((event.order_id.as_str(), event.sequence), value.as_slice())?;
        }
        txn.commit()?;
        Ok(event)
    }

    /// Append a generic action event, assigning its insertion sequence
    ///
    /// Also maintains the tenant index used by aggregate scans.
    pub fn append_action(&self, mut event: ActionEvent) -> TrailStoreResult<ActionEvent> {
        let txn = self.db.begin_write()?;
        {
            event.sequence = Self::increment_sequence(&txn)?;

            let mut table = txn.open_table(ACTIONS_TABLE)?;
            let value = serde_json::to_vec(&event)?;
            table.insert((event.order_id.as_str(), event.sequence), value.as_slice())?;

            let mut index = txn.open_table(TENANT_ACTIONS_TABLE)?;
            index.insert(
                (event.tenant_id.as_str(), event.sequence),
                event.order_id.as_str(),
            )?;
        }
        txn.commit()?;
        Ok(event)
    }

    // ========== Reads ==========

    /// Latest transition event for an order, or None for a fresh order
    ///
    /// Keys are `(order_id, sequence)`, so the last key in the order's range
    /// is the most recently appended event.
    pub fn last_transition(&self, order_id: &str) -> TrailStoreResult<Option<TransitionEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSITIONS_TABLE)?;

        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        match table.range(range_start..=range_end)?.next_back() {
            Some(result) => {
                let (_key, value) = result?;
                let event: TransitionEvent = serde_json::from_slice(value.value())?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    /// All transition events for an order in the requested direction
    pub fn transitions_for_order(
        &self,
        order_id: &str,
        direction: ListOrder,
    ) -> TrailStoreResult<Vec<TransitionEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSITIONS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let event: TransitionEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        if direction == ListOrder::NewestFirst {
            events.reverse();
        }
        Ok(events)
    }

    /// All action events for an order in the requested direction
    pub fn actions_for_order(
        &self,
        order_id: &str,
        direction: ListOrder,
    ) -> TrailStoreResult<Vec<ActionEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIONS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let event: ActionEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        if direction == ListOrder::NewestFirst {
            events.reverse();
        }
        Ok(events)
    }

    /// All action events for a tenant, oldest first
    ///
    /// Scans the tenant index and resolves each entry against the action
    /// log. Index entries whose event is missing indicate a torn write that
    /// redb's transactional commits rule out, so resolution failures are
    /// surfaced rather than skipped.
    pub fn actions_for_tenant(&self, tenant_id: &str) -> TrailStoreResult<Vec<ActionEvent>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(TENANT_ACTIONS_TABLE)?;
        let actions = read_txn.open_table(ACTIONS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (tenant_id, 0u64);
        let range_end = (tenant_id, u64::MAX);

        for result in index.range(range_start..=range_end)? {
            let (key, order_id) = result?;
            let (_tenant, sequence) = key.value();
            let order_id = order_id.value().to_string();

            match actions.get((order_id.as_str(), sequence))? {
                Some(value) => {
                    let event: ActionEvent = serde_json::from_slice(value.value())?;
                    events.push(event);
                }
                None => {
                    return Err(TrailStoreError::Unavailable(format!(
                        "tenant index entry without event: order={} seq={}",
                        order_id, sequence
                    )));
                }
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::actor::Origin;
    use shared::status::{OrderStatus, TechnicalStatus};
    use shared::trail::{ActionCategory, ActionKind};

    fn transition(order_id: &str, tenant_id: &str, status: OrderStatus) -> TransitionEvent {
        TransitionEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence: 0,
            order_id: order_id.to_string(),
            tenant_id: tenant_id.to_string(),
            previous_status: None,
            new_status: status,
            previous_technical_status: None,
            new_technical_status: TechnicalStatus::NaoIniciada,
            actor_id: None,
            actor_name: "System".into(),
            reason: None,
            notes: None,
            dwell_duration: None,
            created_at: shared::util::now_millis(),
            origin: Origin::TechnicianPanel,
        }
    }

    fn action(order_id: &str, tenant_id: &str, actor: &str) -> ActionEvent {
        ActionEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence: 0,
            order_id: order_id.to_string(),
            tenant_id: tenant_id.to_string(),
            kind: ActionKind::ValueChange,
            category: ActionCategory::Financeiro,
            description: "Valor alterado".into(),
            detail: serde_json::Value::Null,
            field_changed: Some("valor".into()),
            previous_value: Some("100".into()),
            new_value: Some("150".into()),
            actor_id: None,
            actor_name: actor.to_string(),
            actor_role: None,
            reason: None,
            notes: None,
            created_at: shared::util::now_millis(),
            origin: Origin::TechnicianPanel,
            ip_address: None,
            client_info: None,
        }
    }

    #[test]
    fn sequence_is_monotonic_across_event_kinds() {
        let storage = TrailStorage::open_in_memory().unwrap();

        let t1 = storage
            .append_transition(transition("os:1", "tenant:a", OrderStatus::Aberta))
            .unwrap();
        let a1 = storage.append_action(action("os:1", "tenant:a", "Carlos")).unwrap();
        let t2 = storage
            .append_transition(transition("os:1", "tenant:a", OrderStatus::EmAnalise))
            .unwrap();

        assert!(t1.sequence < a1.sequence);
        assert!(a1.sequence < t2.sequence);
        assert_eq!(storage.current_sequence().unwrap(), t2.sequence);
    }

    #[test]
    fn listings_preserve_append_order() {
        let storage = TrailStorage::open_in_memory().unwrap();

        for status in [OrderStatus::Aberta, OrderStatus::EmAnalise, OrderStatus::EmReparo] {
            storage
                .append_transition(transition("os:1", "tenant:a", status))
                .unwrap();
        }
        // Another order interleaved in the same store
        storage
            .append_transition(transition("os:2", "tenant:a", OrderStatus::Aberta))
            .unwrap();

        let asc = storage
            .transitions_for_order("os:1", ListOrder::OldestFirst)
            .unwrap();
        assert_eq!(asc.len(), 3);
        assert!(asc.windows(2).all(|w| w[0].sequence < w[1].sequence));

        let desc = storage
            .transitions_for_order("os:1", ListOrder::NewestFirst)
            .unwrap();
        assert_eq!(desc[0].new_status, OrderStatus::EmReparo);

        let last = storage.last_transition("os:1").unwrap().unwrap();
        assert_eq!(last.new_status, OrderStatus::EmReparo);
        assert!(storage.last_transition("os:9").unwrap().is_none());
    }

    #[test]
    fn tenant_index_only_returns_own_events() {
        let storage = TrailStorage::open_in_memory().unwrap();

        storage.append_action(action("os:1", "tenant:a", "Carlos")).unwrap();
        storage.append_action(action("os:2", "tenant:b", "Fernanda")).unwrap();
        storage.append_action(action("os:3", "tenant:a", "Carlos")).unwrap();

        let a_events = storage.actions_for_tenant("tenant:a").unwrap();
        assert_eq!(a_events.len(), 2);
        assert!(a_events.iter().all(|e| e.tenant_id == "tenant:a"));

        let b_events = storage.actions_for_tenant("tenant:b").unwrap();
        assert_eq!(b_events.len(), 1);
        assert_eq!(b_events[0].order_id, "os:2");
    }

    #[test]
    fn registry_rejects_cross_tenant_reregistration() {
        let storage = TrailStorage::open_in_memory().unwrap();

        storage.register_order("os:1", "tenant:a").unwrap();
        storage.register_order("os:1", "tenant:a").unwrap();
        assert!(matches!(
            storage.register_order("os:1", "tenant:b"),
            Err(TrailStoreError::TenantMismatch { .. })
        ));

        storage.check_ownership("os:1", "tenant:a").unwrap();
        assert!(matches!(
            storage.check_ownership("os:1", "tenant:b"),
            Err(TrailStoreError::TenantMismatch { .. })
        ));
        assert!(matches!(
            storage.check_ownership("os:9", "tenant:a"),
            Err(TrailStoreError::OrderNotFound(_))
        ));
    }
}
