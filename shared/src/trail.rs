//! Trail events - immutable facts recorded after order changes
//!
//! Two record kinds share the same append-only log:
//!
//! - [`TransitionEvent`] captures a status change on both dimensions plus the
//!   time the order dwelled in its previous state.
//! - [`ActionEvent`] is the generic superset for any tracked change (uploads,
//!   value edits, delivery), not only status.
//!
//! Both are created exactly once and never updated or deleted; corrections
//! are new events.

use crate::actor::Origin;
use crate::status::{OrderStatus, TechnicalStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status transition record - immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Event unique ID
    pub event_id: String,
    /// Insertion sequence assigned by the store
    ///
    /// Tie-breaker for events recorded within the same clock tick; the
    /// authoritative ordering is (`created_at`, `sequence`).
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Tenant that owns the order
    pub tenant_id: String,
    /// Public status before the change (None for the order's first event)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<OrderStatus>,
    /// Public status after the change
    pub new_status: OrderStatus,
    /// Technical status before the change (None for the order's first event)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_technical_status: Option<TechnicalStatus>,
    /// Technical status after the change
    ///
    /// Equals `previous_technical_status` when only the public dimension
    /// changed; the event always carries a complete before/after snapshot of
    /// both dimensions.
    pub new_technical_status: TechnicalStatus,
    /// Operator ID (None for system-originated events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Operator name, "System" when no authenticated actor was available
    pub actor_name: String,
    /// Free-text reason for the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Wall-clock time the order spent in its previous status
    ///
    /// None (never zero) for the order's first event. Serialized as an
    /// interval value so downstream consumers can reformat at will.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dwell_duration: Option<Duration>,
    /// Server timestamp (Unix milliseconds) - the ordering key
    pub created_at: i64,
    /// Which flow produced the event
    pub origin: Origin,
}

/// Short codes identifying what a generic action entry tracks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    StatusChange,
    ImageUpload,
    ValueChange,
    Delivery,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::StatusChange => write!(f, "STATUS_CHANGE"),
            ActionKind::ImageUpload => write!(f, "IMAGE_UPLOAD"),
            ActionKind::ValueChange => write!(f, "VALUE_CHANGE"),
            ActionKind::Delivery => write!(f, "DELIVERY"),
        }
    }
}

/// Grouping label for action entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCategory {
    Status,
    Financeiro,
    Anexos,
    Entrega,
}

impl std::fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionCategory::Status => write!(f, "STATUS"),
            ActionCategory::Financeiro => write!(f, "FINANCEIRO"),
            ActionCategory::Anexos => write!(f, "ANEXOS"),
            ActionCategory::Entrega => write!(f, "ENTREGA"),
        }
    }
}

/// Generic audit record for any tracked change - immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Event unique ID
    pub event_id: String,
    /// Insertion sequence assigned by the store
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Tenant that owns the order
    pub tenant_id: String,
    /// What kind of action this entry tracks
    pub kind: ActionKind,
    /// Grouping label
    pub category: ActionCategory,
    /// Human-readable summary
    pub description: String,
    /// Opaque structured payload; shape is interpreted per `kind` at the
    /// call site that reads it, never validated here
    #[serde(default)]
    pub detail: serde_json::Value,
    /// Field name when the action is a scalar field edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_changed: Option<String>,
    /// Value before a scalar field edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<String>,
    /// Value after a scalar field edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Operator ID (None for system-originated events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Operator name, "System" when no authenticated actor was available
    pub actor_name: String,
    /// Operator role at the time of the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_role: Option<String>,
    /// Free-text reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Server timestamp (Unix milliseconds) - the ordering key
    pub created_at: i64,
    /// Which flow produced the event
    pub origin: Origin,
    /// Caller network origin (best-effort)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Client identity string (best-effort)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<String>,
}
