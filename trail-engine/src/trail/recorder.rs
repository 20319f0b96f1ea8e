//! Transition and action recording
//!
//! The recorder is observational: it describes a mutation that already
//! happened. A recording failure is returned to the caller so it can be
//! logged and alerted on, but by contract it must never block or roll back
//! the status change it describes. Refusing a technician's status change
//! because logging failed is not acceptable operationally.

use super::resolver::DwellResolver;
use super::storage::{TrailStorage, TrailStoreError};
use super::writer::{WritePath, WriteStrategy};
use shared::actor::{Actor, Origin, RequestContext};
use shared::status::{OrderStatus, TechnicalStatus};
use shared::trail::{ActionCategory, ActionEvent, ActionKind, TransitionEvent};
use thiserror::Error;

/// Input for recording a status transition
#[derive(Debug, Clone)]
pub struct NewTransition {
    pub tenant_id: String,
    pub order_id: String,
    pub new_status: OrderStatus,
    pub new_technical_status: TechnicalStatus,
    pub actor: Actor,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub origin: Origin,
    /// Best-effort caller context; absent context never blocks recording
    pub context: Option<RequestContext>,
}

/// Input for recording a generic action entry
#[derive(Debug, Clone)]
pub struct NewAction {
    pub tenant_id: String,
    pub order_id: String,
    pub kind: ActionKind,
    pub category: ActionCategory,
    pub description: String,
    pub detail: serde_json::Value,
    pub field_changed: Option<String>,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    pub actor: Actor,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub origin: Origin,
    pub context: Option<RequestContext>,
}

/// Recording errors
#[derive(Debug, Error)]
pub enum RecordError {
    /// Rejected before any write: the order is unknown or owned by another
    /// tenant. Retrying cannot succeed.
    #[error("Validation failed: {0}")]
    Validation(TrailStoreError),

    /// Both the primary and the fallback write path failed. The business
    /// mutation this entry describes must still proceed; the caller only
    /// logs and alerts.
    #[error("Trail write failed: {0}")]
    WriteFailed(TrailStoreError),
}

impl From<TrailStoreError> for RecordError {
    fn from(err: TrailStoreError) -> Self {
        match err {
            TrailStoreError::OrderNotFound(_) | TrailStoreError::TenantMismatch { .. } => {
                RecordError::Validation(err)
            }
            other => RecordError::WriteFailed(other),
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Outcome of a successful transition recording
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub event: TransitionEvent,
    /// Whether the validated primary or the degraded fallback recorded it
    pub path: WritePath,
}

/// Records transitions and generic actions onto the trail
#[derive(Clone)]
pub struct TrailRecorder {
    resolver: DwellResolver,
    strategy: std::sync::Arc<WriteStrategy>,
}

impl TrailRecorder {
    pub fn new(resolver: DwellResolver, strategy: WriteStrategy) -> Self {
        Self {
            resolver,
            strategy: std::sync::Arc::new(strategy),
        }
    }

    /// Recorder over a single store with the default write strategy
    pub fn for_storage(storage: &TrailStorage) -> Self {
        Self::new(
            DwellResolver::new(storage.clone()),
            WriteStrategy::for_storage(storage),
        )
    }

    /// Record a status transition
    ///
    /// Resolves the order's previous event, derives the dwell in the prior
    /// state and appends an event carrying the complete before/after
    /// snapshot of both status dimensions (an unchanged dimension keeps
    /// before == after). No lock spans the resolve and the append: two
    /// concurrent recorders may measure their dwell from the same previous
    /// event, which is accepted.
    pub async fn record_transition(&self, input: NewTransition) -> RecordResult<RecordOutcome> {
        // Best-effort resolution: a failed read must not lose the entry,
        // the event is simply recorded without previous state.
        let previous = match self.resolver.resolve_previous(&input.order_id) {
            Ok(prev) => prev,
            Err(err) => {
                tracing::warn!(
                    order_id = %input.order_id,
                    error = %err,
                    "Previous-event resolution failed, recording without dwell"
                );
                None
            }
        };

        let now = shared::util::now_millis();
        let dwell_duration = DwellResolver::dwell_since(previous.as_ref(), now);

        if let Some(ctx) = &input.context {
            tracing::debug!(
                order_id = %input.order_id,
                ip = ctx.ip_address.as_deref().unwrap_or("-"),
                client = ctx.client_info.as_deref().unwrap_or("-"),
                "Transition caller context"
            );
        }

        let event = TransitionEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence: 0, // assigned by the store
            order_id: input.order_id,
            tenant_id: input.tenant_id,
            previous_status: previous.as_ref().map(|p| p.new_status),
            new_status: input.new_status,
            previous_technical_status: previous.as_ref().map(|p| p.new_technical_status),
            new_technical_status: input.new_technical_status,
            actor_id: input.actor.id.clone(),
            actor_name: input.actor.display_name(),
            reason: input.reason,
            notes: input.notes,
            dwell_duration,
            created_at: now,
            origin: input.origin,
        };

        let (event, path) = self.strategy.commit_transition(event).await?;

        tracing::debug!(
            order_id = %event.order_id,
            sequence = event.sequence,
            status = %event.new_status,
            path = ?path,
            "Transition recorded"
        );

        Ok(RecordOutcome { event, path })
    }

    /// Record a generic action entry
    pub async fn record_action(&self, input: NewAction) -> RecordResult<(ActionEvent, WritePath)> {
        let context = input.context.unwrap_or_default();

        let event = ActionEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence: 0, // assigned by the store
            order_id: input.order_id,
            tenant_id: input.tenant_id,
            kind: input.kind,
            category: input.category,
            description: input.description,
            detail: input.detail,
            field_changed: input.field_changed,
            previous_value: input.previous_value,
            new_value: input.new_value,
            actor_id: input.actor.id.clone(),
            actor_name: input.actor.display_name(),
            actor_role: input.actor.role.clone(),
            reason: input.reason,
            notes: input.notes,
            created_at: shared::util::now_millis(),
            origin: input.origin,
            ip_address: context.ip_address,
            client_info: context.client_info,
        };

        let (event, path) = self.strategy.commit_action(event).await?;

        tracing::debug!(
            order_id = %event.order_id,
            sequence = event.sequence,
            kind = %event.kind,
            path = ?path,
            "Action recorded"
        );

        Ok((event, path))
    }

    // ========== Convenience wrappers ==========
    //
    // Each pre-fills kind/category/description conventions and delegates to
    // the generic action path.

    /// Status change as a generic action entry
    #[allow(clippy::too_many_arguments)]
    pub async fn record_status_change(
        &self,
        tenant_id: impl Into<String>,
        order_id: impl Into<String>,
        previous: Option<OrderStatus>,
        new: OrderStatus,
        actor: Actor,
        origin: Origin,
        context: Option<RequestContext>,
    ) -> RecordResult<(ActionEvent, WritePath)> {
        let description = match previous {
            Some(prev) => format!("Status alterado de {} para {}", prev, new),
            None => format!("Ordem aberta com status {}", new),
        };
        self.record_action(NewAction {
            tenant_id: tenant_id.into(),
            order_id: order_id.into(),
            kind: ActionKind::StatusChange,
            category: ActionCategory::Status,
            description,
            detail: serde_json::json!({
                "previous_status": previous.map(|s| s.to_string()),
                "new_status": new.to_string(),
            }),
            field_changed: Some("status".into()),
            previous_value: previous.map(|s| s.to_string()),
            new_value: Some(new.to_string()),
            actor,
            reason: None,
            notes: None,
            origin,
            context,
        })
        .await
    }

    /// Attachment upload as a generic action entry
    pub async fn record_attachment_added(
        &self,
        tenant_id: impl Into<String>,
        order_id: impl Into<String>,
        file_name: impl Into<String>,
        actor: Actor,
        origin: Origin,
        context: Option<RequestContext>,
    ) -> RecordResult<(ActionEvent, WritePath)> {
        let file_name = file_name.into();
        self.record_action(NewAction {
            tenant_id: tenant_id.into(),
            order_id: order_id.into(),
            kind: ActionKind::ImageUpload,
            category: ActionCategory::Anexos,
            description: format!("Anexo adicionado: {}", file_name),
            detail: serde_json::json!({ "file_name": file_name }),
            field_changed: None,
            previous_value: None,
            new_value: None,
            actor,
            reason: None,
            notes: None,
            origin,
            context,
        })
        .await
    }

    /// Scalar field edit as a generic action entry
    #[allow(clippy::too_many_arguments)]
    pub async fn record_value_change(
        &self,
        tenant_id: impl Into<String>,
        order_id: impl Into<String>,
        field: impl Into<String>,
        previous_value: impl Into<String>,
        new_value: impl Into<String>,
        actor: Actor,
        origin: Origin,
        context: Option<RequestContext>,
    ) -> RecordResult<(ActionEvent, WritePath)> {
        let field = field.into();
        let previous_value = previous_value.into();
        let new_value = new_value.into();
        self.record_action(NewAction {
            tenant_id: tenant_id.into(),
            order_id: order_id.into(),
            kind: ActionKind::ValueChange,
            category: ActionCategory::Financeiro,
            description: format!("{} alterado de {} para {}", field, previous_value, new_value),
            detail: serde_json::Value::Null,
            field_changed: Some(field),
            previous_value: Some(previous_value),
            new_value: Some(new_value),
            actor,
            reason: None,
            notes: None,
            origin,
            context,
        })
        .await
    }

    /// Delivery to the customer as a generic action entry
    pub async fn record_delivery(
        &self,
        tenant_id: impl Into<String>,
        order_id: impl Into<String>,
        recipient: Option<String>,
        actor: Actor,
        origin: Origin,
        context: Option<RequestContext>,
    ) -> RecordResult<(ActionEvent, WritePath)> {
        let description = match &recipient {
            Some(name) => format!("Ordem entregue a {}", name),
            None => "Ordem entregue".to_string(),
        };
        self.record_action(NewAction {
            tenant_id: tenant_id.into(),
            order_id: order_id.into(),
            kind: ActionKind::Delivery,
            category: ActionCategory::Entrega,
            description,
            detail: serde_json::json!({ "recipient": recipient }),
            field_changed: None,
            previous_value: None,
            new_value: None,
            actor,
            reason: None,
            notes: None,
            origin,
            context,
        })
        .await
    }
}
