//! Two-step write strategy: validated primary, direct fallback
//!
//! Appends go through an explicit strategy object instead of nested error
//! handling, so both paths stay independently testable:
//!
//! - [`ValidatedWriter`] re-validates tenant ownership against the order
//!   registry before appending (the privileged path).
//! - [`DirectWriter`] appends the same payload without validation (the
//!   degraded path for when the primary is unavailable).
//!
//! The fallback fires only for transient failures. Validation rejections
//! (missing order, tenant mismatch) can never succeed on retry and are
//! returned to the caller immediately.

use super::storage::{TrailStorage, TrailStoreError, TrailStoreResult};
use async_trait::async_trait;
use shared::trail::{ActionEvent, TransitionEvent};
use std::sync::Arc;

/// Which path durably recorded an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePath {
    Primary,
    Fallback,
}

/// Append seam for trail events
#[async_trait]
pub trait TrailWriter: Send + Sync {
    async fn append_transition(&self, event: TransitionEvent) -> TrailStoreResult<TransitionEvent>;
    async fn append_action(&self, event: ActionEvent) -> TrailStoreResult<ActionEvent>;
}

/// Privileged path: re-validates tenant ownership, then appends
pub struct ValidatedWriter {
    storage: TrailStorage,
}

impl ValidatedWriter {
    pub fn new(storage: TrailStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl TrailWriter for ValidatedWriter {
    async fn append_transition(&self, event: TransitionEvent) -> TrailStoreResult<TransitionEvent> {
        self.storage.check_ownership(&event.order_id, &event.tenant_id)?;
        self.storage.append_transition(event)
    }

    async fn append_action(&self, event: ActionEvent) -> TrailStoreResult<ActionEvent> {
        self.storage.check_ownership(&event.order_id, &event.tenant_id)?;
        self.storage.append_action(event)
    }
}

/// Degraded path: appends the same payload without validation
///
/// Used only after the primary failed transiently; losing the trail entry
/// entirely would be worse than recording it unvalidated.
pub struct DirectWriter {
    storage: TrailStorage,
}

impl DirectWriter {
    pub fn new(storage: TrailStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl TrailWriter for DirectWriter {
    async fn append_transition(&self, event: TransitionEvent) -> TrailStoreResult<TransitionEvent> {
        self.storage.append_transition(event)
    }

    async fn append_action(&self, event: ActionEvent) -> TrailStoreResult<ActionEvent> {
        self.storage.append_action(event)
    }
}

/// Primary writer plus its degraded fallback
pub struct WriteStrategy {
    primary: Arc<dyn TrailWriter>,
    fallback: Arc<dyn TrailWriter>,
}

impl WriteStrategy {
    pub fn new(primary: Arc<dyn TrailWriter>, fallback: Arc<dyn TrailWriter>) -> Self {
        Self { primary, fallback }
    }

    /// Default pairing over a single store: validated primary, direct fallback
    pub fn for_storage(storage: &TrailStorage) -> Self {
        Self::new(
            Arc::new(ValidatedWriter::new(storage.clone())),
            Arc::new(DirectWriter::new(storage.clone())),
        )
    }

    /// Append a transition through the primary, falling back when transient
    pub async fn commit_transition(
        &self,
        event: TransitionEvent,
    ) -> TrailStoreResult<(TransitionEvent, WritePath)> {
        match self.primary.append_transition(event.clone()).await {
            Ok(stored) => Ok((stored, WritePath::Primary)),
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    order_id = %event.order_id,
                    error = %err,
                    "Primary trail write failed, using fallback path"
                );
                match self.fallback.append_transition(event).await {
                    Ok(stored) => Ok((stored, WritePath::Fallback)),
                    Err(fallback_err) => {
                        tracing::error!(
                            primary_error = %err,
                            fallback_error = %fallback_err,
                            "Both trail write paths failed, entry lost"
                        );
                        Err(fallback_err)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Append an action through the primary, falling back when transient
    pub async fn commit_action(
        &self,
        event: ActionEvent,
    ) -> TrailStoreResult<(ActionEvent, WritePath)> {
        match self.primary.append_action(event.clone()).await {
            Ok(stored) => Ok((stored, WritePath::Primary)),
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    order_id = %event.order_id,
                    error = %err,
                    "Primary trail write failed, using fallback path"
                );
                match self.fallback.append_action(event).await {
                    Ok(stored) => Ok((stored, WritePath::Fallback)),
                    Err(fallback_err) => {
                        tracing::error!(
                            primary_error = %err,
                            fallback_error = %fallback_err,
                            "Both trail write paths failed, entry lost"
                        );
                        Err(fallback_err)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }
}
