//! Shared types for the repair-shop order trail
//!
//! Common types used by the trail engine and by the collaborators that feed
//! it (order mutation flow) or render its output (timeline view):
//! status enums, actor/request context types and the persisted event records.

pub mod actor;
pub mod status;
pub mod trail;
pub mod util;

// Re-exports
pub use actor::{Actor, Origin, RequestContext, SYSTEM_ACTOR_NAME};
pub use serde::{Deserialize, Serialize};
pub use status::{OrderStatus, StatusParseError, TechnicalStatus};
pub use trail::{ActionCategory, ActionEvent, ActionKind, TransitionEvent};
