//! Actor attribution and request context
//!
//! Every trail event is attributed to an actor. Flows without an
//! authenticated operator (automations, retries, startup repairs) fall back
//! to the "System" sentinel instead of failing.

use serde::{Deserialize, Serialize};

/// Display name recorded when no authenticated actor is available
pub const SYSTEM_ACTOR_NAME: &str = "System";

/// Who performed an action
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    /// Operator ID (None for system-originated events)
    pub id: Option<String>,
    /// Operator name (snapshot for the trail)
    pub name: Option<String>,
    /// Operator role at the time of the action
    pub role: Option<String>,
}

impl Actor {
    /// Actor for flows without an authenticated operator
    pub fn system() -> Self {
        Self::default()
    }

    /// Authenticated operator
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            role: None,
        }
    }

    /// Set the operator role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Name recorded on events, defaulting to the "System" sentinel
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(SYSTEM_ACTOR_NAME)
            .to_string()
    }
}

/// Which flow produced an event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Customer-facing portal
    CustomerPortal,
    /// Internal technician/admin panel
    TechnicianPanel,
    /// Automated flow (no interactive operator)
    Automation,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::CustomerPortal => write!(f, "CUSTOMER_PORTAL"),
            Origin::TechnicianPanel => write!(f, "TECHNICIAN_PANEL"),
            Origin::Automation => write!(f, "AUTOMATION"),
        }
    }
}

/// Best-effort caller context attached to generic action entries
///
/// Collection must never block or fail a recording operation; absent fields
/// are simply recorded as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestContext {
    /// Caller network origin
    pub ip_address: Option<String>,
    /// Client identity string (device, app version)
    pub client_info: Option<String>,
}

impl RequestContext {
    /// Set the caller network origin
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Set the client identity string
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client_info = Some(client.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_defaults_to_system() {
        assert_eq!(Actor::system().display_name(), SYSTEM_ACTOR_NAME);
        assert_eq!(
            Actor {
                id: Some("emp:1".into()),
                name: Some("  ".into()),
                role: None
            }
            .display_name(),
            SYSTEM_ACTOR_NAME
        );
        assert_eq!(Actor::named("emp:1", "Carlos").display_name(), "Carlos");
    }
}
