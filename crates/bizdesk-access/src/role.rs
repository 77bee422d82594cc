//! ---
//! bizdesk_section: "06-security-access-control"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Roles, permissions, policy, and authorization decisions."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role held by a user within one business.
///
/// Exactly one role is assigned per user-in-business context. The informal
/// hierarchy (admin over staff over guest) is never computed transitively:
/// every permission in the policy table lists every role allowed to hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control over the business, including settings and user management.
    Admin,
    /// Manages day-to-day records (tasks, customers, forms) but not business settings.
    Staff,
    /// Read-only access; the role assigned before a user joins a business.
    Guest,
    /// External customer-portal access.
    Client,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Staff, Role::Guest, Role::Client];

    /// Lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Guest => "guest",
            Role::Client => "client",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced when a stored role value is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised role '{0}'")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    /// The single validation boundary for untrusted role strings. Everything
    /// past this point operates on the closed enum.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "guest" => Ok(Role::Guest),
            "client" => Ok(Role::Client),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_every_wire_name() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn rejects_values_outside_the_closed_set() {
        for raw in ["superuser", "ADMIN", "", "owner"] {
            assert_eq!(
                Role::from_str(raw),
                Err(RoleParseError(raw.to_owned())),
                "{raw:?} must not parse"
            );
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
        let role: Role = serde_json::from_str("\"staff\"").unwrap();
        assert_eq!(role, Role::Staff);
    }
}
