//! ---
//! bizdesk_section: "06-security-access-control"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Roles, permissions, policy, and authorization decisions."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
#![warn(missing_docs)]

pub mod audit;
pub mod engine;
pub mod metrics;
pub mod permission;
pub mod policy;
pub mod profile;
pub mod role;

pub use audit::{DecisionLog, DecisionOutcome, DecisionRecord};
pub use engine::{AccessDecision, AccessEngine, DenyReason, GrantReason, RoleGrants};
pub use metrics::AccessMetrics;
pub use permission::Permission;
pub use policy::{PolicyEntry, PolicyError, PolicyTable};
pub use profile::{Profile, ProfileDirectory, ProfileError};
pub use role::{Role, RoleParseError};
