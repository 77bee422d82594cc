//! ---
//! bizdesk_section: "06-security-access-control"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Roles, permissions, policy, and authorization decisions."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::permission::Permission;
use crate::policy::PolicyTable;
use crate::role::Role;

/// Why a decision granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantReason {
    /// The role is a member of the permission's authorised set.
    RoleMembership,
    /// The permission carries an owner check and the requester owns the resource.
    Ownership,
}

/// Why a decision denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The role is not authorised and no ownership fact rescued the request.
    RoleNotAuthorized,
    /// The permission has no policy entry. A missing entry is a programmer or
    /// configuration error, so it fails closed and is reported distinctly.
    UnknownPermission,
}

/// Structured verdict returned by [`AccessEngine::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The request is allowed.
    Granted(GrantReason),
    /// The request is denied. A deny is a normal outcome, not an error.
    Denied(DenyReason),
}

impl AccessDecision {
    /// Whether the decision allows the request.
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted(_))
    }

    /// Stable label used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessDecision::Granted(GrantReason::RoleMembership) => "granted",
            AccessDecision::Granted(GrantReason::Ownership) => "granted-as-owner",
            AccessDecision::Denied(DenyReason::RoleNotAuthorized) => "denied",
            AccessDecision::Denied(DenyReason::UnknownPermission) => "unknown-permission",
        }
    }
}

impl std::fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialisable projection of a role's full permission set.
///
/// Intended for introspection surfaces (UI gating); never authoritative. Every
/// sensitive action must still go through [`AccessEngine::is_allowed`].
#[derive(Debug, Clone, Serialize)]
pub struct RoleGrants {
    /// The role the projection was computed for.
    pub role: Role,
    /// Every permission the role may exercise without an ownership fact.
    pub permissions: BTreeSet<Permission>,
}

/// Authorization decision engine.
///
/// Stateless per call over an injected immutable [`PolicyTable`]; safe to
/// share across threads by reference. Performs no I/O: ownership facts are
/// always computed by the caller and passed in.
#[derive(Debug, Clone)]
pub struct AccessEngine {
    table: PolicyTable,
}

impl Default for AccessEngine {
    fn default() -> Self {
        Self::with_builtin_policy()
    }
}

impl AccessEngine {
    /// Build an engine over the given policy table.
    pub fn new(table: PolicyTable) -> Self {
        Self { table }
    }

    /// Build an engine over the built-in permission table.
    pub fn with_builtin_policy() -> Self {
        Self::new(PolicyTable::builtin())
    }

    /// The policy table the engine decides against.
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Decide whether `role` may exercise `permission`, optionally given an
    /// ownership fact, and say why.
    ///
    /// Total over its inputs: never panics, never errors. An undefined
    /// permission denies (fail-closed) and emits a warning so the missing
    /// entry can be fixed rather than silently tolerated.
    pub fn evaluate(
        &self,
        role: Role,
        permission: &str,
        is_owner: Option<bool>,
    ) -> AccessDecision {
        let Some(entry) = self.table.entry(permission) else {
            warn!(permission, %role, "permission missing from policy table; denying");
            return AccessDecision::Denied(DenyReason::UnknownPermission);
        };
        if entry.roles.contains(&role) {
            return AccessDecision::Granted(GrantReason::RoleMembership);
        }
        if entry.owner_check && is_owner == Some(true) {
            return AccessDecision::Granted(GrantReason::Ownership);
        }
        AccessDecision::Denied(DenyReason::RoleNotAuthorized)
    }

    /// Boolean form of [`AccessEngine::evaluate`].
    pub fn is_allowed(&self, role: Role, permission: &str, is_owner: Option<bool>) -> bool {
        self.evaluate(role, permission, is_owner).is_granted()
    }

    /// Decide with a lazily-resolved ownership fact.
    ///
    /// The resolver runs only when role membership fails and the permission
    /// carries an owner check, so callers never fetch ownership facts the
    /// decision does not need.
    pub fn is_allowed_or_owner<F>(&self, role: Role, permission: &str, resolve: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        match self.evaluate(role, permission, None) {
            AccessDecision::Granted(_) => true,
            AccessDecision::Denied(DenyReason::UnknownPermission) => false,
            AccessDecision::Denied(DenyReason::RoleNotAuthorized) => match self
                .table
                .entry(permission)
            {
                Some(entry) if entry.owner_check => resolve(),
                _ => false,
            },
        }
    }

    /// Every permission `role` may exercise without an ownership fact.
    ///
    /// Derived by scanning the table, never stored. Agrees with
    /// [`AccessEngine::is_allowed`] by construction and is only a read-only
    /// projection; the authoritative decision always goes through the engine.
    pub fn permissions_for(&self, role: Role) -> BTreeSet<Permission> {
        self.table
            .iter()
            .filter(|(_, entry)| entry.roles.contains(&role))
            .map(|(permission, _)| permission.clone())
            .collect()
    }

    /// Introspection projection of [`AccessEngine::permissions_for`].
    pub fn grants_for(&self, role: Role) -> RoleGrants {
        RoleGrants {
            role,
            permissions: self.permissions_for(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::known;
    use crate::policy::PolicyTable;
    use std::cell::Cell;

    fn engine() -> AccessEngine {
        AccessEngine::with_builtin_policy()
    }

    #[test]
    fn admin_reaches_the_admin_area() {
        assert!(engine().is_allowed(Role::Admin, "admin:access", None));
    }

    #[test]
    fn guest_cannot_create_tasks() {
        assert!(!engine().is_allowed(Role::Guest, "task:create", None));
    }

    #[test]
    fn staff_updates_tasks_regardless_of_ownership() {
        let engine = engine();
        assert!(engine.is_allowed(Role::Staff, "task:update", Some(false)));
        assert!(engine.is_allowed(Role::Staff, "task:update", Some(true)));
    }

    #[test]
    fn client_cannot_delete_customers() {
        assert!(!engine().is_allowed(Role::Client, "customer:delete", None));
    }

    #[test]
    fn guest_grants_match_the_builtin_table() {
        let grants = engine().permissions_for(Role::Guest);
        let expected: BTreeSet<Permission> = [
            known::BUSINESS_READ,
            known::PROFILE_READ,
            known::TASK_READ,
            known::CUSTOMER_READ,
            known::FORM_READ,
            known::FORM_SUBMIT,
            known::REMINDER_READ,
            known::NOTIFICATION_READ,
            known::NOTIFICATION_MANAGE,
        ]
        .into_iter()
        .collect();
        assert_eq!(grants, expected);
    }

    #[test]
    fn unknown_permission_fails_closed_even_for_admin() {
        let engine = engine();
        for role in Role::ALL {
            assert_eq!(
                engine.evaluate(role, "totally:undefined:permission", None),
                AccessDecision::Denied(DenyReason::UnknownPermission)
            );
            assert!(!engine.is_allowed(role, "no:such:permission", Some(true)));
        }
    }

    #[test]
    fn every_decision_terminates_with_a_verdict() {
        let engine = engine();
        for role in Role::ALL {
            for permission in engine.table().permissions() {
                for is_owner in [None, Some(false), Some(true)] {
                    let _ = engine.is_allowed(role, permission.as_str(), is_owner);
                }
            }
        }
    }

    #[test]
    fn ownership_never_revokes_a_grant() {
        let engine = engine();
        for role in Role::ALL {
            for permission in engine.table().permissions() {
                if engine.is_allowed(role, permission.as_str(), Some(false)) {
                    assert!(
                        engine.is_allowed(role, permission.as_str(), Some(true)),
                        "{role} lost {permission} by owning the resource"
                    );
                }
            }
        }
    }

    #[test]
    fn ownership_grant_requires_the_owner_check_flag() {
        let engine = engine();
        // task:delete has no owner check: owning the task must not help a guest.
        assert!(!engine.is_allowed(Role::Guest, "task:delete", Some(true)));
        // task:update has one: a client owning the task is let through.
        assert_eq!(
            engine.evaluate(Role::Client, "task:update", Some(true)),
            AccessDecision::Granted(GrantReason::Ownership)
        );
    }

    #[test]
    fn permission_listing_agrees_with_decisions() {
        let engine = engine();
        for role in Role::ALL {
            let listed = engine.permissions_for(role);
            for permission in engine.table().permissions() {
                assert_eq!(
                    listed.contains(permission),
                    engine.is_allowed(role, permission.as_str(), None),
                    "{role} and {permission} disagree between listing and decision"
                );
            }
        }
    }

    #[test]
    fn admin_holds_every_staff_permission() {
        // Data-driven check over the concrete table, not a structural rule.
        let engine = engine();
        for (permission, entry) in engine.table().iter() {
            if entry.roles.contains(&Role::Staff) {
                assert!(
                    entry.roles.contains(&Role::Admin),
                    "{permission} grants staff but not admin"
                );
            }
        }
    }

    #[test]
    fn resolver_runs_only_when_the_decision_needs_it() {
        let engine = engine();

        let resolved = Cell::new(false);
        assert!(engine.is_allowed_or_owner(Role::Staff, "task:update", || {
            resolved.set(true);
            true
        }));
        assert!(!resolved.get(), "authorised role must not trigger a lookup");

        let resolved = Cell::new(false);
        assert!(engine.is_allowed_or_owner(Role::Client, "task:update", || {
            resolved.set(true);
            true
        }));
        assert!(resolved.get());

        // No owner check on the entry: resolver is never consulted.
        let resolved = Cell::new(false);
        assert!(!engine.is_allowed_or_owner(Role::Guest, "task:delete", || {
            resolved.set(true);
            true
        }));
        assert!(!resolved.get());
    }

    #[test]
    fn custom_policy_tables_are_honoured() {
        let table = PolicyTable::from_toml_str(
            r#"
            [permissions."report:read"]
            roles = ["guest"]
            "#,
        )
        .unwrap();
        let engine = AccessEngine::new(table);
        assert!(engine.is_allowed(Role::Guest, "report:read", None));
        // Built-in permissions are gone once a custom table is injected.
        assert!(!engine.is_allowed(Role::Admin, "admin:access", None));
    }

    #[test]
    fn grants_projection_serialises_for_introspection() {
        let grants = engine().grants_for(Role::Client);
        let json = serde_json::to_value(&grants).unwrap();
        assert_eq!(json["role"], "client");
        assert!(json["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p == "form:submit"));
    }
}
