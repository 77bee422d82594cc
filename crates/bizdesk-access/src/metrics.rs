//! ---
//! bizdesk_section: "06-security-access-control"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Roles, permissions, policy, and authorization decisions."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use prometheus::{IntCounter, Registry};
use std::sync::Arc;

use crate::engine::{AccessDecision, DenyReason, GrantReason};

/// Access-control metrics exported via Prometheus.
///
/// The engine itself stays pure; callers feed decisions through
/// [`AccessMetrics::observe`] after each evaluation.
#[derive(Clone)]
pub struct AccessMetrics {
    registry: Arc<Registry>,
    decisions_total: IntCounter,
    denials_total: IntCounter,
    owner_grants_total: IntCounter,
    unknown_permission_total: IntCounter,
}

impl AccessMetrics {
    /// Register metrics with the provided registry.
    pub fn new(registry: Arc<Registry>) -> anyhow::Result<Self> {
        let decisions_total =
            IntCounter::new("access_decisions_total", "Total authorization decisions")?;
        let denials_total =
            IntCounter::new("access_denials_total", "Access denials due to policy")?;
        let owner_grants_total = IntCounter::new(
            "access_owner_grants_total",
            "Grants that required the ownership relaxation",
        )?;
        let unknown_permission_total = IntCounter::new(
            "access_unknown_permission_total",
            "Denials caused by permissions missing from the policy table",
        )?;

        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(denials_total.clone()))?;
        registry.register(Box::new(owner_grants_total.clone()))?;
        registry.register(Box::new(unknown_permission_total.clone()))?;

        Ok(Self {
            registry,
            decisions_total,
            denials_total,
            owner_grants_total,
            unknown_permission_total,
        })
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record one decision outcome.
    pub fn observe(&self, decision: &AccessDecision) {
        self.decisions_total.inc();
        match decision {
            AccessDecision::Granted(GrantReason::RoleMembership) => {}
            AccessDecision::Granted(GrantReason::Ownership) => {
                self.owner_grants_total.inc();
            }
            AccessDecision::Denied(DenyReason::RoleNotAuthorized) => {
                self.denials_total.inc();
            }
            AccessDecision::Denied(DenyReason::UnknownPermission) => {
                self.denials_total.inc();
                self.unknown_permission_total.inc();
            }
        }
    }
}
