//! ---
//! bizdesk_section: "15-testing-qa-runbook"
//! bizdesk_subsection: "integration-tests"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Integration and validation tests for the BizDesk stack."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use std::fs;
use std::str::FromStr;

use bizdesk_access::engine::AccessEngine;
use bizdesk_access::role::Role;
use bizdesk_common::config::AppConfig;
use bizdesk_config::{effective_policy, load_active_manifest, DeploymentManifest};
use tempfile::tempdir;

fn sample_config(policy_path: Option<&std::path::Path>) -> AppConfig {
    let mut raw = String::from(
        r#"
        mode = "demo"

        [businesses.acme-plumbing]
        name = "Acme Plumbing"
        owner = "user-founder"

        [businesses.acme-plumbing.members]
        "user-staff" = "staff"
        "#,
    );
    if let Some(path) = policy_path {
        raw.push_str(&format!(
            "\n[access]\npolicy_path = \"{}\"\n",
            path.display()
        ));
    }
    AppConfig::from_str(&raw).unwrap()
}

#[test]
fn manifest_lifecycle_persists_and_reloads() {
    let root = tempdir().unwrap();
    let manifest = DeploymentManifest::new("Acme Production", sample_config(None)).unwrap();
    let persisted = manifest.persist(root.path()).unwrap();

    let active = load_active_manifest(root.path()).unwrap().unwrap();
    assert_eq!(active.deployment.slug, "acme-production");
    assert_eq!(active.deployment.config_hash, persisted.config_hash());
    assert!(active.app.mode.is_demo());

    let business = active.app.business("acme-plumbing").unwrap();
    assert_eq!(business.owner, "user-founder");
    assert_eq!(business.members.get("user-staff"), Some(&Role::Staff));
}

#[test]
fn policy_override_flows_into_the_engine() {
    let root = tempdir().unwrap();
    let policy_path = root.path().join("policy.toml");
    fs::write(
        &policy_path,
        r#"
        [permissions."task:read"]
        roles = ["admin"]

        [permissions."task:update"]
        roles = ["admin"]
        owner_check = true
        "#,
    )
    .unwrap();

    let config = sample_config(Some(&policy_path));
    let engine = AccessEngine::new(effective_policy(&config).unwrap());

    // The override drops staff from task:read entirely.
    assert!(!engine.is_allowed(Role::Staff, "task:read", None));
    assert!(engine.is_allowed(Role::Admin, "task:read", None));
    // Built-in permissions are absent from the overridden table.
    assert!(!engine.is_allowed(Role::Admin, "admin:access", None));
    // Ownership relaxation still applies to the overridden entry.
    assert!(engine.is_allowed(Role::Staff, "task:update", Some(true)));
}

#[test]
fn deployments_with_different_policies_have_different_digests() {
    let root = tempdir().unwrap();
    let policy_path = root.path().join("policy.toml");
    fs::write(
        &policy_path,
        "[permissions.\"task:read\"]\nroles = [\"admin\"]\n",
    )
    .unwrap();

    let builtin = DeploymentManifest::new("Builtin", sample_config(None)).unwrap();
    let overridden =
        DeploymentManifest::new("Overridden", sample_config(Some(&policy_path))).unwrap();

    assert_ne!(
        builtin.deployment.policy_hash,
        overridden.deployment.policy_hash
    );
    assert_ne!(
        builtin.deployment.config_hash,
        overridden.deployment.config_hash
    );
}
