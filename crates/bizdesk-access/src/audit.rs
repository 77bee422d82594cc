//! ---
//! bizdesk_section: "06-security-access-control"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Roles, permissions, policy, and authorization decisions."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::{AccessDecision, DenyReason, GrantReason};
use crate::role::Role;

/// Outcome label persisted with each audited decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecisionOutcome {
    /// Allowed through role membership.
    Granted,
    /// Allowed through the ownership relaxation.
    GrantedAsOwner,
    /// Denied: role not authorised.
    Denied,
    /// Denied: the permission has no policy entry. Audited distinctly so a
    /// typo or missing entry shows up in review, not just in logs.
    UnknownPermission,
}

impl DecisionOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Granted => "granted",
            DecisionOutcome::GrantedAsOwner => "granted-as-owner",
            DecisionOutcome::Denied => "denied",
            DecisionOutcome::UnknownPermission => "unknown-permission",
        }
    }
}

impl From<&AccessDecision> for DecisionOutcome {
    fn from(decision: &AccessDecision) -> Self {
        match decision {
            AccessDecision::Granted(GrantReason::RoleMembership) => DecisionOutcome::Granted,
            AccessDecision::Granted(GrantReason::Ownership) => DecisionOutcome::GrantedAsOwner,
            AccessDecision::Denied(DenyReason::RoleNotAuthorized) => DecisionOutcome::Denied,
            AccessDecision::Denied(DenyReason::UnknownPermission) => {
                DecisionOutcome::UnknownPermission
            }
        }
    }
}

/// One audited authorization decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRecord {
    /// Timestamp when the decision was made.
    pub timestamp: DateTime<Utc>,
    /// User the decision was made for.
    pub actor: String,
    /// Role the actor held.
    pub role: Role,
    /// Permission that was requested.
    pub permission: String,
    /// How the request was decided.
    pub outcome: DecisionOutcome,
    /// Additional context serialized as JSON (resource ids, request ids).
    pub detail: serde_json::Value,
    /// SHA-256 hash of the record contents and previous hash.
    pub hash: String,
    /// Hash of the previous record (or zero string for the first record).
    pub previous_hash: String,
}

impl DecisionRecord {
    fn compute_hash(
        timestamp: DateTime<Utc>,
        actor: &str,
        role: Role,
        permission: &str,
        outcome: DecisionOutcome,
        detail: &serde_json::Value,
        previous_hash: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(
            timestamp
                .timestamp_nanos_opt()
                .unwrap_or_default()
                .to_be_bytes(),
        );
        hasher.update(actor.as_bytes());
        hasher.update(role.as_str().as_bytes());
        hasher.update(permission.as_bytes());
        hasher.update(outcome.as_str().as_bytes());
        hasher.update(detail.to_string().as_bytes());
        hasher.update(previous_hash.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Decision audit trail backed by a newline-delimited JSON file.
///
/// Records are hash-chained so tampering with a persisted decision (or
/// removing one) is detectable by [`DecisionLog::verify`].
#[derive(Debug, Clone)]
pub struct DecisionLog {
    path: PathBuf,
    last_hash: String,
}

impl DecisionLog {
    /// Open a decision log at the given path. Existing records are loaded to
    /// determine the head hash.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut log = Self {
            path: path.clone(),
            last_hash: "0".repeat(64),
        };
        if path.exists() {
            for line in BufReader::new(fs::File::open(&path)?).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: DecisionRecord = serde_json::from_str(&line)?;
                log.last_hash = record.hash.clone();
            }
        }
        Ok(log)
    }

    /// Append an audited decision to the log.
    pub fn record(
        &mut self,
        actor: &str,
        role: Role,
        permission: &str,
        decision: &AccessDecision,
        detail: serde_json::Value,
    ) -> Result<DecisionRecord> {
        let timestamp = Utc::now();
        let outcome = DecisionOutcome::from(decision);
        let hash = DecisionRecord::compute_hash(
            timestamp,
            actor,
            role,
            permission,
            outcome,
            &detail,
            &self.last_hash,
        );
        let record = DecisionRecord {
            timestamp,
            actor: actor.to_string(),
            role,
            permission: permission.to_string(),
            outcome,
            detail,
            hash: hash.clone(),
            previous_hash: self.last_hash.clone(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("unable to open decision log {}", self.path.display()))?;
        file.write_all(serde_json::to_string(&record)?.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        self.last_hash = hash;
        Ok(record)
    }

    /// Verify integrity of the log (detect tampering).
    pub fn verify(&self) -> Result<bool> {
        let mut previous = "0".repeat(64);
        if !self.path.exists() {
            return Ok(true);
        }
        for line in BufReader::new(fs::File::open(&self.path)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: DecisionRecord = serde_json::from_str(&line)?;
            let expected = DecisionRecord::compute_hash(
                record.timestamp,
                &record.actor,
                record.role,
                &record.permission,
                record.outcome,
                &record.detail,
                &previous,
            );
            if expected != record.hash {
                return Ok(false);
            }
            previous = record.hash;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AccessEngine;
    use std::io::{Read, Seek, SeekFrom};
    use tempfile::tempdir;

    fn record_decisions(log: &mut DecisionLog) {
        let engine = AccessEngine::with_builtin_policy();
        let allowed = engine.evaluate(Role::Admin, "admin:access", None);
        log.record(
            "user-1",
            Role::Admin,
            "admin:access",
            &allowed,
            serde_json::json!({"request": 1}),
        )
        .unwrap();
        let denied = engine.evaluate(Role::Guest, "task:create", None);
        log.record(
            "user-2",
            Role::Guest,
            "task:create",
            &denied,
            serde_json::json!({"request": 2}),
        )
        .unwrap();
    }

    #[test]
    fn decision_log_detects_tampering() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decisions.log");
        let mut log = DecisionLog::new(&path).unwrap();
        record_decisions(&mut log);
        assert!(log.verify().unwrap());

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        let mut records: Vec<serde_json::Value> = contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        // Rewrite history: the guest's denial becomes a grant.
        records[1]["outcome"] = serde_json::json!("granted");
        file.set_len(0).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        for value in records {
            file.write_all(value.to_string().as_bytes()).unwrap();
            file.write_all(b"\n").unwrap();
        }
        assert!(!DecisionLog::new(&path).unwrap().verify().unwrap());
    }

    #[test]
    fn chain_continues_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decisions.log");
        let mut log = DecisionLog::new(&path).unwrap();
        record_decisions(&mut log);

        let mut reopened = DecisionLog::new(&path).unwrap();
        let engine = AccessEngine::with_builtin_policy();
        let unknown = engine.evaluate(Role::Admin, "no:such:permission", None);
        let record = reopened
            .record(
                "user-1",
                Role::Admin,
                "no:such:permission",
                &unknown,
                serde_json::Value::Null,
            )
            .unwrap();
        assert_eq!(record.outcome, DecisionOutcome::UnknownPermission);
        assert!(reopened.verify().unwrap());
    }
}
