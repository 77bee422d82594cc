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
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permission::Permission;
use crate::role::Role;

/// Policy for one permission: the roles authorised to hold it, plus an
/// optional ownership relaxation.
///
/// `owner_check` only ever relaxes a deny into a conditional allow; the role
/// membership test runs first, so it can never restrict an authorised role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    /// Roles authorised to exercise the permission.
    pub roles: BTreeSet<Role>,
    /// When set, a requester that owns the specific resource instance is
    /// allowed even if its role is not in `roles`.
    #[serde(default)]
    pub owner_check: bool,
}

impl PolicyEntry {
    /// Build an entry from a role slice.
    pub fn new(roles: &[Role], owner_check: bool) -> Self {
        Self {
            roles: roles.iter().copied().collect(),
            owner_check,
        }
    }
}

/// Errors raised while loading or validating a policy table.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Policy file could not be read.
    #[error("unable to read policy file {path}")]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// Policy file is not valid TOML or names a role outside the closed set.
    #[error("failed to parse policy file")]
    Parse(#[from] toml::de::Error),
    /// An entry authorises nobody and carries no owner check.
    #[error("permission '{0}' authorises no role and has no owner check")]
    Unsatisfiable(Permission),
    /// The table defines no permissions at all.
    #[error("policy table contains no permissions")]
    Empty,
}

/// Immutable mapping from permission to [`PolicyEntry`].
///
/// Constructed once at startup (built-in table or a TOML policy file) and
/// injected into the decision engine; never mutated afterwards. Insertion
/// order is preserved for stable display surfaces.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct PolicyTable {
    entries: IndexMap<Permission, PolicyEntry>,
}

/// On-disk shape of a policy override file.
#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    permissions: IndexMap<Permission, PolicyEntry>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PolicyTable {
    /// The built-in permission table for the platform.
    pub fn builtin() -> Self {
        use crate::permission::known::*;
        use Role::*;

        let mut entries = IndexMap::new();
        let mut add = |permission: Permission, roles: &[Role], owner_check: bool| {
            entries.insert(permission, PolicyEntry::new(roles, owner_check));
        };

        // Business management
        add(BUSINESS_READ, &[Admin, Staff, Guest], false);
        add(BUSINESS_UPDATE, &[Admin], false);
        add(BUSINESS_DELETE, &[Admin], false);

        // User/profile management
        add(PROFILE_READ, &[Admin, Staff, Guest, Client], false);
        add(PROFILE_UPDATE, &[Admin, Staff], true);
        add(PROFILE_MANAGE_ALL, &[Admin], false);

        // Task management
        add(TASK_READ, &[Admin, Staff, Guest], false);
        add(TASK_CREATE, &[Admin, Staff], false);
        add(TASK_UPDATE, &[Admin, Staff], true);
        add(TASK_DELETE, &[Admin, Staff], false);

        // Customer management
        add(CUSTOMER_READ, &[Admin, Staff, Guest], false);
        add(CUSTOMER_CREATE, &[Admin, Staff], false);
        add(CUSTOMER_UPDATE, &[Admin, Staff], false);
        add(CUSTOMER_DELETE, &[Admin], false);

        // Form management
        add(FORM_READ, &[Admin, Staff, Guest], false);
        add(FORM_CREATE, &[Admin, Staff], false);
        add(FORM_UPDATE, &[Admin, Staff], false);
        add(FORM_DELETE, &[Admin], false);
        add(FORM_SUBMIT, &[Admin, Staff, Guest, Client], false);

        // Reminder management
        add(REMINDER_READ, &[Admin, Staff, Guest], false);
        add(REMINDER_CREATE, &[Admin, Staff], false);
        add(REMINDER_UPDATE, &[Admin, Staff], true);
        add(REMINDER_DELETE, &[Admin, Staff], true);

        // Notification management
        add(NOTIFICATION_READ, &[Admin, Staff, Guest, Client], false);
        add(NOTIFICATION_MANAGE, &[Admin, Staff, Guest, Client], false);

        // Admin functions
        add(ADMIN_ACCESS, &[Admin], false);
        add(ADMIN_MANAGE_USERS, &[Admin], false);
        add(ADMIN_VIEW_ANALYTICS, &[Admin], false);

        Self { entries }
    }

    /// Parse a policy table from TOML text and validate it.
    pub fn from_toml_str(raw: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = toml::from_str(raw)?;
        let table = Self {
            entries: file.permissions,
        };
        table.validate()?;
        Ok(table)
    }

    /// Load and validate a policy table from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check structural invariants of the table.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.entries.is_empty() {
            return Err(PolicyError::Empty);
        }
        for (permission, entry) in &self.entries {
            if entry.roles.is_empty() && !entry.owner_check {
                return Err(PolicyError::Unsatisfiable(permission.clone()));
            }
        }
        Ok(())
    }

    /// Look up the entry for a permission string.
    pub fn entry(&self, permission: &str) -> Option<&PolicyEntry> {
        self.entries.get(permission)
    }

    /// Iterate over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Permission, &PolicyEntry)> {
        self.entries.iter()
    }

    /// Iterate over all permission identifiers in insertion order.
    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.entries.keys()
    }

    /// Number of permissions defined by the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table defines no permissions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::known;

    #[test]
    fn builtin_table_shape() {
        let table = PolicyTable::builtin();
        assert_eq!(table.len(), 28);
        table.validate().unwrap();

        let entry = table.entry("task:update").unwrap();
        assert!(entry.owner_check);
        assert!(entry.roles.contains(&Role::Staff));
        assert!(!entry.roles.contains(&Role::Guest));

        assert_eq!(
            table.entry("customer:delete").unwrap().roles,
            BTreeSet::from([Role::Admin])
        );
    }

    #[test]
    fn owner_check_is_set_only_where_the_product_defines_it() {
        let table = PolicyTable::builtin();
        let flagged: Vec<&str> = table
            .iter()
            .filter(|(_, entry)| entry.owner_check)
            .map(|(permission, _)| permission.as_str())
            .collect();
        assert_eq!(
            flagged,
            ["profile:update", "task:update", "reminder:update", "reminder:delete"]
        );
    }

    #[test]
    fn parses_policy_file_override() {
        let raw = r#"
            [permissions."task:read"]
            roles = ["admin", "staff"]

            [permissions."task:update"]
            roles = ["admin"]
            owner_check = true
        "#;
        let table = PolicyTable::from_toml_str(raw).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.entry("task:update").unwrap().owner_check);
        assert!(table.entry(known::TASK_READ.as_str()).is_some());
    }

    #[test]
    fn rejects_unsatisfiable_entry() {
        let raw = r#"
            [permissions."task:read"]
            roles = []
        "#;
        match PolicyTable::from_toml_str(raw) {
            Err(PolicyError::Unsatisfiable(permission)) => {
                assert_eq!(permission.as_str(), "task:read");
            }
            other => panic!("expected unsatisfiable entry, got {other:?}"),
        }
    }

    #[test]
    fn owner_only_entry_is_accepted() {
        let raw = r#"
            [permissions."draft:update"]
            roles = []
            owner_check = true
        "#;
        let table = PolicyTable::from_toml_str(raw).unwrap();
        assert!(table.entry("draft:update").unwrap().roles.is_empty());
    }

    #[test]
    fn rejects_unknown_role_name() {
        let raw = r#"
            [permissions."task:read"]
            roles = ["superuser"]
        "#;
        assert!(matches!(
            PolicyTable::from_toml_str(raw),
            Err(PolicyError::Parse(_))
        ));
    }

    #[test]
    fn rejects_empty_policy_file() {
        assert!(matches!(
            PolicyTable::from_toml_str(""),
            Err(PolicyError::Empty)
        ));
    }

    #[test]
    fn loads_policy_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(
            &path,
            "[permissions.\"form:read\"]\nroles = [\"guest\"]\n",
        )
        .unwrap();
        let table = PolicyTable::load(&path).unwrap();
        assert_eq!(table.len(), 1);
    }
}
