//! ---
//! bizdesk_section: "06-security-access-control"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Roles, permissions, policy, and authorization decisions."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier of the form `<resource>:<action>` (e.g. `task:update`).
///
/// Permissions are static and known at deploy time; the decision engine still
/// accepts arbitrary strings at lookup so a typo surfaces as a distinct
/// unknown-permission denial rather than a panic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Wrap a compile-time permission name.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Wrap an owned or borrowed permission name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The full `<resource>:<action>` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The resource half of the identifier (`task` in `task:update`).
    pub fn resource(&self) -> &str {
        self.as_str().split(':').next().unwrap_or_default()
    }

    /// The action half of the identifier (`update` in `task:update`).
    pub fn action(&self) -> &str {
        match self.as_str().split_once(':') {
            Some((_, action)) => action,
            None => "",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// Named constants for every permission in the built-in policy table.
pub mod known {
    use super::Permission;

    /// View business details.
    pub const BUSINESS_READ: Permission = Permission::from_static("business:read");
    /// Change business settings.
    pub const BUSINESS_UPDATE: Permission = Permission::from_static("business:update");
    /// Delete the business.
    pub const BUSINESS_DELETE: Permission = Permission::from_static("business:delete");
    /// View a user profile.
    pub const PROFILE_READ: Permission = Permission::from_static("profile:read");
    /// Edit a user profile.
    pub const PROFILE_UPDATE: Permission = Permission::from_static("profile:update");
    /// Manage every profile in the business.
    pub const PROFILE_MANAGE_ALL: Permission = Permission::from_static("profile:manage_all");
    /// View tasks.
    pub const TASK_READ: Permission = Permission::from_static("task:read");
    /// Create tasks.
    pub const TASK_CREATE: Permission = Permission::from_static("task:create");
    /// Edit tasks.
    pub const TASK_UPDATE: Permission = Permission::from_static("task:update");
    /// Delete tasks.
    pub const TASK_DELETE: Permission = Permission::from_static("task:delete");
    /// View customers.
    pub const CUSTOMER_READ: Permission = Permission::from_static("customer:read");
    /// Create customers.
    pub const CUSTOMER_CREATE: Permission = Permission::from_static("customer:create");
    /// Edit customers.
    pub const CUSTOMER_UPDATE: Permission = Permission::from_static("customer:update");
    /// Delete customers.
    pub const CUSTOMER_DELETE: Permission = Permission::from_static("customer:delete");
    /// View forms.
    pub const FORM_READ: Permission = Permission::from_static("form:read");
    /// Create forms.
    pub const FORM_CREATE: Permission = Permission::from_static("form:create");
    /// Edit forms.
    pub const FORM_UPDATE: Permission = Permission::from_static("form:update");
    /// Delete forms.
    pub const FORM_DELETE: Permission = Permission::from_static("form:delete");
    /// Submit a form response.
    pub const FORM_SUBMIT: Permission = Permission::from_static("form:submit");
    /// View reminders.
    pub const REMINDER_READ: Permission = Permission::from_static("reminder:read");
    /// Create reminders.
    pub const REMINDER_CREATE: Permission = Permission::from_static("reminder:create");
    /// Edit reminders.
    pub const REMINDER_UPDATE: Permission = Permission::from_static("reminder:update");
    /// Delete reminders.
    pub const REMINDER_DELETE: Permission = Permission::from_static("reminder:delete");
    /// View notifications.
    pub const NOTIFICATION_READ: Permission = Permission::from_static("notification:read");
    /// Mark notifications read or dismissed.
    pub const NOTIFICATION_MANAGE: Permission = Permission::from_static("notification:manage");
    /// Enter the admin area.
    pub const ADMIN_ACCESS: Permission = Permission::from_static("admin:access");
    /// Manage user accounts.
    pub const ADMIN_MANAGE_USERS: Permission = Permission::from_static("admin:manage_users");
    /// View analytics dashboards.
    pub const ADMIN_VIEW_ANALYTICS: Permission = Permission::from_static("admin:view_analytics");
}
