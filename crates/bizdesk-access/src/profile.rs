//! ---
//! bizdesk_section: "06-security-access-control"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Roles, permissions, policy, and authorization decisions."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::role::{Role, RoleParseError};

/// Identifier for a user account, as issued by the identity provider.
pub type UserId = String;

/// Identifier for a business (tenant).
pub type BusinessId = i64;

/// Per-user profile extending the external identity with a role and an
/// optional business membership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Stable user identifier (subject claim of the session).
    pub user_id: UserId,
    /// Display name for UI rendering.
    pub display_name: String,
    /// Business the user belongs to, if any.
    pub business_id: Option<BusinessId>,
    /// Role held within the business context.
    pub role: Role,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Whether the user may act at all.
    pub active: bool,
}

impl Profile {
    /// Short helper for constructing a new profile.
    pub fn new(user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: String::new(),
            business_id: None,
            role,
            created_at: Utc::now(),
            active: true,
        }
    }

    /// Construct a profile from an untrusted stored record.
    ///
    /// This is the data-access boundary: the raw role string is parsed here,
    /// so the decision engine only ever sees the closed [`Role`] enum.
    pub fn from_record(
        user_id: impl Into<UserId>,
        raw_role: &str,
        business_id: Option<BusinessId>,
    ) -> Result<Self, ProfileError> {
        let role = Role::from_str(raw_role)?;
        Ok(Self {
            user_id: user_id.into(),
            display_name: String::new(),
            business_id,
            role,
            created_at: Utc::now(),
            active: true,
        })
    }
}

/// Errors surfaced while resolving a caller's access context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// No profile exists for the user.
    #[error("profile not found")]
    NotFound,
    /// The profile exists but has been deactivated.
    #[error("profile is deactivated")]
    Inactive,
    /// The user has not joined a business yet.
    #[error("profile does not belong to any business")]
    MissingBusiness,
    /// The user belongs to a different business than the one requested.
    #[error("profile belongs to business {actual}, not {requested}")]
    BusinessMismatch {
        /// Business named in the request.
        requested: BusinessId,
        /// Business the profile actually belongs to.
        actual: BusinessId,
    },
    /// A stored role value was outside the closed set.
    #[error(transparent)]
    InvalidRole(#[from] RoleParseError),
}

/// The business the profile belongs to, or an error if it has none.
pub fn require_business(profile: &Profile) -> Result<BusinessId, ProfileError> {
    profile.business_id.ok_or(ProfileError::MissingBusiness)
}

/// Check that the profile belongs to the business named in a request.
///
/// Tenancy guard: members may only touch resources of their own business.
pub fn require_business_match(
    profile: &Profile,
    requested: BusinessId,
) -> Result<(), ProfileError> {
    let actual = require_business(profile)?;
    if actual != requested {
        return Err(ProfileError::BusinessMismatch { requested, actual });
    }
    Ok(())
}

/// In-memory profile directory suitable for development/testing.
///
/// The production directory is the external profile store; this reference
/// implementation mirrors its contract so the engine and its callers can be
/// exercised without I/O.
#[derive(Debug, Default, Clone)]
pub struct ProfileDirectory {
    profiles: Arc<RwLock<HashMap<UserId, Profile>>>,
}

impl ProfileDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a profile.
    pub fn upsert(&self, profile: Profile) {
        self.profiles
            .write()
            .insert(profile.user_id.clone(), profile);
    }

    /// Retrieve a profile by user id.
    pub fn get(&self, user_id: &str) -> Option<Profile> {
        self.profiles.read().get(user_id).cloned()
    }

    /// Resolve the profile a decision should be made for.
    ///
    /// Fails when the profile is missing or deactivated; the caller renders
    /// those as authentication/privilege errors at its own boundary.
    pub fn access_context(&self, user_id: &str) -> Result<Profile, ProfileError> {
        let profile = self.get(user_id).ok_or(ProfileError::NotFound)?;
        if !profile.active {
            return Err(ProfileError::Inactive);
        }
        Ok(profile)
    }

    /// Provision a first-login user with no business membership.
    ///
    /// Mirrors the onboarding flow: users hold the default role until they
    /// create or join a business. Returns the existing profile when one is
    /// already present.
    pub fn provision_guest(
        &self,
        user_id: impl Into<UserId>,
        display_name: impl Into<String>,
        default_role: Role,
    ) -> Profile {
        let user_id = user_id.into();
        if let Some(existing) = self.get(&user_id) {
            return existing;
        }
        let profile = Profile {
            display_name: display_name.into(),
            ..Profile::new(user_id, default_role)
        };
        self.upsert(profile.clone());
        profile
    }

    /// Attach a user to a business with the given role.
    pub fn attach_business(
        &self,
        user_id: &str,
        business_id: BusinessId,
        role: Role,
    ) -> Result<Profile, ProfileError> {
        let mut profiles = self.profiles.write();
        let profile = profiles.get_mut(user_id).ok_or(ProfileError::NotFound)?;
        profile.business_id = Some(business_id);
        profile.role = role;
        Ok(profile.clone())
    }

    /// Record a business creation: the creator becomes the business admin.
    ///
    /// A missing profile is created on the fly, matching the creation flow
    /// where a user may found a business before completing onboarding.
    pub fn found_business(&self, user_id: &str, business_id: BusinessId) -> Profile {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .entry(user_id.to_owned())
            .or_insert_with(|| Profile::new(user_id, Role::Guest));
        profile.business_id = Some(business_id);
        profile.role = Role::Admin;
        profile.clone()
    }

    /// Change the role a user holds.
    pub fn assign_role(&self, user_id: &str, role: Role) -> Result<Profile, ProfileError> {
        let mut profiles = self.profiles.write();
        let profile = profiles.get_mut(user_id).ok_or(ProfileError::NotFound)?;
        profile.role = role;
        Ok(profile.clone())
    }

    /// Deactivate a profile without deleting its record.
    pub fn deactivate(&self, user_id: &str) -> Result<(), ProfileError> {
        let mut profiles = self.profiles.write();
        let profile = profiles.get_mut(user_id).ok_or(ProfileError::NotFound)?;
        profile.active = false;
        Ok(())
    }
}
