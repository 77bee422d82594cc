//! ---
//! bizdesk_section: "01-core-functionality"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Shared primitives and utilities for the platform core."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use serde::Serialize;

/// Compile-time version metadata for CLI and logging surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Workspace semantic version.
    pub semver: String,
    /// Git commit hash captured at build time, when the build environment provides one.
    pub git_sha: String,
    /// Build timestamp from the compilation environment.
    pub build_timestamp: String,
}

impl VersionInfo {
    /// Construct a new [`VersionInfo`] instance using environment metadata.
    #[must_use]
    pub fn current() -> Self {
        Self {
            semver: env!("CARGO_PKG_VERSION").to_owned(),
            git_sha: option_env!("BIZDESK_GIT_SHA").unwrap_or("UNKNOWN").to_owned(),
            build_timestamp: option_env!("BIZDESK_BUILD_TIMESTAMP")
                .unwrap_or("UNKNOWN")
                .to_owned(),
        }
    }

    /// Human readable banner used in logging surfaces.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("BizDesk v{} (git {})", self.semver, self.git_sha)
    }

    /// Extended string containing build metadata suitable for `--version` flags.
    #[must_use]
    pub fn extended(&self) -> String {
        format!(
            "{banner}\nBuilt: {built}",
            banner = self.banner(),
            built = self.build_timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_contains_semver() {
        let info = VersionInfo::current();
        assert!(info.extended().contains(&info.semver));
    }
}
