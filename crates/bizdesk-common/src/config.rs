//! ---
//! bizdesk_section: "01-core-functionality"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Shared primitives and utilities for the platform core."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use bizdesk_access::role::Role;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

fn default_mode() -> Mode {
    Mode::Production
}

fn default_role() -> Role {
    Role::Guest
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_listen() -> SocketAddr {
    "0.0.0.0:9898"
        .parse()
        .expect("valid default metrics address")
}

/// Primary configuration object for the BizDesk runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub businesses: IndexMap<String, BusinessConfig>,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "BIZDESK_CONFIG";

    /// Load configuration from disk, respecting the `BIZDESK_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Retrieve a business configuration by slug.
    pub fn business(&self, slug: &str) -> Option<&BusinessConfig> {
        self.businesses.get(slug)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.businesses.is_empty() {
            return Err(anyhow!("configuration must contain at least one business"));
        }
        for (slug, business) in &self.businesses {
            business.validate(slug)?;
        }
        self.access.validate()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            businesses: IndexMap::new(),
            access: AccessConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Operating mode for the platform core.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Production,
    Demo,
}

impl Mode {
    /// Demo mode enables auto-provisioning conveniences unsuitable for production.
    pub fn is_demo(&self) -> bool {
        matches!(self, Mode::Demo)
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Mode::Production),
            "demo" => Ok(Mode::Demo),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// A tenant business seeded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BusinessConfig {
    /// Display name shown to members.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// User id of the business owner. The owner always holds the admin role.
    pub owner: String,
    /// Additional members and the role each holds within the business.
    #[serde(default)]
    pub members: IndexMap<String, Role>,
}

impl BusinessConfig {
    pub fn validate(&self, slug: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("business '{}' must declare a name", slug));
        }
        if self.owner.trim().is_empty() {
            return Err(anyhow!("business '{}' must declare an owner", slug));
        }
        if let Some(role) = self.members.get(&self.owner) {
            if *role != Role::Admin {
                return Err(anyhow!(
                    "business '{}' lists owner '{}' with non-admin role",
                    slug,
                    self.owner
                ));
            }
        }
        Ok(())
    }
}

/// Access-control settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Optional TOML policy file overriding the built-in permission table.
    #[serde(default)]
    pub policy_path: Option<PathBuf>,
    /// Role assigned to users that have not yet joined a business.
    #[serde(default = "default_role")]
    pub default_role: Role,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            policy_path: None,
            default_role: default_role(),
        }
    }
}

impl AccessConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.policy_path {
            if !path.is_file() {
                return Err(anyhow!(
                    "access policy_path {} does not exist or is not a file",
                    path.display()
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_listen")]
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            listen: default_metrics_listen(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_config() -> &'static str {
        r#"
            mode = "demo"

            [businesses.acme-plumbing]
            name = "Acme Plumbing"
            owner = "user-owner"

            [businesses.acme-plumbing.members]
            "user-staff" = "staff"
            "user-viewer" = "guest"
        "#
    }

    #[test]
    fn parses_and_validates_sample() {
        let config = AppConfig::from_str(sample_config()).unwrap();
        assert!(config.mode.is_demo());
        let business = config.business("acme-plumbing").unwrap();
        assert_eq!(business.owner, "user-owner");
        assert_eq!(business.members.get("user-staff"), Some(&Role::Staff));
        assert_eq!(config.access.default_role, Role::Guest);
    }

    #[test]
    fn rejects_config_without_businesses() {
        let err = AppConfig::from_str("mode = \"production\"").unwrap_err();
        assert!(err.to_string().contains("at least one business"));
    }

    #[test]
    fn rejects_owner_listed_with_non_admin_role() {
        let raw = r#"
            [businesses.acme]
            name = "Acme"
            owner = "user-owner"

            [businesses.acme.members]
            "user-owner" = "staff"
        "#;
        let err = AppConfig::from_str(raw).unwrap_err();
        assert!(err.to_string().contains("non-admin role"));
    }

    #[test]
    fn rejects_unknown_member_role() {
        let raw = r#"
            [businesses.acme]
            name = "Acme"
            owner = "user-owner"

            [businesses.acme.members]
            "user-x" = "superuser"
        "#;
        assert!(AppConfig::from_str(raw).is_err());
    }
}
