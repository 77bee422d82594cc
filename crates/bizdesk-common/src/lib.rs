//! ---
//! bizdesk_section: "01-core-functionality"
//! bizdesk_subsection: "module"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Shared primitives and utilities for the platform core."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
//! Core shared primitives for the BizDesk platform workspace.
//! This crate exposes configuration loading, logging setup, and
//! version metadata utilities consumed across the workspace.

pub mod config;
pub mod logging;
pub mod version;

pub use config::{
    AccessConfig, AppConfig, BusinessConfig, LoggingConfig, MetricsConfig, Mode,
};
pub use logging::{init_tracing, LogFormat};
pub use version::VersionInfo;
