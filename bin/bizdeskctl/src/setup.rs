//! ---
//! bizdesk_section: "05-networking-external-interfaces"
//! bizdesk_subsection: "binary"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Control CLI for administrators interacting with BizDesk."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use bizdesk_common::config::AppConfig;
use bizdesk_config::{load_active_manifest, DeploymentManifest, DEFAULT_CONFIG_ROOT};
use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum SetupCommand {
    /// Create and persist a deployment manifest from a configuration file.
    Init(InitArgs),
    /// Display the active deployment manifest.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Human-readable deployment name.
    #[arg(long)]
    name: String,
    /// Application configuration file (TOML).
    #[arg(long)]
    config: PathBuf,
    /// Root directory holding deployment state.
    #[arg(long, default_value = DEFAULT_CONFIG_ROOT)]
    root: PathBuf,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Root directory holding deployment state.
    #[arg(long, default_value = DEFAULT_CONFIG_ROOT)]
    root: PathBuf,
    /// Emit the manifest as JSON.
    #[arg(long)]
    json: bool,
}

pub fn run(cmd: SetupCommand) -> Result<()> {
    match cmd {
        SetupCommand::Init(args) => init(args),
        SetupCommand::Show(args) => show(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let config = AppConfig::load(&[&args.config])?;
    let manifest = DeploymentManifest::new(&args.name, config)?;
    let persisted = manifest.persist(&args.root)?;
    println!(
        "deployment '{}' written to {}",
        persisted.manifest.deployment.slug,
        persisted.manifest_path.display()
    );
    println!("config hash: {}", persisted.manifest.deployment.config_hash);
    println!("policy hash: {}", persisted.manifest.deployment.policy_hash);
    Ok(())
}

fn show(args: ShowArgs) -> Result<()> {
    let manifest = load_active_manifest(&args.root)?
        .ok_or_else(|| anyhow!("no active deployment under {}", args.root.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }
    let meta = &manifest.deployment;
    println!("deployment: {} ({})", meta.name, meta.slug);
    println!("created:    {}", meta.created_at.to_rfc3339());
    println!("updated:    {}", meta.updated_at.to_rfc3339());
    println!("config:     {}", meta.config_hash);
    println!("policy:     {}", meta.policy_hash);
    println!("mode:       {:?}", manifest.app.mode);
    println!("businesses: {}", manifest.app.businesses.len());
    Ok(())
}
