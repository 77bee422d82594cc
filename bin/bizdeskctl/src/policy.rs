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
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use bizdesk_access::engine::AccessEngine;
use bizdesk_access::policy::PolicyTable;
use bizdesk_access::role::Role;
use bizdesk_common::config::AppConfig;
use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// Print the effective policy table.
    Show(ShowArgs),
    /// Evaluate a single authorization decision.
    Check(CheckArgs),
    /// Print the full permission set a role may exercise.
    Grants(GrantsArgs),
}

#[derive(Debug, Args)]
pub struct PolicySource {
    /// Policy override file (TOML). Takes precedence over --config.
    #[arg(long)]
    policy: Option<PathBuf>,
    /// Application configuration whose access.policy_path is honoured.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl PolicySource {
    fn resolve(&self) -> Result<PolicyTable> {
        if let Some(path) = &self.policy {
            return PolicyTable::load(path)
                .with_context(|| format!("unable to load policy table {}", path.display()));
        }
        if let Some(path) = &self.config {
            let config = AppConfig::load(&[path])?;
            return bizdesk_config::effective_policy(&config);
        }
        Ok(PolicyTable::builtin())
    }
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    source: PolicySource,
    /// Emit the table as JSON instead of aligned text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Role making the request (admin, staff, guest, client).
    role: String,
    /// Permission being requested, e.g. task:update.
    permission: String,
    /// Assert that the requester owns the target resource.
    #[arg(long)]
    owner: bool,
    #[command(flatten)]
    source: PolicySource,
}

#[derive(Debug, Args)]
pub struct GrantsArgs {
    /// Role to list grants for (admin, staff, guest, client).
    role: String,
    #[command(flatten)]
    source: PolicySource,
}

pub fn run(cmd: PolicyCommand) -> Result<()> {
    match cmd {
        PolicyCommand::Show(args) => show(args),
        PolicyCommand::Check(args) => check(args),
        PolicyCommand::Grants(args) => grants(args),
    }
}

fn parse_role(raw: &str) -> Result<Role> {
    Role::from_str(raw).map_err(|err| anyhow!("{err}; expected one of {}", role_names()))
}

fn role_names() -> String {
    Role::ALL
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_roles(roles: impl IntoIterator<Item = Role>) -> String {
    roles
        .into_iter()
        .map(|role| role.as_str().to_owned())
        .collect::<Vec<_>>()
        .join(",")
}

fn show(args: ShowArgs) -> Result<()> {
    let table = args.source.resolve()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }
    let width = table
        .permissions()
        .map(|permission| permission.as_str().len())
        .max()
        .unwrap_or(0);
    for (permission, entry) in table.iter() {
        let owner = if entry.owner_check { "  [owner-check]" } else { "" };
        println!(
            "{:width$}  {}{}",
            permission.as_str(),
            format_roles(entry.roles.iter().copied()),
            owner,
        );
    }
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    let role = parse_role(&args.role)?;
    let engine = AccessEngine::new(args.source.resolve()?);
    let is_owner = args.owner.then_some(true);
    let decision = engine.evaluate(role, &args.permission, is_owner);
    println!("{} {} -> {}", role, args.permission, decision);
    if !decision.is_granted() {
        std::process::exit(1);
    }
    Ok(())
}

fn grants(args: GrantsArgs) -> Result<()> {
    let role = parse_role(&args.role)?;
    let engine = AccessEngine::new(args.source.resolve()?);
    println!(
        "{}",
        serde_json::to_string_pretty(&engine.grants_for(role))?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_role_mentions_the_closed_set() {
        let err = parse_role("owner").unwrap_err();
        assert!(err.to_string().contains("admin, staff, guest, client"));
    }

    #[test]
    fn roles_render_comma_separated() {
        assert_eq!(
            format_roles([Role::Admin, Role::Staff]),
            "admin,staff"
        );
    }
}
