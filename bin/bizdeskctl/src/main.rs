//! ---
//! bizdesk_section: "05-networking-external-interfaces"
//! bizdesk_subsection: "binary"
//! bizdesk_type: "source"
//! bizdesk_scope: "code"
//! bizdesk_description: "Control CLI for administrators interacting with BizDesk."
//! bizdesk_version: "v0.0.0-prealpha"
//! bizdesk_owner: "tbd"
//! ---
use anyhow::Result;
use bizdesk_common::version::VersionInfo;
use bizdesk_logging as logging;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};

mod policy;
mod setup;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "BizDesk administrative control utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(subcommand, about = "Policy table inspection and decision checks")]
    Policy(policy::PolicyCommand),
    #[command(subcommand, about = "Deployment setup and lifecycle actions")]
    Setup(setup::SetupCommand),
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }
    match cli.command {
        Some(Commands::Policy(cmd)) => policy::run(cmd)?,
        Some(Commands::Setup(cmd)) => setup::run(cmd)?,
        None => {
            Cli::command().print_help()?;
        }
    }
    Ok(())
}
