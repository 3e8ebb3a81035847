use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::global_contact_commands::{GlobalAction, handle_global_command_with_conn};
use admin_cli::session_commands::{SessionAction, handle_session_command_with_conn};
use admin_cli::user_commands::{UserAction, handle_user_command_with_conn};
use admin_cli::utils::establish_connection;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "contactflow-admin")]
#[command(about = "Administer contactflow owners, global contacts and sessions")]
#[command(version)]
struct Cli {
    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage session owners")]
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    #[command(about = "Manage the global contact list")]
    Global {
        #[command(subcommand)]
        action: GlobalAction,
    },
    #[command(about = "Inspect, remove and export contact collection sessions")]
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.version_info {
        println!("contactflow-admin {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return Ok(());
    }

    let Some(command) = cli.command else {
        eprintln!("No command given. Run with --help for usage.");
        std::process::exit(2);
    };

    let mut conn = establish_connection()?;
    match command {
        Commands::User { action } => handle_user_command_with_conn(&mut conn, action),
        Commands::Global { action } => handle_global_command_with_conn(&mut conn, action),
        Commands::Session { action } => handle_session_command_with_conn(&mut conn, action),
    }
}
