use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use contactcore::{ExportFormat, export_filename, is_expired, to_csv, to_vcf};
use contactflow_api::orm::contact::list_contacts;
use contactflow_api::orm::session::{
    count_contacts, delete_session_by_id, get_session, list_all_sessions,
};
use diesel::sqlite::SqliteConnection;

use super::utils::{Matcher, confirm};

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Vcf,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Vcf => ExportFormat::Vcf,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Subcommand)]
pub enum SessionAction {
    #[command(about = "List sessions, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term matched against id and name (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
    #[command(about = "Remove sessions matching search term, with their contacts")]
    Rm {
        #[arg(help = "Search term matched against id and name (regex by default, use -F for fixed string)")]
        search_term: String,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Export a session's contacts")]
    Export {
        #[arg(help = "Session id")]
        id: String,
        #[arg(short, long, value_enum, default_value = "vcf", help = "Output format")]
        format: FormatArg,
        #[arg(short, long, help = "Output file (defaults to <session name>_contacts.<ext>)")]
        output: Option<PathBuf>,
    },
}

pub fn handle_session_command_with_conn(
    conn: &mut SqliteConnection,
    action: SessionAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Ls { search_term, fixed_string } => {
            list_sessions_impl(conn, search_term.as_deref(), fixed_string)
        }
        SessionAction::Rm { search_term, fixed_string, yes } => {
            remove_sessions_impl(conn, &search_term, fixed_string, yes)
        }
        SessionAction::Export { id, format, output } => {
            let path = export_session_impl(conn, &id, format.into(), output)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

pub fn list_sessions_impl(
    conn: &mut SqliteConnection,
    search_term: Option<&str>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = Matcher::new(search_term, fixed_string)?;
    let now = Utc::now().naive_utc();
    let sessions: Vec<_> = list_all_sessions(conn)?
        .into_iter()
        .filter(|s| matcher.matches(&[s.id.as_str(), s.name.as_str()]))
        .collect();

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }
    println!("Sessions:");
    for s in sessions {
        let count = count_contacts(conn, &s.id)?;
        let state = if is_expired(&s, now) { "expired" } else { "active" };
        let owner = s
            .owner_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  ID: {}, Name: {}, Owner: {}, State: {}, Expires: {}, Contacts: {}",
            s.id, s.name, owner, state, s.expires_at, count
        );
    }
    Ok(())
}

pub fn remove_sessions_impl(
    conn: &mut SqliteConnection,
    search_term: &str,
    fixed_string: bool,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = Matcher::new(Some(search_term), fixed_string)?;
    let matching: Vec<_> = list_all_sessions(conn)?
        .into_iter()
        .filter(|s| matcher.matches(&[s.id.as_str(), s.name.as_str()]))
        .collect();

    if matching.is_empty() {
        println!("No sessions found matching the search term.");
        return Ok(());
    }

    println!("Found {} session(s) matching the search term:", matching.len());
    for s in &matching {
        println!("  ID: {}, Name: {}", s.id, s.name);
    }

    if !yes
        && !confirm(&format!(
            "Delete these {} session(s) and all their contacts?",
            matching.len()
        ))?
    {
        println!("Operation cancelled.");
        return Ok(());
    }

    let mut deleted = 0;
    for s in matching {
        if delete_session_by_id(conn, &s.id)? {
            deleted += 1;
            println!("Deleted session: {} ({})", s.name, s.id);
        }
    }
    println!("Successfully deleted {} session(s).", deleted);
    Ok(())
}

/// `<name>_contacts.<ext>` in the current directory, whatever the name holds.
fn default_export_path(session_name: &str, format: ExportFormat) -> PathBuf {
    PathBuf::from(export_filename(session_name, format))
}

/// Writes a session's contacts to `output`, or to the default export file
/// name in the current directory. Returns the path written.
pub fn export_session_impl(
    conn: &mut SqliteConnection,
    session_id: &str,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let session = get_session(conn, session_id)?
        .ok_or_else(|| format!("Session '{}' not found", session_id))?;
    let contacts = list_contacts(conn, &session.id)?;

    let body = match format {
        ExportFormat::Vcf => to_vcf(&contacts),
        ExportFormat::Csv => to_csv(&contacts, true),
    };
    let path = output.unwrap_or_else(|| default_export_path(&session.name, format));
    fs::write(&path, body)?;
    Ok(path)
}
