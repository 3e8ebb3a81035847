use std::path::PathBuf;

use clap::Subcommand;
use contactcore::{ContactInput, validate};
use contactflow_api::orm::global_contact::{
    delete_global_contact, get_global_contact_by_phone, insert_global_contact,
    list_global_contacts, merge_global_contacts,
};
use contactflow_api::seed::load_seed_file;
use diesel::sqlite::SqliteConnection;

use super::utils::{Matcher, confirm};

#[derive(Subcommand)]
pub enum GlobalAction {
    #[command(about = "List global contacts, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term matched against name, phone and company (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
    #[command(about = "Add a global contact")]
    Add {
        #[arg(short, long, help = "Contact name")]
        name: String,
        #[arg(short, long, help = "Phone number with country code")]
        phone: String,
        #[arg(short, long, help = "Email address")]
        email: Option<String>,
        #[arg(short, long, help = "Company")]
        company: Option<String>,
    },
    #[command(about = "Remove global contacts matching search term")]
    Rm {
        #[arg(help = "Search term matched against name, phone and company (regex by default, use -F for fixed string)")]
        search_term: String,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Merge contacts from a TOML seed file, skipping phones already listed")]
    Import {
        #[arg(help = "TOML file with [[contacts]] entries")]
        file: PathBuf,
    },
}

pub fn handle_global_command_with_conn(
    conn: &mut SqliteConnection,
    action: GlobalAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        GlobalAction::Ls { search_term, fixed_string } => {
            list_globals_impl(conn, search_term.as_deref(), fixed_string)
        }
        GlobalAction::Add { name, phone, email, company } => {
            let input = ContactInput {
                name,
                phone: Some(phone),
                email,
                company,
            };
            add_global_impl(conn, &input)
        }
        GlobalAction::Rm { search_term, fixed_string, yes } => {
            remove_globals_impl(conn, &search_term, fixed_string, yes)
        }
        GlobalAction::Import { file } => import_globals_impl(conn, &file).map(|_| ()),
    }
}

pub fn list_globals_impl(
    conn: &mut SqliteConnection,
    search_term: Option<&str>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = Matcher::new(search_term, fixed_string)?;
    let contacts: Vec<_> = list_global_contacts(conn)?
        .into_iter()
        .filter(|c| {
            matcher.matches(&[
                c.name.as_str(),
                c.phone.as_str(),
                c.company.as_deref().unwrap_or(""),
            ])
        })
        .collect();

    if contacts.is_empty() {
        println!("No global contacts found.");
        return Ok(());
    }
    println!("Global contacts:");
    for c in contacts {
        println!(
            "  ID: {}, Name: {}, Phone: {}, Email: {}, Company: {}",
            c.id,
            c.name,
            c.phone,
            c.email.as_deref().unwrap_or("-"),
            c.company.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn add_global_impl(
    conn: &mut SqliteConnection,
    input: &ContactInput,
) -> Result<(), Box<dyn std::error::Error>> {
    let valid = validate(input, None)?;
    if get_global_contact_by_phone(conn, &valid.phone)?.is_some() {
        return Err(format!("{} is already a global contact", valid.phone).into());
    }

    let created = insert_global_contact(conn, &valid)?;
    println!("Global contact created successfully!");
    println!("ID: {}", created.id);
    println!("Name: {}", created.name);
    println!("Phone: {}", created.phone);
    Ok(())
}

pub fn remove_globals_impl(
    conn: &mut SqliteConnection,
    search_term: &str,
    fixed_string: bool,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = Matcher::new(Some(search_term), fixed_string)?;
    let matching: Vec<_> = list_global_contacts(conn)?
        .into_iter()
        .filter(|c| {
            matcher.matches(&[
                c.name.as_str(),
                c.phone.as_str(),
                c.company.as_deref().unwrap_or(""),
            ])
        })
        .collect();

    if matching.is_empty() {
        println!("No global contacts found matching the search term.");
        return Ok(());
    }

    println!("Found {} global contact(s) matching the search term:", matching.len());
    for c in &matching {
        println!("  ID: {}, Name: {}, Phone: {}", c.id, c.name, c.phone);
    }

    if !yes && !confirm(&format!("Delete these {} global contact(s)?", matching.len()))? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let mut deleted = 0;
    for c in matching {
        deleted += delete_global_contact(conn, c.id)?;
    }
    println!("Successfully deleted {} global contact(s).", deleted);
    Ok(())
}

/// Returns how many contacts were added.
pub fn import_globals_impl(
    conn: &mut SqliteConnection,
    file: &std::path::Path,
) -> Result<usize, Box<dyn std::error::Error>> {
    let report = load_seed_file(file)?;
    for (index, name, reason) in &report.rejected {
        eprintln!("Skipping entry {} ('{}'): {}", index + 1, name, reason);
    }

    let added = merge_global_contacts(conn, &report.valid)?;
    println!(
        "Imported {} new global contact(s) from {} ({} already listed, {} rejected).",
        added,
        file.display(),
        report.valid.len() - added,
        report.rejected.len()
    );
    Ok(added)
}
