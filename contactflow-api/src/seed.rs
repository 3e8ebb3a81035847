//! Global contact seeding from a TOML file.
//!
//! ```toml
//! [[contacts]]
//! name = "Front desk"
//! phone = "+1 201 555 0000"
//! email = "desk@example.com"
//! ```
//!
//! Entries are validated like public submissions (no name prefix). Invalid
//! entries are skipped with a warning; valid ones are merged by phone, so
//! loading the same file again adds nothing.

use std::path::Path;

use contactcore::{ContactInput, ValidContact, ValidationError, validate};
use rocket::fairing::AdHoc;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::orm::DbConn;
use crate::orm::global_contact::merge_global_contacts;

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    contacts: Vec<ContactInput>,
}

/// Outcome of validating a seed list.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub valid: Vec<ValidContact>,
    /// Position in the file, the name as written and why it was rejected.
    pub rejected: Vec<(usize, String, ValidationError)>,
}

pub fn parse_seed(text: &str) -> Result<Vec<ContactInput>, toml::de::Error> {
    toml::from_str::<SeedFile>(text).map(|file| file.contacts)
}

pub fn validate_seed(entries: Vec<ContactInput>) -> SeedReport {
    let mut report = SeedReport::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match validate(&entry, None) {
            Ok(valid) => report.valid.push(valid),
            Err(e) => report.rejected.push((index, entry.name, e)),
        }
    }
    report
}

/// Reads, parses and validates a seed file.
pub fn load_seed_file(path: &Path) -> Result<SeedReport, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let entries = parse_seed(&text).map_err(|e| format!("cannot parse {}: {}", path.display(), e))?;
    Ok(validate_seed(entries))
}

/// Merges the configured seed file into the global contacts at ignition.
///
/// No `seed_file` setting means nothing to do. A configuration that does
/// not extract, or an unreadable or malformed file, fails ignition.
pub fn seed_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Global Contact Seed", |rocket| async {
        let config: AppConfig = match rocket.figment().extract() {
            Ok(config) => config,
            Err(e) => {
                error!("[seed] Invalid configuration: {}", e);
                return Err(rocket);
            }
        };
        let Some(path) = config.seed_file else {
            return Ok(rocket);
        };

        let report = match load_seed_file(&path) {
            Ok(report) => report,
            Err(e) => {
                error!("[seed] {}", e);
                return Err(rocket);
            }
        };
        for (index, name, reason) in &report.rejected {
            warn!("[seed] Skipping entry {} ('{}'): {}", index + 1, name, reason);
        }

        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("[seed] Could not get a database connection");
            return Err(rocket);
        };
        let valid = report.valid;
        match conn.run(move |c| merge_global_contacts(c, &valid)).await {
            Ok(added) => {
                info!("[seed] Added {} global contact(s) from {}", added, path.display());
                Ok(rocket)
            }
            Err(e) => {
                error!("[seed] Failed to merge global contacts: {}", e);
                Err(rocket)
            }
        }
    })
}
