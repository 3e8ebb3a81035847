use std::io::{self, Write};

use contactflow_api::orm::{run_pending_migrations, set_foreign_keys};
use diesel::{prelude::*, sqlite::SqliteConnection};
use dotenvy::dotenv;
use regex::Regex;

/// Opens the database named by `DATABASE_URL` and brings its schema up to
/// date.
pub fn establish_connection() -> Result<SqliteConnection, Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let mut conn = SqliteConnection::establish(&database_url)?;
    set_foreign_keys(&mut conn)?;
    run_pending_migrations(&mut conn).map_err(|e| format!("Failed to run migrations: {}", e))?;
    Ok(conn)
}

/// A search filter for list and remove commands: a regex by default, a
/// plain substring with `-F`. No term matches everything.
pub enum Matcher {
    All,
    Fixed(String),
    Pattern(Regex),
}

impl Matcher {
    pub fn new(term: Option<&str>, fixed_string: bool) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(match term {
            None => Matcher::All,
            Some(term) if fixed_string => Matcher::Fixed(term.to_string()),
            Some(term) => Matcher::Pattern(
                Regex::new(term).map_err(|e| format!("Invalid regex pattern '{}': {}", term, e))?,
            ),
        })
    }

    /// True when any of `fields` matches.
    pub fn matches(&self, fields: &[&str]) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Fixed(term) => fields.iter().any(|f| f.contains(term.as_str())),
            Matcher::Pattern(regex) => fields.iter().any(|f| regex.is_match(f)),
        }
    }
}

/// Asks a yes/no question on stdin. Anything but `y`/`yes` is a no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher() {
        let all = Matcher::new(None, false).unwrap();
        assert!(all.matches(&["anything"]));

        let fixed = Matcher::new(Some("a.c"), true).unwrap();
        assert!(fixed.matches(&["xa.cx"]));
        assert!(!fixed.matches(&["abc"]));

        let pattern = Matcher::new(Some("^a.c$"), false).unwrap();
        assert!(pattern.matches(&["zzz", "abc"]));
        assert!(!pattern.matches(&["xabc"]));

        assert!(Matcher::new(Some("("), false).is_err());
    }
}
