use std::io::{self, Write};

use clap::Subcommand;
use contactflow_api::orm::login::hash_password;
use contactflow_api::orm::user::{
    delete_user_with_cleanup, get_user_by_email, insert_user, list_all_users, update_password,
};
use diesel::sqlite::SqliteConnection;
use rpassword::read_password;

use super::utils::{Matcher, confirm};

#[derive(Subcommand)]
pub enum UserAction {
    #[command(about = "Create a session owner")]
    Create {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "Password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
    #[command(about = "Change an owner's password")]
    ChangePassword {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "New password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
    #[command(about = "List owners, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
    #[command(about = "Remove owners matching search term, with all their sessions")]
    Rm {
        #[arg(help = "Search term to match owners for removal (regex by default, use -F for fixed string)")]
        search_term: String,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
}

pub fn handle_user_command_with_conn(
    conn: &mut SqliteConnection,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UserAction::Create { email, password } => create_user_impl(conn, &email, password),
        UserAction::ChangePassword { email, password } => {
            change_password_impl(conn, &email, password)
        }
        UserAction::Ls { search_term, fixed_string } => {
            list_users_impl(conn, search_term.as_deref(), fixed_string)
        }
        UserAction::Rm { search_term, fixed_string, yes } => {
            remove_users_impl(conn, &search_term, fixed_string, yes)
        }
    }
}

pub fn create_user_impl(
    conn: &mut SqliteConnection,
    email: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if email.trim().is_empty() {
        return Err("Email cannot be empty".into());
    }
    if get_user_by_email(conn, email)?.is_some() {
        return Err(format!("A user with email '{}' already exists", email.trim()).into());
    }

    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };
    let password_hash =
        hash_password(&password).map_err(|e| format!("Failed to hash password: {}", e))?;

    let user = insert_user(conn, email, &password_hash)?;

    println!("User created successfully!");
    println!("ID: {}", user.id);
    println!("Email: {}", user.email);
    Ok(())
}

pub fn change_password_impl(
    conn: &mut SqliteConnection,
    email: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = get_user_by_email(conn, email)?
        .ok_or_else(|| format!("User with email '{}' not found", email))?;

    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };
    let password_hash =
        hash_password(&password).map_err(|e| format!("Failed to hash password: {}", e))?;
    update_password(conn, user.id, &password_hash)?;

    println!("Password changed successfully for user: {}", user.email);
    Ok(())
}

pub fn list_users_impl(
    conn: &mut SqliteConnection,
    search_term: Option<&str>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = Matcher::new(search_term, fixed_string)?;
    let users: Vec<_> = list_all_users(conn)?
        .into_iter()
        .filter(|user| matcher.matches(&[user.email.as_str()]))
        .collect();

    if users.is_empty() {
        println!("No users found.");
    } else {
        println!("Users:");
        for user in users {
            println!("  ID: {}, Email: {}, Created: {}", user.id, user.email, user.created_at);
        }
    }
    Ok(())
}

pub fn remove_users_impl(
    conn: &mut SqliteConnection,
    search_term: &str,
    fixed_string: bool,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = Matcher::new(Some(search_term), fixed_string)?;
    let matching: Vec<_> = list_all_users(conn)?
        .into_iter()
        .filter(|user| matcher.matches(&[user.email.as_str()]))
        .collect();

    if matching.is_empty() {
        println!("No users found matching the search term.");
        return Ok(());
    }

    println!("Found {} user(s) matching the search term:", matching.len());
    for user in &matching {
        println!("  ID: {}, Email: {}", user.id, user.email);
    }

    if !yes
        && !confirm(&format!(
            "Delete these {} user(s) and every session they own?",
            matching.len()
        ))?
    {
        println!("Operation cancelled.");
        return Ok(());
    }

    let mut deleted_count = 0;
    let mut errors = Vec::new();
    for user in matching {
        match delete_user_with_cleanup(conn, user.id) {
            Ok(rows) if rows > 0 => {
                deleted_count += 1;
                println!("Deleted user: {} (ID: {})", user.email, user.id);
            }
            Ok(_) => {}
            Err(e) => errors.push(format!(
                "Failed to delete user {} (ID: {}): {}",
                user.email, user.id, e
            )),
        }
    }

    println!("Successfully deleted {} user(s).", deleted_count);
    if !errors.is_empty() {
        eprintln!("Errors encountered:");
        for error in errors {
            eprintln!("  {}", error);
        }
        return Err("Some deletions failed".into());
    }
    Ok(())
}

pub fn prompt_for_password() -> Result<String, Box<dyn std::error::Error>> {
    print!("Enter new password: ");
    io::stdout().flush()?;
    let password = read_password()?;

    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }

    print!("Confirm new password: ");
    io::stdout().flush()?;
    let confirm_password = read_password()?;

    if password != confirm_password {
        return Err("Passwords do not match".into());
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactflow_api::orm::login::verify_password;
    use contactflow_api::orm::session::{get_session, insert_session_with_seed};
    use contactflow_api::orm::testing::{sample_session, setup_test_db};

    #[test]
    fn test_create_and_change_password() {
        let mut conn = setup_test_db();
        create_user_impl(&mut conn, "Owner@Example.com", Some("first".to_string())).unwrap();
        assert!(create_user_impl(&mut conn, "owner@example.com", Some("x".to_string())).is_err());

        change_password_impl(&mut conn, "OWNER@example.com", Some("second".to_string())).unwrap();
        let user = get_user_by_email(&mut conn, "owner@example.com")
            .unwrap()
            .unwrap();
        assert!(verify_password("second", &user.password_hash));
        assert!(!verify_password("first", &user.password_hash));

        assert!(change_password_impl(&mut conn, "nobody@example.com", Some("x".to_string())).is_err());
    }

    #[test]
    fn test_remove_users_takes_their_sessions() {
        let mut conn = setup_test_db();
        let keep = insert_user(&mut conn, "keep@example.com", "hash").unwrap();
        let gone = insert_user(&mut conn, "gone@example.com", "hash").unwrap();
        insert_session_with_seed(&mut conn, &sample_session("kept", Some(keep.id)), &[]).unwrap();
        insert_session_with_seed(&mut conn, &sample_session("dropped", Some(gone.id)), &[]).unwrap();

        remove_users_impl(&mut conn, "gone@", true, true).unwrap();

        let emails: Vec<String> = list_all_users(&mut conn)
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, ["keep@example.com"]);
        assert!(get_session(&mut conn, "kept").unwrap().is_some());
        assert!(get_session(&mut conn, "dropped").unwrap().is_none());
    }

    #[test]
    fn test_bad_regex_is_an_error() {
        let mut conn = setup_test_db();
        assert!(list_users_impl(&mut conn, Some("["), false).is_err());
        assert!(list_users_impl(&mut conn, Some("["), true).is_ok());
    }
}
