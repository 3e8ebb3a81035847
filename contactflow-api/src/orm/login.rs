//! Database operations for owner sign-in.
//!
//! Password verification, login session storage and the session cookie. The
//! functions take any [`DbRunner`] so they work against the Rocket pool and
//! against a plain test connection.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use diesel::prelude::*;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use uuid::Uuid;

use crate::DbConn;
use crate::models::{NewLoginSession, User};
#[cfg(any(test, feature = "test-staging"))]
use crate::orm::testing::FakeDbConn;
use crate::schema::login_sessions;

/// Name of the cookie carrying the login session token.
pub const LOGIN_COOKIE: &str = "user_session";

/// Runs a closure against a database connection.
///
/// Implemented by `DbConn` in production and by `FakeDbConn` in tests.
pub trait DbRunner {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

#[cfg(any(test, feature = "test-staging"))]
impl DbRunner for FakeDbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Finds a user by email, ignoring case.
pub async fn find_user_by_email<D: DbRunner>(db: &D, email: &str) -> Result<Option<User>, Status> {
    let email = email.trim().to_lowercase();
    db.run(move |conn| crate::orm::user::get_user_by_email(conn, &email))
        .await
        .map_err(|e| {
            error!("Database error looking up user: {}", e);
            Status::InternalServerError
        })
}

/// Checks a password against a stored argon2 hash. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// Creates a login session for `user_id` and returns its token.
pub async fn create_and_store_login_session<D: DbRunner>(
    db: &D,
    user_id: i32,
) -> Result<String, Status> {
    let token = generate_session_token();
    let new_session = NewLoginSession {
        id: token.clone(),
        user_id,
        created_at: Utc::now().naive_utc(),
        expires_at: None,
        revoked: false,
    };

    db.run(move |conn| {
        diesel::insert_into(login_sessions::table)
            .values(&new_session)
            .execute(conn)
    })
    .await
    .map_err(|e| {
        error!("Failed to store login session: {}", e);
        Status::InternalServerError
    })?;

    Ok(token)
}

/// Builds an HTTP-only, SameSite=Lax cookie scoped to the whole site.
pub fn build_cookie(name: String, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub fn set_login_cookie(cookies: &CookieJar<'_>, token: &str, secure: bool) {
    cookies.add(build_cookie(LOGIN_COOKIE.to_string(), token.to_string(), secure));
}

/// Validates credentials, starts a login session and sets the cookie.
///
/// Unknown users and wrong passwords both yield `Unauthorized`.
pub async fn process_login<D: DbRunner>(
    db: &D,
    cookies: &CookieJar<'_>,
    email: &str,
    password: &str,
    secure_cookies: bool,
) -> Result<User, Status> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(Status::BadRequest);
    }

    let user = find_user_by_email(db, email)
        .await?
        .ok_or(Status::Unauthorized)?;

    if !verify_password(password, &user.password_hash) {
        return Err(Status::Unauthorized);
    }

    let token = create_and_store_login_session(db, user.id).await?;
    set_login_cookie(cookies, &token, secure_cookies);

    Ok(user)
}

/// Hashes a password with argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}
