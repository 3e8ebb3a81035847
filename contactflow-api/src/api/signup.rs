//! Owner account creation.

use rocket::http::{CookieJar, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Deserialize;
use ts_rs::TS;

use crate::DbConn;
use crate::api::login::LoginSuccessResponse;
use crate::api::{ApiError, api_error, database_error};
use crate::config::AppConfig;
use crate::orm::login::{create_and_store_login_session, hash_password, set_login_cookie};
use crate::orm::user::{get_user_by_email, insert_user};

#[derive(Deserialize, TS)]
#[ts(export)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Signup endpoint.
///
/// - **URL:** `/api/1/signup`
/// - **Method:** `POST`
/// - **Purpose:** Creates an owner account and signs it in
/// - **Authentication:** None
///
/// # Request Format
///
/// ```json
/// { "email": "owner@example.com", "password": "hunter22" }
/// ```
///
/// # Response
///
/// **Success (HTTP 201 Created):** sets the `user_session` cookie.
/// ```json
/// { "user_id": 1, "email": "owner@example.com" }
/// ```
///
/// **Failure:** 400 for blank fields, 409 when the email is taken
/// (case-insensitive).
#[post("/1/signup", data = "<signup>")]
pub async fn signup(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    signup: Json<SignupRequest>,
) -> Result<status::Created<Json<LoginSuccessResponse>>, ApiError> {
    let email = signup.email.trim().to_lowercase();
    if email.is_empty() || signup.password.trim().is_empty() {
        return Err(api_error(
            Status::BadRequest,
            "Email and password are required",
            None,
        ));
    }

    let password_hash = hash_password(&signup.password).map_err(|e| {
        error!("Password hashing failed: {}", e);
        api_error(Status::InternalServerError, "Could not create account", None)
    })?;

    let user = db
        .run(move |conn| {
            if get_user_by_email(conn, &email)?.is_some() {
                return Ok(None);
            }
            insert_user(conn, &email, &password_hash).map(Some)
        })
        .await
        .map_err(database_error)?
        .ok_or_else(|| {
            api_error(
                Status::Conflict,
                "An account with this email already exists",
                None,
            )
        })?;

    let token = create_and_store_login_session(&db, user.id)
        .await
        .map_err(|status| api_error(status, "Could not start session", None))?;
    set_login_cookie(cookies, &token, config.secure_cookies);

    info!("Created account {}", user.id);
    Ok(status::Created::new("/api/1/hello").body(Json(user.into())))
}

pub fn routes() -> Vec<Route> {
    routes![signup]
}
