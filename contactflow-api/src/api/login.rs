//! Owner sign-in.

use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DbConn;
use crate::api::{ApiError, api_error};
use crate::config::AppConfig;
use crate::models::User;
use crate::orm::login::process_login;
use crate::session_guards::AuthenticatedUser;

#[derive(Clone, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginSuccessResponse {
    pub user_id: i32,
    pub email: String,
}

impl From<User> for LoginSuccessResponse {
    fn from(user: User) -> Self {
        LoginSuccessResponse {
            user_id: user.id,
            email: user.email,
        }
    }
}

/// Login endpoint.
///
/// - **URL:** `/api/1/login`
/// - **Method:** `POST`
/// - **Purpose:** Signs an owner in
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
/// **Success (HTTP 200 OK):** sets the `user_session` cookie.
/// ```json
/// { "user_id": 1, "email": "owner@example.com" }
/// ```
///
/// **Failure:** 400 for blank fields, 401 `Invalid credentials` otherwise.
#[post("/1/login", data = "<login>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    login: Json<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, ApiError> {
    match process_login(&db, cookies, &login.email, &login.password, config.secure_cookies).await {
        Ok(user) => {
            info!("User {} signed in", user.id);
            Ok(Json(user.into()))
        }
        Err(status) if status == Status::BadRequest => Err(api_error(
            Status::BadRequest,
            "Email and password are required",
            None,
        )),
        Err(status) => Err(api_error(status, "Invalid credentials", None)),
    }
}

/// `GET /api/1/hello`: the signed-in owner, or 401.
#[get("/1/hello")]
pub async fn secure_hello(auth_user: AuthenticatedUser) -> Json<LoginSuccessResponse> {
    Json(auth_user.user.into())
}

pub fn routes() -> Vec<Route> {
    routes![login, secure_hello]
}
