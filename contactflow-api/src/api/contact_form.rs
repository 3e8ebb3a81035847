//! Public endpoints behind a share link. No login required.
//!
//! A password-protected session is unlocked once per browser: the unlock
//! endpoint stores an access grant and hands its token back in the
//! `session_auth_<id>` cookie, which later submissions present.

use chrono::{NaiveDateTime, Utc};
use contactcore::{
    AccessGrant, AccessState, ContactInput, FlowError, requires_password, resolve_access, submit_contact,
    time_remaining, unlock,
};
use diesel::Connection;
use rocket::http::{CookieJar, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DbConn;
use crate::api::{ApiError, TimeRemainingResponse, api_error, database_error, flow_error};
use crate::config::AppConfig;
use crate::logged_json::LoggedJson;
use crate::models::{Contact, Session};
use crate::orm::SqliteStore;
use crate::orm::access_grant::{
    find_access_grant, grant_cookie_name, insert_access_grant, prune_lapsed_grants,
};
use crate::orm::login::build_cookie;
use crate::orm::session::get_session;

/// What a submitter sees before filling in the form.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct PublicSessionResponse {
    pub id: String,
    pub name: String,
    pub whatsapp_link: Option<String>,
    #[ts(type = "string")]
    pub expires_at: NaiveDateTime,
    pub requires_password: bool,
    /// `"locked"`, `"unlocked"` or `"expired"`.
    pub state: String,
    pub time_remaining: TimeRemainingResponse,
}

#[derive(Deserialize, TS)]
#[ts(export)]
pub struct UnlockRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmitContactRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl From<SubmitContactRequest> for ContactInput {
    fn from(r: SubmitContactRequest) -> Self {
        ContactInput {
            name: r.name,
            phone: r.phone,
            email: r.email,
            company: r.company,
        }
    }
}

fn public_response(
    session: Session,
    state: AccessState,
    now: NaiveDateTime,
) -> PublicSessionResponse {
    PublicSessionResponse {
        requires_password: requires_password(&session),
        state: state.as_str().to_string(),
        time_remaining: time_remaining(&session, now).into(),
        id: session.id,
        name: session.name,
        whatsapp_link: session.whatsapp_link,
        expires_at: session.expires_at,
    }
}

fn grant_token(cookies: &CookieJar<'_>, session_id: &str) -> Option<String> {
    cookies
        .get(&grant_cookie_name(session_id))
        .map(|c| c.value().to_string())
}

/// Resolves the grant a request carries for `session_id`, if any.
fn lookup_grant(
    conn: &mut diesel::SqliteConnection,
    token: Option<&str>,
    session_id: &str,
    now: NaiveDateTime,
) -> Result<Option<AccessGrant>, diesel::result::Error> {
    match token {
        Some(token) => find_access_grant(conn, token, session_id, now),
        None => Ok(None),
    }
}

/// Public Session endpoint.
///
/// - **URL:** `/api/1/contact/<session_id>`
/// - **Method:** `GET`
/// - **Purpose:** What the share link shows before the form is filled in
/// - **Authentication:** None. A `session_auth_<id>` cookie, when present,
///   counts as an unlock.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "id": "0b6f6f0e-3c5a-4f47-9d53-2f1c1f0c2a11",
///   "name": "Spring Meetup",
///   "whatsapp_link": "https://chat.whatsapp.com/abc",
///   "expires_at": "2025-06-01T10:00:00",
///   "requires_password": true,
///   "state": "locked",
///   "time_remaining": { "total_ms": 3540000, "hours": 0, "minutes": 59, "seconds": 0, "display": "0h 59m 0s" }
/// }
/// ```
///
/// **Failure (HTTP 404 Not Found):** unknown session, code `NOT_FOUND`.
#[get("/1/contact/<session_id>")]
pub async fn public_session(
    db: DbConn,
    cookies: &CookieJar<'_>,
    session_id: &str,
) -> Result<Json<PublicSessionResponse>, ApiError> {
    let id = session_id.to_string();
    let token = grant_token(cookies, session_id);
    let now = Utc::now().naive_utc();

    let (session, grant) = db
        .run(move |conn| {
            let session = get_session(conn, &id)?;
            let grant = lookup_grant(conn, token.as_deref(), &id, now)?;
            Ok::<_, diesel::result::Error>((session, grant))
        })
        .await
        .map_err(database_error)?;

    let state = resolve_access(session.as_ref(), grant.as_ref(), now);
    let session = session.ok_or_else(|| flow_error(FlowError::NotFound))?;

    Ok(Json(public_response(session, state, now)))
}

/// Unlock endpoint.
///
/// - **URL:** `/api/1/contact/<session_id>/unlock`
/// - **Method:** `POST`
/// - **Purpose:** Checks the session password
/// - **Authentication:** None
///
/// A correct password sets the `session_auth_<id>` cookie, valid until the
/// session expires. Sessions without a password answer unlocked and set
/// nothing.
///
/// # Request Format
///
/// ```json
/// { "password": "letmein" }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):** the public session view with `"state": "unlocked"`.
///
/// **Failure:**
/// - HTTP 403 Forbidden, code `LOCKED`: incorrect password
/// - HTTP 404 Not Found: unknown session
/// - HTTP 410 Gone: session expired
#[post("/1/contact/<session_id>/unlock", data = "<request>")]
pub async fn unlock_session(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    session_id: &str,
    request: Json<UnlockRequest>,
) -> Result<Json<PublicSessionResponse>, ApiError> {
    let id = session_id.to_string();
    let attempt = request.into_inner().password;
    let now = Utc::now().naive_utc();

    let outcome = db
        .run(move |conn| {
            let grant = unlock(&mut SqliteStore::new(conn), &id, &attempt, now)?;
            let session = get_session(conn, &id)
                .map_err(|e| FlowError::Store(e.to_string()))?
                .ok_or(FlowError::NotFound)?;
            // Open sessions need no grant.
            if !requires_password(&session) {
                return Ok((None, session));
            }
            let token = conn
                .transaction(|conn| {
                    prune_lapsed_grants(conn, now)?;
                    insert_access_grant(conn, &grant, now)
                })
                .map_err(|e: diesel::result::Error| FlowError::Store(e.to_string()))?;
            Ok::<_, FlowError>((Some(token), session))
        })
        .await;

    let (token, session) = match outcome {
        Ok(unlocked) => unlocked,
        Err(FlowError::Locked) => {
            warn!("Incorrect password for session {}", session_id);
            return Err(api_error(
                Status::Forbidden,
                "Incorrect password",
                Some(FlowError::Locked.code()),
            ));
        }
        Err(e) => return Err(flow_error(e)),
    };

    if let Some(token) = token {
        cookies.add(build_cookie(
            grant_cookie_name(session_id),
            token,
            config.secure_cookies,
        ));
    }

    Ok(Json(public_response(session, AccessState::Unlocked, now)))
}

/// Submit Contact endpoint.
///
/// - **URL:** `/api/1/contact/<session_id>`
/// - **Method:** `POST`
/// - **Purpose:** Adds the submitter's details to the session
/// - **Authentication:** None. Password-protected sessions need the
///   `session_auth_<id>` cookie from the unlock endpoint.
///
/// Checks run in order: session exists, not expired, unlocked, valid input,
/// phone not yet in this session. The store's unique constraint decides
/// between two racing submissions of the same phone.
///
/// # Request Format
///
/// ```json
/// {
///   "name": "Ada Lovelace",
///   "phone": "+44 7400 123456",
///   "email": "ada@example.com",
///   "company": "Analytical Engines"
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 201 Created):**
/// ```json
/// {
///   "id": 7,
///   "session_id": "0b6f6f0e-3c5a-4f47-9d53-2f1c1f0c2a11",
///   "name": "Meetup_Ada Lovelace",
///   "phone": "+447400123456",
///   "email": "ada@example.com",
///   "company": "Analytical Engines",
///   "submitted_at": "2025-06-01T09:12:44"
/// }
/// ```
///
/// **Failure:** 404 `NOT_FOUND`, 410 `EXPIRED`, 403 `LOCKED`,
/// 422 `VALIDATION_ERROR`, 409 `DUPLICATE_CONTACT`, 500 `STORE_ERROR`.
#[post("/1/contact/<session_id>", data = "<contact>")]
pub async fn submit(
    db: DbConn,
    cookies: &CookieJar<'_>,
    session_id: &str,
    contact: LoggedJson<SubmitContactRequest>,
) -> Result<status::Created<Json<Contact>>, ApiError> {
    let id = session_id.to_string();
    let token = grant_token(cookies, session_id);
    let input = ContactInput::from(contact.into_inner());
    let now = Utc::now().naive_utc();

    let stored = db
        .run(move |conn| {
            let grant = lookup_grant(conn, token.as_deref(), &id, now)
                .map_err(|e| FlowError::Store(e.to_string()))?;
            submit_contact(&mut SqliteStore::new(conn), &id, &input, grant.as_ref(), now)
        })
        .await
        .map_err(|e| {
            if let FlowError::Store(message) = &e {
                error!("Contact submission failed for {}: {}", session_id, message);
            }
            flow_error(e)
        })?;

    info!("Contact {} added to session {}", stored.id, stored.session_id);
    let location = format!("/api/1/contact/{}", stored.session_id);
    Ok(status::Created::new(location).body(Json(stored)))
}

pub fn routes() -> Vec<Route> {
    routes![public_session, unlock_session, submit]
}
