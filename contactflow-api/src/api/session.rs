//! Owner endpoints for contact collection sessions.
//!
//! Every route here requires [`AuthenticatedUser`]. A session owned by
//! someone else answers exactly like a session that does not exist.

use chrono::{NaiveDateTime, Utc};
use contactcore::{
    DurationUnit, NewSession, SessionDraft, SessionDraftError, StoreError, is_expired,
    requires_password, sort_for_dashboard, time_remaining,
};
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::DbConn;
use crate::api::{
    ApiError, TimeRemainingResponse, api_error, database_error, flow_error, session_not_found,
};
use crate::config::AppConfig;
use crate::models::{Contact, Session};
use crate::orm::SqliteStore;
use crate::orm::contact::list_contacts_newest_first;
use crate::orm::session::{count_contacts, delete_session, get_session, list_sessions_by_owner};
use crate::session_guards::AuthenticatedUser;

/// Request body for creating a session. Sent as plain JSON so the session
/// password never reaches the request log.
#[derive(Deserialize, TS)]
#[ts(export)]
pub struct CreateSessionRequest {
    pub name: String,
    #[ts(type = "number")]
    pub duration: i64,
    #[serde(default)]
    #[ts(type = "\"minutes\" | \"hours\"")]
    pub duration_unit: DurationUnit,
    pub contact_name_prefix: Option<String>,
    pub whatsapp_link: Option<String>,
    pub session_password: Option<String>,
}

/// What the owner sees for one session. The password itself is never
/// returned.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct SessionResponse {
    pub id: String,
    pub name: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub expires_at: NaiveDateTime,
    #[ts(type = "number")]
    pub duration_ms: i64,
    pub contact_name_prefix: Option<String>,
    pub whatsapp_link: Option<String>,
    pub requires_password: bool,
    /// `"active"` or `"expired"`.
    pub state: String,
    pub time_remaining: TimeRemainingResponse,
    pub share_link: String,
    #[ts(type = "number")]
    pub contact_count: i64,
}

fn session_response(
    session: Session,
    contact_count: i64,
    config: &AppConfig,
    now: NaiveDateTime,
) -> SessionResponse {
    let state = if is_expired(&session, now) { "expired" } else { "active" };
    SessionResponse {
        requires_password: requires_password(&session),
        state: state.to_string(),
        time_remaining: time_remaining(&session, now).into(),
        share_link: config.share_link(&session.id),
        contact_count,
        id: session.id,
        name: session.name,
        created_at: session.created_at,
        expires_at: session.expires_at,
        duration_ms: session.duration_ms,
        contact_name_prefix: session.contact_name_prefix,
        whatsapp_link: session.whatsapp_link,
    }
}

/// Loads a session only if `owner_id` owns it.
pub(crate) async fn owned_session(
    db: &DbConn,
    session_id: &str,
    owner_id: i32,
) -> Result<Session, ApiError> {
    let session_id = session_id.to_string();
    db.run(move |conn| get_session(conn, &session_id))
        .await
        .map_err(database_error)?
        .filter(|s| s.owner_id == Some(owner_id))
        .ok_or_else(session_not_found)
}

/// Create Session endpoint.
///
/// - **URL:** `/api/1/Sessions`
/// - **Method:** `POST`
/// - **Purpose:** Opens a collection window owned by the caller, seeded
///   with every global contact
/// - **Authentication:** Required
///
/// # Request Format
///
/// ```json
/// {
///   "name": "Spring Meetup",
///   "duration": 2,
///   "duration_unit": "hours",
///   "contact_name_prefix": "Meetup_",
///   "whatsapp_link": "https://chat.whatsapp.com/abc",
///   "session_password": "letmein"
/// }
/// ```
///
/// `duration_unit` defaults to `"minutes"`. The last three fields are
/// optional.
///
/// # Response
///
/// **Success (HTTP 201 Created):**
/// ```json
/// {
///   "id": "0b6f6f0e-3c5a-4f47-9d53-2f1c1f0c2a11",
///   "name": "Spring Meetup",
///   "created_at": "2025-06-01T09:00:00",
///   "expires_at": "2025-06-01T11:00:00",
///   "duration_ms": 7200000,
///   "contact_name_prefix": "Meetup_",
///   "whatsapp_link": "https://chat.whatsapp.com/abc",
///   "requires_password": true,
///   "state": "active",
///   "time_remaining": { "total_ms": 7200000, "hours": 2, "minutes": 0, "seconds": 0, "display": "2h 0m 0s" },
///   "share_link": "http://localhost:8000/contact/0b6f6f0e-3c5a-4f47-9d53-2f1c1f0c2a11",
///   "contact_count": 0
/// }
/// ```
///
/// **Failure (HTTP 422 Unprocessable Entity):** blank name, non-positive or
/// overflowing duration.
#[post("/1/Sessions", data = "<request>")]
pub async fn create_session(
    db: DbConn,
    auth_user: AuthenticatedUser,
    config: &State<AppConfig>,
    request: Json<CreateSessionRequest>,
) -> Result<status::Created<Json<SessionResponse>>, ApiError> {
    let request = request.into_inner();
    let invalid = |e: SessionDraftError| {
        api_error(Status::UnprocessableEntity, e.to_string(), Some("VALIDATION_ERROR"))
    };

    let duration_ms =
        SessionDraft::duration_from(request.duration, request.duration_unit).map_err(invalid)?;
    let draft = SessionDraft {
        name: request.name,
        duration_ms,
        contact_name_prefix: request.contact_name_prefix,
        whatsapp_link: request.whatsapp_link,
        session_password: request.session_password,
        owner_id: Some(auth_user.user.id),
    }
    .normalized()
    .map_err(invalid)?;

    let created_at = Utc::now().naive_utc();
    let expires_at = draft.expires_at(created_at).map_err(invalid)?;
    let new_session = NewSession {
        id: Uuid::new_v4().to_string(),
        name: draft.name,
        owner_id: draft.owner_id,
        created_at,
        expires_at,
        duration_ms: draft.duration_ms,
        contact_name_prefix: draft.contact_name_prefix,
        whatsapp_link: draft.whatsapp_link,
        session_password: draft.session_password,
    };

    let (session, contact_count) = db
        .run(move |conn| {
            let session = SqliteStore::new(conn).create_session_with_globals(new_session)?;
            let count = count_contacts(conn, &session.id)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok::<_, StoreError>((session, count))
        })
        .await
        .map_err(|e| flow_error(e.into()))?;

    info!(
        "User {} created session {} ({} global contacts)",
        auth_user.user.id, session.id, contact_count
    );
    let location = format!("/api/1/Sessions/{}", session.id);
    Ok(status::Created::new(location).body(Json(session_response(
        session,
        contact_count,
        config,
        Utc::now().naive_utc(),
    ))))
}

/// List Sessions endpoint.
///
/// - **URL:** `/api/1/Sessions`
/// - **Method:** `GET`
/// - **Purpose:** The caller's dashboard
/// - **Authentication:** Required
///
/// Active sessions first, newest first within each group.
#[get("/1/Sessions")]
pub async fn list_sessions(
    db: DbConn,
    auth_user: AuthenticatedUser,
    config: &State<AppConfig>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let owner_id = auth_user.user.id;
    let now = Utc::now().naive_utc();
    let rows = db
        .run(move |conn| {
            let mut sessions = list_sessions_by_owner(conn, Some(owner_id))?;
            sort_for_dashboard(&mut sessions, now);
            sessions
                .into_iter()
                .map(|s| count_contacts(conn, &s.id).map(|n| (s, n)))
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(database_error)?;

    Ok(Json(
        rows.into_iter()
            .map(|(session, count)| session_response(session, count, config, now))
            .collect(),
    ))
}

/// Get Session endpoint.
///
/// - **URL:** `/api/1/Sessions/<session_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required, session owner only (404 otherwise)
#[get("/1/Sessions/<session_id>")]
pub async fn get_owned_session(
    db: DbConn,
    auth_user: AuthenticatedUser,
    config: &State<AppConfig>,
    session_id: &str,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = owned_session(&db, session_id, auth_user.user.id).await?;
    let id = session.id.clone();
    let count = db
        .run(move |conn| count_contacts(conn, &id))
        .await
        .map_err(database_error)?;
    Ok(Json(session_response(session, count, config, Utc::now().naive_utc())))
}

/// Session Contacts endpoint.
///
/// - **URL:** `/api/1/Sessions/<session_id>/Contacts`
/// - **Method:** `GET`
/// - **Purpose:** Collected contacts, most recent submission first
/// - **Authentication:** Required, session owner only
#[get("/1/Sessions/<session_id>/Contacts")]
pub async fn list_session_contacts(
    db: DbConn,
    auth_user: AuthenticatedUser,
    session_id: &str,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let session = owned_session(&db, session_id, auth_user.user.id).await?;
    db.run(move |conn| list_contacts_newest_first(conn, &session.id))
        .await
        .map(Json)
        .map_err(database_error)
}

/// Delete Session endpoint.
///
/// - **URL:** `/api/1/Sessions/<session_id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Removes the session with its contacts and unlock grants
/// - **Authentication:** Required
///
/// 204 on success, 404 for unknown and foreign ids alike.
#[delete("/1/Sessions/<session_id>")]
pub async fn delete_owned_session(
    db: DbConn,
    auth_user: AuthenticatedUser,
    session_id: &str,
) -> Result<Status, ApiError> {
    let owner_id = auth_user.user.id;
    let id = session_id.to_string();
    let deleted = db
        .run(move |conn| delete_session(conn, &id, Some(owner_id)))
        .await
        .map_err(database_error)?;

    if deleted {
        info!("User {} deleted session {}", owner_id, session_id);
        Ok(Status::NoContent)
    } else {
        Err(session_not_found())
    }
}

pub fn routes() -> Vec<Route> {
    routes![
        create_session,
        list_sessions,
        get_owned_session,
        list_session_contacts,
        delete_owned_session
    ]
}
