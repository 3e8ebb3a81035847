//! Owner management of the global contact list.

use contactcore::{ContactInput, validate};
use diesel::result::{DatabaseErrorKind, Error};
use rocket::Route;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;

use crate::DbConn;
use crate::api::contact_form::SubmitContactRequest;
use crate::api::{ApiError, api_error, database_error};
use crate::logged_json::LoggedJson;
use crate::models::GlobalContact;
use crate::orm::global_contact::{
    delete_global_contact, insert_global_contact, list_global_contacts,
};
use crate::session_guards::AuthenticatedUser;

/// List Global Contacts endpoint.
///
/// - **URL:** `/api/1/GlobalContacts`
/// - **Method:** `GET`
/// - **Purpose:** Contacts copied into every new session, newest first
/// - **Authentication:** Required
#[get("/1/GlobalContacts")]
pub async fn list_global(
    db: DbConn,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Vec<GlobalContact>>, ApiError> {
    db.run(list_global_contacts)
        .await
        .map(Json)
        .map_err(database_error)
}

/// Create Global Contact endpoint.
///
/// - **URL:** `/api/1/GlobalContacts`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// Validated like a public submission, without a name prefix.
///
/// # Request Format
///
/// ```json
/// { "name": "Front desk", "phone": "+1 201 555 0100", "email": "desk@example.com" }
/// ```
///
/// # Response
///
/// **Success (HTTP 201 Created):** the stored contact with its `id`.
///
/// **Failure:** 422 `VALIDATION_ERROR`, 409 `DUPLICATE_CONTACT` when the
/// phone number is already on the list.
#[post("/1/GlobalContacts", data = "<contact>")]
pub async fn create_global(
    db: DbConn,
    auth_user: AuthenticatedUser,
    contact: LoggedJson<SubmitContactRequest>,
) -> Result<status::Created<Json<GlobalContact>>, ApiError> {
    let input = ContactInput::from(contact.into_inner());
    let valid = validate(&input, None).map_err(|e| {
        api_error(Status::UnprocessableEntity, e.to_string(), Some("VALIDATION_ERROR"))
    })?;

    let created = db
        .run(move |conn| insert_global_contact(conn, &valid))
        .await
        .map_err(|e| match e {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => api_error(
                Status::Conflict,
                "This phone number is already a global contact",
                Some("DUPLICATE_CONTACT"),
            ),
            other => database_error(other),
        })?;

    info!("User {} added global contact {}", auth_user.user.id, created.id);
    let location = format!("/api/1/GlobalContacts/{}", created.id);
    Ok(status::Created::new(location).body(Json(created)))
}

/// Delete Global Contact endpoint.
///
/// - **URL:** `/api/1/GlobalContacts/<contact_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Required
///
/// 204 or 404. Sessions already seeded with the contact keep their copy.
#[delete("/1/GlobalContacts/<contact_id>")]
pub async fn delete_global(
    db: DbConn,
    auth_user: AuthenticatedUser,
    contact_id: i32,
) -> Result<Status, ApiError> {
    let removed = db
        .run(move |conn| delete_global_contact(conn, contact_id))
        .await
        .map_err(database_error)?;

    if removed == 0 {
        return Err(api_error(
            Status::NotFound,
            "Global contact not found",
            Some("NOT_FOUND"),
        ));
    }
    info!("User {} removed global contact {}", auth_user.user.id, contact_id);
    Ok(Status::NoContent)
}

pub fn routes() -> Vec<Route> {
    routes![list_global, create_global, delete_global]
}
