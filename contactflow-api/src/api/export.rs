//! Contact downloads for session owners. Allowed in every session state,
//! expired included.

use contactcore::{ExportFormat, export_filename, to_csv, to_vcf};
use rocket::Route;
use rocket::http::{ContentType, Header, Status};

use crate::DbConn;
use crate::api::session::owned_session;
use crate::api::{ApiError, api_error, database_error};
use crate::orm::contact::list_contacts;
use crate::session_guards::AuthenticatedUser;

/// An attachment with its content type and suggested file name.
#[derive(Responder)]
pub struct Download {
    body: String,
    content_type: ContentType,
    disposition: Header<'static>,
}

fn attachment(filename: &str) -> Header<'static> {
    // Quotes would end the quoted-string early.
    let filename = filename.replace('"', "'");
    Header::new(
        "Content-Disposition",
        format!("attachment; filename=\"{}\"", filename),
    )
}

/// Export Contacts endpoint.
///
/// - **URL:** `/api/1/Sessions/<session_id>/export/<vcf|csv>`
/// - **Method:** `GET`
/// - **Purpose:** Downloads the session's contacts as vCard or CSV
/// - **Authentication:** Required, session owner only
///
/// Contacts come out in the order they were stored, oldest first. Works in
/// every session state, expired included.
///
/// # Response
///
/// **Success (HTTP 200 OK):** `text/vcard` or `text/csv` with
/// `Content-Disposition: attachment; filename="<name>_contacts.<ext>"`.
///
/// **Failure:** 400 for any other format, 404 for unknown or foreign
/// sessions.
#[get("/1/Sessions/<session_id>/export/<format>")]
pub async fn export_contacts(
    db: DbConn,
    auth_user: AuthenticatedUser,
    session_id: &str,
    format: &str,
) -> Result<Download, ApiError> {
    let format = ExportFormat::parse(format).ok_or_else(|| {
        api_error(
            Status::BadRequest,
            format!("Unsupported export format '{}'", format),
            None,
        )
    })?;
    let session = owned_session(&db, session_id, auth_user.user.id).await?;

    let id = session.id.clone();
    let contacts = db
        .run(move |conn| list_contacts(conn, &id))
        .await
        .map_err(database_error)?;

    let body = match format {
        ExportFormat::Vcf => to_vcf(&contacts),
        ExportFormat::Csv => to_csv(&contacts, true),
    };
    info!(
        "Exported {} contact(s) from session {} as {}",
        contacts.len(),
        session.id,
        format.extension()
    );

    Ok(Download {
        body,
        content_type: ContentType::parse_flexible(format.content_type())
            .unwrap_or(ContentType::Plain),
        disposition: attachment(&export_filename(&session.name, format)),
    })
}

pub fn routes() -> Vec<Route> {
    routes![export_contacts]
}
