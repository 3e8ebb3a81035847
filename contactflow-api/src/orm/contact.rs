use chrono::NaiveDateTime;
use contactcore::ValidContact;
use diesel::prelude::*;

use crate::models::{Contact, NewContact};
use crate::orm::user::last_insert_rowid;
use crate::schema::contacts;

/// Inserts a validated contact.
///
/// The `UNIQUE(session_id, phone)` constraint rejects a second contact with
/// the same normalized phone as a `UniqueViolation`, whatever any earlier
/// check concluded.
pub fn insert_contact(
    conn: &mut SqliteConnection,
    session_id: &str,
    contact: &ValidContact,
    submitted_at: NaiveDateTime,
) -> Result<Contact, diesel::result::Error> {
    let row = NewContact {
        session_id: session_id.to_string(),
        name: contact.name.clone(),
        phone: contact.phone.clone(),
        email: contact.email.clone(),
        company: contact.company.clone(),
        submitted_at,
    };

    diesel::insert_into(contacts::table)
        .values(&row)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    contacts::table
        .filter(contacts::id.eq(id))
        .first::<Contact>(conn)
}

/// Contacts of a session in submission order.
pub fn list_contacts(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<Vec<Contact>, diesel::result::Error> {
    contacts::table
        .filter(contacts::session_id.eq(session_id))
        .order(contacts::id.asc())
        .load::<Contact>(conn)
}

/// Contacts of a session, most recent first.
pub fn list_contacts_newest_first(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<Vec<Contact>, diesel::result::Error> {
    contacts::table
        .filter(contacts::session_id.eq(session_id))
        .order((contacts::submitted_at.desc(), contacts::id.desc()))
        .load::<Contact>(conn)
}

pub fn phone_exists(
    conn: &mut SqliteConnection,
    session_id: &str,
    phone: &str,
) -> Result<bool, diesel::result::Error> {
    diesel::select(diesel::dsl::exists(
        contacts::table
            .filter(contacts::session_id.eq(session_id))
            .filter(contacts::phone.eq(phone)),
    ))
    .get_result(conn)
}
