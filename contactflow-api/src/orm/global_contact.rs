use chrono::Utc;
use contactcore::ValidContact;
use diesel::prelude::*;

use crate::models::{GlobalContact, NewGlobalContact};
use crate::orm::user::last_insert_rowid;
use crate::schema::global_contacts;

fn new_row(contact: &ValidContact) -> NewGlobalContact {
    NewGlobalContact {
        name: contact.name.clone(),
        phone: contact.phone.clone(),
        email: contact.email.clone(),
        company: contact.company.clone(),
        created_at: Utc::now().naive_utc(),
    }
}

/// Inserts a global contact. A phone number already on the list is a
/// `UniqueViolation`.
pub fn insert_global_contact(
    conn: &mut SqliteConnection,
    contact: &ValidContact,
) -> Result<GlobalContact, diesel::result::Error> {
    diesel::insert_into(global_contacts::table)
        .values(&new_row(contact))
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    global_contacts::table
        .filter(global_contacts::id.eq(id))
        .first::<GlobalContact>(conn)
}

/// All global contacts, newest first.
pub fn list_global_contacts(
    conn: &mut SqliteConnection,
) -> Result<Vec<GlobalContact>, diesel::result::Error> {
    global_contacts::table
        .order((global_contacts::created_at.desc(), global_contacts::id.desc()))
        .load::<GlobalContact>(conn)
}

pub fn get_global_contact_by_phone(
    conn: &mut SqliteConnection,
    phone: &str,
) -> Result<Option<GlobalContact>, diesel::result::Error> {
    global_contacts::table
        .filter(global_contacts::phone.eq(phone))
        .first::<GlobalContact>(conn)
        .optional()
}

/// Returns the number of rows removed.
pub fn delete_global_contact(
    conn: &mut SqliteConnection,
    contact_id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(global_contacts::table.filter(global_contacts::id.eq(contact_id))).execute(conn)
}

/// Adds every contact whose phone is not on the list yet. Existing entries
/// are left untouched, so merging the same list twice changes nothing.
/// Returns how many contacts were added.
pub fn merge_global_contacts(
    conn: &mut SqliteConnection,
    contacts: &[ValidContact],
) -> Result<usize, diesel::result::Error> {
    conn.transaction(|conn| {
        let mut added = 0;
        for contact in contacts {
            added += diesel::insert_or_ignore_into(global_contacts::table)
                .values(&new_row(contact))
                .execute(conn)?;
        }
        Ok(added)
    })
}
