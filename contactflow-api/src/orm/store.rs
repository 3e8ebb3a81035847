//! The SQLite-backed [`SessionStore`].

use chrono::NaiveDateTime;
use contactcore::{NewSession, SessionStore, StoreError, ValidContact};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error};

use crate::models::{Contact, Session};
use crate::orm::{contact, session};

/// Adapts a borrowed connection to the store interface.
///
/// A unique violation on contact insert becomes
/// [`StoreError::DuplicateContact`]; every other database error passes its
/// message through as [`StoreError::Backend`].
pub struct SqliteStore<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        SqliteStore { conn }
    }

    /// Creates a session seeded with the current global contact list.
    pub fn create_session_with_globals(
        &mut self,
        new_session: NewSession,
    ) -> Result<Session, StoreError> {
        session::create_session_with_globals(self.conn, &Session::from(new_session))
            .map_err(backend)
    }
}

fn backend(e: Error) -> StoreError {
    error!("Store operation failed: {}", e);
    StoreError::Backend(e.to_string())
}

fn map_insert_error(e: Error) -> StoreError {
    match e {
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StoreError::DuplicateContact,
        other => backend(other),
    }
}

impl SessionStore for SqliteStore<'_> {
    type Session = Session;
    type Contact = Contact;

    fn create_session(
        &mut self,
        new_session: NewSession,
        seed: &[ValidContact],
    ) -> Result<Session, StoreError> {
        session::insert_session_with_seed(self.conn, &Session::from(new_session), seed)
            .map_err(backend)
    }

    fn get_session(&mut self, id: &str) -> Result<Option<Session>, StoreError> {
        session::get_session(self.conn, id).map_err(backend)
    }

    fn list_sessions(&mut self, owner_id: Option<i32>) -> Result<Vec<Session>, StoreError> {
        session::list_sessions_by_owner(self.conn, owner_id).map_err(backend)
    }

    fn delete_session(&mut self, id: &str, owner_id: Option<i32>) -> Result<bool, StoreError> {
        session::delete_session(self.conn, id, owner_id).map_err(backend)
    }

    fn insert_contact(
        &mut self,
        session_id: &str,
        valid: &ValidContact,
        submitted_at: NaiveDateTime,
    ) -> Result<Contact, StoreError> {
        contact::insert_contact(self.conn, session_id, valid, submitted_at).map_err(map_insert_error)
    }

    fn list_contacts(&mut self, session_id: &str) -> Result<Vec<Contact>, StoreError> {
        contact::list_contacts(self.conn, session_id).map_err(backend)
    }

    fn contains_phone(&mut self, session_id: &str, phone: &str) -> Result<bool, StoreError> {
        contact::phone_exists(self.conn, session_id, phone).map_err(backend)
    }
}
