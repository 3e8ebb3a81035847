//! The persistence boundary for sessions and contacts.
//!
//! Two implementations exist: [`crate::memory::MemoryStore`] in this crate
//! and the SQLite store in the API service. Both enforce phone uniqueness
//! per session at insert time. That check is the authoritative one; the
//! [`is_duplicate`] pre-check only saves a round trip in the common case.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::lifecycle::SessionView;
use crate::validation::ValidContact;

/// Read access to a stored contact.
pub trait ContactView {
    fn session_id(&self) -> &str;
    fn name(&self) -> &str;
    fn phone(&self) -> &str;
    fn email(&self) -> Option<&str>;
    fn company(&self) -> Option<&str>;
    fn submitted_at(&self) -> NaiveDateTime;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("This phone number has already been submitted for this session")]
    DuplicateContact,
    #[error("{0}")]
    Backend(String),
}

/// Everything a store needs to persist a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub id: String,
    pub name: String,
    pub owner_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub duration_ms: i64,
    pub contact_name_prefix: Option<String>,
    pub whatsapp_link: Option<String>,
    pub session_password: Option<String>,
}

/// Capability set every session store provides.
///
/// Each call is a single, independent operation. `create_session` and
/// `insert_contact` must not leave partial records behind on failure.
pub trait SessionStore {
    type Session: SessionView;
    type Contact: ContactView;

    /// Persists a session and copies `seed` contacts into it.
    ///
    /// Seed contacts sharing a phone number are stored once.
    fn create_session(
        &mut self,
        session: NewSession,
        seed: &[ValidContact],
    ) -> Result<Self::Session, StoreError>;

    fn get_session(&mut self, id: &str) -> Result<Option<Self::Session>, StoreError>;

    /// Sessions owned by `owner_id`, or the anonymous ones when `None`.
    fn list_sessions(&mut self, owner_id: Option<i32>) -> Result<Vec<Self::Session>, StoreError>;

    /// Deletes a session and its contacts. Returns false when no session with
    /// that id belongs to `owner_id`.
    fn delete_session(&mut self, id: &str, owner_id: Option<i32>) -> Result<bool, StoreError>;

    /// Stores a contact, or fails with [`StoreError::DuplicateContact`] when
    /// the session already holds that phone number.
    fn insert_contact(
        &mut self,
        session_id: &str,
        contact: &ValidContact,
        submitted_at: NaiveDateTime,
    ) -> Result<Self::Contact, StoreError>;

    /// Contacts of a session in storage (submission) order.
    fn list_contacts(&mut self, session_id: &str) -> Result<Vec<Self::Contact>, StoreError>;

    /// Whether `phone` is already stored for the session.
    ///
    /// Stores with an index should override this.
    fn contains_phone(&mut self, session_id: &str, phone: &str) -> Result<bool, StoreError> {
        Ok(self
            .list_contacts(session_id)?
            .iter()
            .any(|c| c.phone() == phone))
    }
}

/// Duplicate guard: exact match on the normalized phone.
pub fn is_duplicate<T: SessionStore + ?Sized>(
    store: &mut T,
    session_id: &str,
    normalized_phone: &str,
) -> Result<bool, StoreError> {
    store.contains_phone(session_id, normalized_phone)
}
