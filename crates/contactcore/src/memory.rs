//! In-process session store.
//!
//! Keeps everything in memory and enforces the same per-session phone
//! uniqueness as the database-backed store. Useful for embedding the flow
//! without a database and for tests.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::lifecycle::SessionView;
use crate::store::{ContactView, NewSession, SessionStore, StoreError};
use crate::validation::ValidContact;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
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

impl SessionView for StoredSession {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
    fn expires_at(&self) -> NaiveDateTime {
        self.expires_at
    }
    fn session_password(&self) -> Option<&str> {
        self.session_password.as_deref()
    }
    fn contact_name_prefix(&self) -> Option<&str> {
        self.contact_name_prefix.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContact {
    pub id: i32,
    pub session_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub submitted_at: NaiveDateTime,
}

impl ContactView for StoredContact {
    fn session_id(&self) -> &str {
        &self.session_id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn phone(&self) -> &str {
        &self.phone
    }
    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
    fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }
    fn submitted_at(&self) -> NaiveDateTime {
        self.submitted_at
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Vec<StoredSession>,
    contacts: HashMap<String, Vec<StoredContact>>,
    phones: HashMap<String, HashSet<String>>,
    next_contact_id: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_contact(
        &mut self,
        session_id: &str,
        contact: &ValidContact,
        submitted_at: NaiveDateTime,
    ) -> Result<StoredContact, StoreError> {
        let phones = self.phones.entry(session_id.to_string()).or_default();
        if !phones.insert(contact.phone.clone()) {
            return Err(StoreError::DuplicateContact);
        }

        self.next_contact_id += 1;
        let stored = StoredContact {
            id: self.next_contact_id,
            session_id: session_id.to_string(),
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
            company: contact.company.clone(),
            submitted_at,
        };
        self.contacts
            .entry(session_id.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }
}

impl SessionStore for MemoryStore {
    type Session = StoredSession;
    type Contact = StoredContact;

    fn create_session(
        &mut self,
        session: NewSession,
        seed: &[ValidContact],
    ) -> Result<StoredSession, StoreError> {
        if self.sessions.iter().any(|s| s.id == session.id) {
            return Err(StoreError::Backend(format!(
                "session '{}' already exists",
                session.id
            )));
        }

        let stored = StoredSession {
            id: session.id,
            name: session.name,
            owner_id: session.owner_id,
            created_at: session.created_at,
            expires_at: session.expires_at,
            duration_ms: session.duration_ms,
            contact_name_prefix: session.contact_name_prefix,
            whatsapp_link: session.whatsapp_link,
            session_password: session.session_password,
        };
        self.sessions.push(stored.clone());

        for contact in seed {
            match self.push_contact(&stored.id, contact, stored.created_at) {
                Ok(_) | Err(StoreError::DuplicateContact) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(stored)
    }

    fn get_session(&mut self, id: &str) -> Result<Option<StoredSession>, StoreError> {
        Ok(self.sessions.iter().find(|s| s.id == id).cloned())
    }

    fn list_sessions(&mut self, owner_id: Option<i32>) -> Result<Vec<StoredSession>, StoreError> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn delete_session(&mut self, id: &str, owner_id: Option<i32>) -> Result<bool, StoreError> {
        let before = self.sessions.len();
        self.sessions
            .retain(|s| !(s.id == id && s.owner_id == owner_id));
        if self.sessions.len() == before {
            return Ok(false);
        }
        self.contacts.remove(id);
        self.phones.remove(id);
        Ok(true)
    }

    fn insert_contact(
        &mut self,
        session_id: &str,
        contact: &ValidContact,
        submitted_at: NaiveDateTime,
    ) -> Result<StoredContact, StoreError> {
        if !self.sessions.iter().any(|s| s.id == session_id) {
            return Err(StoreError::Backend(format!(
                "session '{}' does not exist",
                session_id
            )));
        }
        self.push_contact(session_id, contact, submitted_at)
    }

    fn list_contacts(&mut self, session_id: &str) -> Result<Vec<StoredContact>, StoreError> {
        Ok(self.contacts.get(session_id).cloned().unwrap_or_default())
    }

    fn contains_phone(&mut self, session_id: &str, phone: &str) -> Result<bool, StoreError> {
        Ok(self
            .phones
            .get(session_id)
            .is_some_and(|phones| phones.contains(phone)))
    }
}
