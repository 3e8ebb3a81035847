use chrono::NaiveDateTime;
use contactcore::{NewSession, SessionView};
use diesel::{Identifiable, Insertable, Queryable, Selectable};

use crate::schema::sessions;

/// A contact collection session.
///
/// `session_password` is stored and compared in plaintext. Anyone with read
/// access to the database can see it.
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
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

impl From<NewSession> for Session {
    fn from(s: NewSession) -> Self {
        Session {
            id: s.id,
            name: s.name,
            owner_id: s.owner_id,
            created_at: s.created_at,
            expires_at: s.expires_at,
            duration_ms: s.duration_ms,
            contact_name_prefix: s.contact_name_prefix,
            whatsapp_link: s.whatsapp_link,
            session_password: s.session_password,
        }
    }
}

impl SessionView for Session {
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
