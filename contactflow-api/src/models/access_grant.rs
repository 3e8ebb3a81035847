use chrono::NaiveDateTime;
use contactcore::AccessGrant;
use diesel::{Identifiable, Insertable, Queryable, Selectable};

use crate::schema::access_grants;

/// A remembered password unlock for one session, looked up by cookie token.
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(primary_key(token))]
#[diesel(table_name = access_grants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccessGrantRecord {
    pub token: String,
    pub session_id: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl From<AccessGrantRecord> for AccessGrant {
    fn from(r: AccessGrantRecord) -> Self {
        AccessGrant {
            session_id: r.session_id,
            expires_at: r.expires_at,
        }
    }
}
