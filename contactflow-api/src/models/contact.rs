use chrono::NaiveDateTime;
use contactcore::ContactView;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::contacts;

/// A submitted contact. Phone numbers are stored normalized.
#[derive(
    Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS,
)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Contact {
    pub id: i32,
    pub session_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    #[ts(type = "string")]
    pub submitted_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = contacts)]
pub struct NewContact {
    pub session_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub submitted_at: NaiveDateTime,
}

impl ContactView for Contact {
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
