use chrono::NaiveDateTime;
use contactcore::ValidContact;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::global_contacts;

/// A contact copied into every newly created session.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = global_contacts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct GlobalContact {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl From<GlobalContact> for ValidContact {
    fn from(g: GlobalContact) -> Self {
        ValidContact {
            name: g.name,
            phone: g.phone,
            email: g.email,
            company: g.company,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = global_contacts)]
pub struct NewGlobalContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub created_at: NaiveDateTime,
}
