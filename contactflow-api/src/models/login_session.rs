use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};

use crate::schema::login_sessions;

/// An owner's signed-in browser session, keyed by the cookie token.
#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = login_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LoginSession {
    pub id: String,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
    pub revoked: bool,
}

#[derive(Insertable)]
#[diesel(table_name = login_sessions)]
pub struct NewLoginSession {
    pub id: String,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
    pub revoked: bool,
}
