//! Remembered password unlocks.
//!
//! A grant row lives as long as its session's validity window. The token is
//! what the submitter's browser holds in the `session_auth_<id>` cookie.

use chrono::NaiveDateTime;
use contactcore::AccessGrant;
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::AccessGrantRecord;
use crate::schema::access_grants;

/// Cookie name for the grant of one session.
pub fn grant_cookie_name(session_id: &str) -> String {
    format!("session_auth_{}", session_id)
}

/// Stores a grant and returns its token.
pub fn insert_access_grant(
    conn: &mut SqliteConnection,
    grant: &AccessGrant,
    now: NaiveDateTime,
) -> Result<String, diesel::result::Error> {
    let record = AccessGrantRecord {
        token: Uuid::new_v4().to_string(),
        session_id: grant.session_id.clone(),
        created_at: now,
        expires_at: grant.expires_at,
    };
    diesel::insert_into(access_grants::table)
        .values(&record)
        .execute(conn)?;
    Ok(record.token)
}

/// Looks up the grant behind `token` for one session. Grants for other
/// sessions and lapsed grants are not returned.
pub fn find_access_grant(
    conn: &mut SqliteConnection,
    token: &str,
    session_id: &str,
    now: NaiveDateTime,
) -> Result<Option<AccessGrant>, diesel::result::Error> {
    access_grants::table
        .filter(access_grants::token.eq(token))
        .filter(access_grants::session_id.eq(session_id))
        .filter(access_grants::expires_at.gt(now))
        .first::<AccessGrantRecord>(conn)
        .optional()
        .map(|record| record.map(AccessGrant::from))
}

/// Deletes grants whose window has closed. Returns how many went.
pub fn prune_lapsed_grants(
    conn: &mut SqliteConnection,
    now: NaiveDateTime,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(access_grants::table.filter(access_grants::expires_at.le(now))).execute(conn)
}
