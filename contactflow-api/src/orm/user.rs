use chrono::Utc;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewUser, User};

#[derive(QueryableByName)]
pub(crate) struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    pub(crate) last_insert_rowid: i64,
}

pub(crate) fn last_insert_rowid(conn: &mut SqliteConnection) -> QueryResult<i32> {
    diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)
        .map(|row| row.last_insert_rowid as i32)
}

/// Inserts a user. The email is trimmed and lowercased first.
pub fn insert_user(
    conn: &mut SqliteConnection,
    email: &str,
    password_hash: &str,
) -> Result<User, diesel::result::Error> {
    use crate::schema::users::dsl;

    let new_user = NewUser {
        email: email.trim().to_lowercase(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(dsl::users)
        .values(&new_user)
        .execute(conn)?;

    let id = last_insert_rowid(conn)?;
    dsl::users.filter(dsl::id.eq(id)).first::<User>(conn)
}

/// Returns all users in ascending order by id.
pub fn list_all_users(conn: &mut SqliteConnection) -> Result<Vec<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.order(id.asc()).load::<User>(conn)
}

pub fn get_user(conn: &mut SqliteConnection, user_id: i32) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    users.filter(id.eq(user_id)).first::<User>(conn).optional()
}

/// Gets a single user by email (case-insensitive).
pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    user_email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    diesel::sql_query("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
        .bind::<diesel::sql_types::Text, _>(user_email.trim())
        .get_result::<User>(conn)
        .optional()
}

pub fn update_password(
    conn: &mut SqliteConnection,
    user_id: i32,
    new_password_hash: &str,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::users::dsl::*;
    diesel::update(users.filter(id.eq(user_id)))
        .set(password_hash.eq(new_password_hash))
        .execute(conn)
}

/// Deletes a user together with their login sessions and every collection
/// session they own, in one transaction. Returns the number of user rows
/// removed.
pub fn delete_user_with_cleanup(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::{login_sessions, sessions, users};

    conn.transaction(|conn| {
        let owned: Vec<String> = sessions::table
            .filter(sessions::owner_id.eq(user_id))
            .select(sessions::id)
            .load(conn)?;
        for session_id in &owned {
            crate::orm::session::delete_session_rows(conn, session_id)?;
        }

        diesel::delete(login_sessions::table.filter(login_sessions::user_id.eq(user_id)))
            .execute(conn)?;
        diesel::delete(users::table.filter(users::id.eq(user_id))).execute(conn)
    })
}
