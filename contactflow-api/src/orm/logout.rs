//! Database operations for signing out.

use diesel::prelude::*;

use crate::orm::login::DbRunner;
use crate::schema::login_sessions::dsl::*;

/// Marks a login session as revoked. The row stays for auditing.
///
/// Returns the number of rows updated, zero for an unknown token.
pub async fn revoke_login_session<D: DbRunner>(
    db: &D,
    token: &str,
) -> Result<usize, diesel::result::Error> {
    let token = token.to_string();
    db.run(move |conn| {
        diesel::update(login_sessions.filter(id.eq(&token)))
            .set(revoked.eq(true))
            .execute(conn)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::login::create_and_store_login_session;
    use crate::orm::testing::{setup_test_db, setup_test_dbconn};
    use crate::orm::user::insert_user;

    #[tokio::test]
    async fn test_revoke_login_session() {
        let mut conn = setup_test_db();
        let user = insert_user(&mut conn, "owner@example.com", "hash").unwrap();
        let db = setup_test_dbconn(conn);

        let token = create_and_store_login_session(&db, user.id).await.unwrap();
        assert_eq!(revoke_login_session(&db, &token).await.unwrap(), 1);
        assert_eq!(revoke_login_session(&db, "unknown").await.unwrap(), 0);

        let lookup = token.clone();
        let is_revoked: bool = db
            .run(move |conn| {
                login_sessions
                    .filter(id.eq(&lookup))
                    .select(revoked)
                    .first(conn)
            })
            .await
            .unwrap();
        assert!(is_revoked);
    }
}
