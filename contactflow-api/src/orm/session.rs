//! Database operations for contact collection sessions.

use contactcore::ValidContact;
use diesel::prelude::*;

use crate::models::{NewContact, Session};
use crate::schema::{access_grants, contacts, sessions};

/// Inserts a session and copies `seed` into it as contacts, atomically.
///
/// Seed contacts reuse the session's creation time as their submission time.
/// A seed phone number that appears twice is stored once.
pub fn insert_session_with_seed(
    conn: &mut SqliteConnection,
    session: &Session,
    seed: &[ValidContact],
) -> Result<Session, diesel::result::Error> {
    conn.transaction(|conn| {
        diesel::insert_into(sessions::table)
            .values(session)
            .execute(conn)?;

        let rows: Vec<NewContact> = seed
            .iter()
            .map(|c| NewContact {
                session_id: session.id.clone(),
                name: c.name.clone(),
                phone: c.phone.clone(),
                email: c.email.clone(),
                company: c.company.clone(),
                submitted_at: session.created_at,
            })
            .collect();
        for row in &rows {
            diesel::insert_or_ignore_into(contacts::table)
                .values(row)
                .execute(conn)?;
        }

        sessions::table
            .filter(sessions::id.eq(&session.id))
            .first::<Session>(conn)
    })
}

/// Inserts a session seeded with every global contact. The read of the
/// global list and the inserts share one transaction.
pub fn create_session_with_globals(
    conn: &mut SqliteConnection,
    session: &Session,
) -> Result<Session, diesel::result::Error> {
    conn.transaction(|conn| {
        let seed: Vec<ValidContact> = crate::orm::global_contact::list_global_contacts(conn)?
            .into_iter()
            .map(ValidContact::from)
            .collect();
        insert_session_with_seed(conn, session, &seed)
    })
}

pub fn get_session(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<Option<Session>, diesel::result::Error> {
    sessions::table
        .filter(sessions::id.eq(session_id))
        .first::<Session>(conn)
        .optional()
}

/// Sessions owned by `owner`, or the ownerless ones when `None`, newest
/// first.
pub fn list_sessions_by_owner(
    conn: &mut SqliteConnection,
    owner: Option<i32>,
) -> Result<Vec<Session>, diesel::result::Error> {
    let mut query = sessions::table.into_boxed();
    query = match owner {
        Some(owner) => query.filter(sessions::owner_id.eq(owner)),
        None => query.filter(sessions::owner_id.is_null()),
    };
    query
        .order((sessions::created_at.desc(), sessions::id.asc()))
        .load::<Session>(conn)
}

pub fn list_all_sessions(conn: &mut SqliteConnection) -> Result<Vec<Session>, diesel::result::Error> {
    sessions::table
        .order(sessions::created_at.desc())
        .load::<Session>(conn)
}

pub fn count_contacts(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<i64, diesel::result::Error> {
    contacts::table
        .filter(contacts::session_id.eq(session_id))
        .count()
        .get_result(conn)
}

/// Removes a session's access grants, contacts and the session row itself.
/// Callers provide the transaction.
pub(crate) fn delete_session_rows(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(access_grants::table.filter(access_grants::session_id.eq(session_id)))
        .execute(conn)?;
    diesel::delete(contacts::table.filter(contacts::session_id.eq(session_id))).execute(conn)?;
    diesel::delete(sessions::table.filter(sessions::id.eq(session_id))).execute(conn)
}

/// Deletes a session owned by `owner` with everything attached to it.
///
/// Returns false, leaving everything in place, when no session with that id
/// belongs to `owner`.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_id: &str,
    owner: Option<i32>,
) -> Result<bool, diesel::result::Error> {
    conn.transaction(|conn| match get_session(conn, session_id)? {
        Some(session) if session.owner_id == owner => {
            Ok(delete_session_rows(conn, session_id)? > 0)
        }
        _ => Ok(false),
    })
}

/// Deletes a session regardless of owner.
pub fn delete_session_by_id(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<bool, diesel::result::Error> {
    conn.transaction(|conn| Ok(delete_session_rows(conn, session_id)? > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::contact::{insert_contact, list_contacts};
    use crate::orm::global_contact::insert_global_contact;
    use crate::orm::testing::{sample_session, setup_test_db};
    use crate::orm::user::insert_user;
    use chrono::Duration;

    fn contact(name: &str, phone: &str) -> ValidContact {
        ValidContact {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            company: None,
        }
    }

    #[test]
    fn test_insert_with_seed_dedups_phones() {
        let mut conn = setup_test_db();
        let session = sample_session("s1", None);
        let seed = [
            contact("Host", "+12015550001"),
            contact("Host twice", "+12015550001"),
            contact("Co-host", "+12015550002"),
        ];
        let stored = insert_session_with_seed(&mut conn, &session, &seed).unwrap();
        assert_eq!(stored, session);

        let contacts = list_contacts(&mut conn, "s1").unwrap();
        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().all(|c| c.submitted_at == session.created_at));
    }

    #[test]
    fn test_create_session_copies_globals() {
        let mut conn = setup_test_db();
        insert_global_contact(&mut conn, &contact("Global", "+12015559999")).unwrap();

        create_session_with_globals(&mut conn, &sample_session("s1", None)).unwrap();
        let contacts = list_contacts(&mut conn, "s1").unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].phone, "+12015559999");
    }

    #[test]
    fn test_failed_create_leaves_nothing_behind() {
        let mut conn = setup_test_db();
        let mut bad = sample_session("s1", None);
        bad.duration_ms = 0;
        bad.expires_at = bad.created_at;
        let seed = [contact("Host", "+12015550001")];

        assert!(insert_session_with_seed(&mut conn, &bad, &seed).is_err());
        assert!(get_session(&mut conn, "s1").unwrap().is_none());
        assert_eq!(count_contacts(&mut conn, "s1").unwrap(), 0);
    }

    #[test]
    fn test_delete_requires_owner_and_cascades() {
        let mut conn = setup_test_db();
        let owner = insert_user(&mut conn, "owner@example.com", "hash").unwrap();
        let other = insert_user(&mut conn, "other@example.com", "hash").unwrap();
        let session = sample_session("s1", Some(owner.id));
        insert_session_with_seed(&mut conn, &session, &[]).unwrap();
        insert_contact(&mut conn, "s1", &contact("Jo", "+12015551111"), session.created_at).unwrap();

        assert!(!delete_session(&mut conn, "s1", Some(other.id)).unwrap());
        assert!(!delete_session(&mut conn, "s1", None).unwrap());
        assert_eq!(count_contacts(&mut conn, "s1").unwrap(), 1);

        assert!(delete_session(&mut conn, "s1", Some(owner.id)).unwrap());
        assert!(get_session(&mut conn, "s1").unwrap().is_none());
        assert_eq!(count_contacts(&mut conn, "s1").unwrap(), 0);
        assert!(!delete_session(&mut conn, "s1", Some(owner.id)).unwrap());
    }

    #[test]
    fn test_list_by_owner_newest_first() {
        let mut conn = setup_test_db();
        let owner = insert_user(&mut conn, "owner@example.com", "hash").unwrap();
        let older = sample_session("older", Some(owner.id));
        let mut newer = sample_session("newer", Some(owner.id));
        newer.created_at = older.created_at + Duration::minutes(5);
        newer.expires_at = newer.created_at + Duration::minutes(10);
        insert_session_with_seed(&mut conn, &older, &[]).unwrap();
        insert_session_with_seed(&mut conn, &newer, &[]).unwrap();
        insert_session_with_seed(&mut conn, &sample_session("anon", None), &[]).unwrap();

        let ids: Vec<String> = list_sessions_by_owner(&mut conn, Some(owner.id))
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["newer", "older"]);
        assert_eq!(list_sessions_by_owner(&mut conn, None).unwrap().len(), 1);
        assert_eq!(list_all_sessions(&mut conn).unwrap().len(), 3);
    }
}
