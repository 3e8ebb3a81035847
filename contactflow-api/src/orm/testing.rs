#![cfg(any(test, feature = "test-staging"))]
//! Test scaffolding: in-memory databases and a ready-to-dispatch Rocket.

use std::path::Path;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    Figment,
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket};
use uuid::Uuid;

use super::db::{run_pending_migrations, set_foreign_keys};
use crate::models::Session;

/// Figment behind [`test_rocket`]: a fresh shared in-memory database and
/// non-secure cookies.
pub fn test_figment() -> Figment {
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());
    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    rocket::Config::figment()
        .merge(("databases", map!["sqlite_db" => db_config]))
        .merge(("secure_cookies", false))
        .merge(("public_origin", "http://localhost:8000"))
}

/// A Rocket instance backed by its own shared in-memory SQLite database,
/// with migrations applied and every API route mounted. Cookies are not
/// marked `Secure` so the local client sends them back.
pub fn test_rocket() -> Rocket<Build> {
    crate::build_rocket(test_figment())
}

/// Like [`test_rocket`], with global contacts seeded from a TOML file.
pub fn test_rocket_with_seed(seed_file: &Path) -> Rocket<Build> {
    let figment = test_figment().merge(("seed_file", seed_file.display().to_string()));
    crate::build_rocket(figment)
}

/// A migrated, independent in-memory database for synchronous tests.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn).expect("Failed to enable foreign keys");
    run_pending_migrations(&mut conn).expect("Failed to run migrations");
    conn
}

/// Owns a test connection and offers the async `.run()` interface of the
/// Rocket pool, so ORM functions taking a `DbRunner` can be unit tested.
pub struct FakeDbConn(Mutex<SqliteConnection>);

impl FakeDbConn {
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut conn = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut conn)
    }
}

pub fn setup_test_dbconn(conn: SqliteConnection) -> FakeDbConn {
    FakeDbConn(Mutex::new(conn))
}

/// An ownerless ten-minute session starting now, not yet persisted.
pub fn sample_session(id: &str, owner_id: Option<i32>) -> Session {
    let created_at = Utc::now().naive_utc();
    Session {
        id: id.to_string(),
        name: format!("Session {}", id),
        owner_id,
        created_at,
        expires_at: created_at + Duration::minutes(10),
        duration_ms: 600_000,
        contact_name_prefix: None,
        whatsapp_link: None,
        session_password: None,
    }
}
