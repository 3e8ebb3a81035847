use diesel::connection::SimpleConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rocket::fairing::AdHoc;
use rocket_sync_db_pools::{database, diesel};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[database("sqlite_db")]
pub struct DbConn(diesel::SqliteConnection);

/// Enables foreign key enforcement on one SQLite connection.
///
/// SQLite applies this per connection, so it only covers the connection it
/// ran on. Deletes that must cascade do so explicitly in the ORM.
pub fn set_foreign_keys(conn: &mut diesel::SqliteConnection) -> diesel::QueryResult<()> {
    conn.batch_execute("PRAGMA foreign_keys = ON")
}

pub fn set_foreign_keys_fairing() -> AdHoc {
    AdHoc::on_ignite("Set Foreign Keys", |rocket| async {
        match DbConn::get_one(&rocket).await {
            Some(conn) => {
                if let Err(e) = conn.run(set_foreign_keys).await {
                    warn!("Failed to enable foreign keys: {}", e);
                }
            }
            None => warn!("No database connection available to enable foreign keys"),
        }
        rocket
    })
}

/// Runs all pending migrations. Returns the number applied.
pub fn run_pending_migrations(
    conn: &mut diesel::SqliteConnection,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    conn.run_pending_migrations(MIGRATIONS).map(|applied| applied.len())
}

/// Runs migrations at ignition. Ignition fails if they cannot be applied.
pub fn run_migrations_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Diesel Migrations", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("Could not get a database connection for migrations");
            return Err(rocket);
        };
        let result = conn
            .run(|c| run_pending_migrations(c).map_err(|e| e.to_string()))
            .await;
        match result {
            Ok(0) => Ok(rocket),
            Ok(applied) => {
                info!("Applied {} database migration(s)", applied);
                Ok(rocket)
            }
            Err(e) => {
                error!("Failed to run migrations: {}", e);
                Err(rocket)
            }
        }
    })
}
