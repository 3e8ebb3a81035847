pub mod access_grant;
pub mod contact;
mod db;
pub mod global_contact;
pub mod login;
pub mod logout;
pub mod session;
pub mod store;
#[cfg(any(test, feature = "test-staging"))]
pub mod testing;
pub mod user;

pub use db::*;
pub use store::SqliteStore;
