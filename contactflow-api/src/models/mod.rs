pub mod access_grant;
pub mod contact;
pub mod global_contact;
pub mod login_session;
pub mod session;
pub mod user;

// Re-export models for easier access
pub use access_grant::*;
pub use contact::*;
pub use global_contact::*;
pub use login_session::*;
pub use session::*;
pub use user::*;
