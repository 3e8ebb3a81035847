//! Core rules for time-limited contact collection sessions.
//!
//! A session is a shareable, optionally password-gated window during which
//! third parties submit their contact details. This crate owns the parts of
//! that flow that are pure logic:
//!
//! - [`lifecycle`]: expiry, countdown and the password gate
//! - [`validation`]: contact input checks and phone normalization
//! - [`store`]: the persistence boundary and the duplicate guard
//! - [`memory`]: an in-process store implementation
//! - [`submission`]: the end-to-end submission flow
//! - [`export`]: VCF and CSV rendering
//!
//! Nothing here reads the clock. Every time-dependent operation takes `now`
//! from the caller.

pub mod export;
pub mod lifecycle;
pub mod memory;
pub mod store;
pub mod submission;
pub mod validation;

pub use export::{ExportFormat, export_filename, to_csv, to_vcf};
pub use lifecycle::{
    AccessGrant, AccessState, DurationUnit, SessionDraft, SessionDraftError, SessionView,
    TimeRemaining, check_password, is_expired, requires_password, resolve_access, sort_for_dashboard,
    time_remaining,
};
pub use memory::{MemoryStore, StoredContact, StoredSession};
pub use store::{ContactView, NewSession, SessionStore, StoreError, is_duplicate};
pub use submission::{FlowError, submit_contact, unlock};
pub use validation::{ContactInput, ValidContact, ValidationError, normalize_phone, validate};
