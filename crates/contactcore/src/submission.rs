//! The contact submission flow.
//!
//! Order of checks: session lookup, expiry, password gate, validation,
//! duplicate pre-check, insert. The insert's own uniqueness check is final:
//! a racing submitter that slips past the pre-check still gets
//! [`FlowError::DuplicateContact`].

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::lifecycle::{AccessGrant, AccessState, SessionView, check_password, resolve_access};
use crate::store::{SessionStore, StoreError, is_duplicate};
use crate::validation::{ContactInput, ValidationError, validate};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Session not found")]
    NotFound,
    #[error("This contact collection session has ended")]
    Expired,
    #[error("Please enter the session password first")]
    Locked,
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("This phone number has already been submitted for this session")]
    DuplicateContact,
    #[error("{0}")]
    Store(String),
}

impl FlowError {
    /// Stable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            FlowError::NotFound => "NOT_FOUND",
            FlowError::Expired => "EXPIRED",
            FlowError::Locked => "LOCKED",
            FlowError::Validation(_) => "VALIDATION_ERROR",
            FlowError::DuplicateContact => "DUPLICATE_CONTACT",
            FlowError::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<StoreError> for FlowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateContact => FlowError::DuplicateContact,
            StoreError::Backend(message) => FlowError::Store(message),
        }
    }
}

impl From<AccessState> for Option<FlowError> {
    fn from(state: AccessState) -> Self {
        match state {
            AccessState::NotFound => Some(FlowError::NotFound),
            AccessState::Expired => Some(FlowError::Expired),
            AccessState::Locked => Some(FlowError::Locked),
            AccessState::Unlocked => None,
        }
    }
}

/// Checks `attempt` against a session's password.
///
/// On success returns the grant the caller may cache until the session
/// expires. A wrong attempt leaves the session locked.
pub fn unlock<T: SessionStore + ?Sized>(
    store: &mut T,
    session_id: &str,
    attempt: &str,
    now: NaiveDateTime,
) -> Result<AccessGrant, FlowError> {
    let session = store.get_session(session_id)?.ok_or(FlowError::NotFound)?;
    if crate::lifecycle::is_expired(&session, now) {
        return Err(FlowError::Expired);
    }
    if !check_password(&session, attempt) {
        return Err(FlowError::Locked);
    }
    Ok(AccessGrant::for_session(&session))
}

/// Runs a submission through every check and persists it.
pub fn submit_contact<T: SessionStore + ?Sized>(
    store: &mut T,
    session_id: &str,
    input: &ContactInput,
    grant: Option<&AccessGrant>,
    now: NaiveDateTime,
) -> Result<T::Contact, FlowError> {
    let session = store.get_session(session_id)?;
    let state = resolve_access(session.as_ref(), grant, now);
    if let Some(e) = Option::<FlowError>::from(state) {
        return Err(e);
    }
    let Some(session) = session else {
        return Err(FlowError::NotFound);
    };

    let contact = validate(input, session.contact_name_prefix())?;

    if is_duplicate(store, session.id(), &contact.phone)? {
        return Err(FlowError::DuplicateContact);
    }

    Ok(store.insert_contact(session.id(), &contact, now)?)
}
