//! Session lifecycle: the validity window, the countdown and the password
//! gate.
//!
//! ```text
//! LOADING -> NOT_FOUND | LOCKED | UNLOCKED
//! LOCKED  -> UNLOCKED   (check_password succeeds)
//! LOCKED | UNLOCKED -> EXPIRED   (now >= expires_at)
//! ```
//!
//! `EXPIRED` is terminal for submission. Owners can still read and export.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Read access to the fields the lifecycle rules depend on.
///
/// Implemented by every session representation a store hands out, so the
/// rules work the same over the database model and the in-memory one.
pub trait SessionView {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn created_at(&self) -> NaiveDateTime;
    fn expires_at(&self) -> NaiveDateTime;
    fn session_password(&self) -> Option<&str>;
    fn contact_name_prefix(&self) -> Option<&str>;
}

/// True iff `now >= expires_at`.
pub fn is_expired<S: SessionView + ?Sized>(session: &S, now: NaiveDateTime) -> bool {
    now >= session.expires_at()
}

/// True iff the session carries a non-empty password.
pub fn requires_password<S: SessionView + ?Sized>(session: &S) -> bool {
    session.session_password().is_some_and(|p| !p.is_empty())
}

/// Exact, case-sensitive comparison against the stored password.
///
/// A session without a password accepts any attempt.
pub fn check_password<S: SessionView + ?Sized>(session: &S, attempt: &str) -> bool {
    match session.session_password() {
        Some(password) if !password.is_empty() => attempt == password,
        _ => true,
    }
}

/// Time left before a session expires, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub total_ms: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    pub fn is_zero(&self) -> bool {
        self.total_ms == 0
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "Expired")
        } else {
            write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
        }
    }
}

/// `max(0, expires_at - now)` split into hours, minutes and whole seconds.
///
/// Callers showing a countdown recompute this at least once per second from
/// the current wall clock.
pub fn time_remaining<S: SessionView + ?Sized>(session: &S, now: NaiveDateTime) -> TimeRemaining {
    let total_ms = (session.expires_at() - now).num_milliseconds().max(0);
    TimeRemaining {
        total_ms,
        hours: total_ms / 3_600_000,
        minutes: (total_ms % 3_600_000) / 60_000,
        seconds: (total_ms % 60_000) / 1_000,
    }
}

/// Where a submitter stands with respect to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    NotFound,
    Locked,
    Unlocked,
    Expired,
}

impl AccessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessState::NotFound => "not_found",
            AccessState::Locked => "locked",
            AccessState::Unlocked => "unlocked",
            AccessState::Expired => "expired",
        }
    }
}

/// A cached successful password check, scoped to one session.
///
/// The grant dies with the session's validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub session_id: String,
    pub expires_at: NaiveDateTime,
}

impl AccessGrant {
    /// Grant issued after `check_password` succeeded for `session`.
    pub fn for_session<S: SessionView + ?Sized>(session: &S) -> Self {
        AccessGrant {
            session_id: session.id().to_string(),
            expires_at: session.expires_at(),
        }
    }

    /// Whether this grant still unlocks `session` at `now`.
    pub fn unlocks<S: SessionView + ?Sized>(&self, session: &S, now: NaiveDateTime) -> bool {
        self.session_id == session.id() && now < self.expires_at && !is_expired(session, now)
    }
}

/// Resolves the submission state machine for a loaded (or missing) session.
///
/// Expiry wins over the password state.
pub fn resolve_access<S: SessionView + ?Sized>(
    session: Option<&S>,
    grant: Option<&AccessGrant>,
    now: NaiveDateTime,
) -> AccessState {
    let Some(session) = session else {
        return AccessState::NotFound;
    };
    if is_expired(session, now) {
        return AccessState::Expired;
    }
    if !requires_password(session) {
        return AccessState::Unlocked;
    }
    match grant {
        Some(grant) if grant.unlocks(session, now) => AccessState::Unlocked,
        _ => AccessState::Locked,
    }
}

/// Dashboard order: active sessions before expired ones, newest first within
/// each group.
pub fn sort_for_dashboard<S: SessionView>(sessions: &mut [S], now: NaiveDateTime) {
    sessions.sort_by(|a, b| {
        is_expired(a, now)
            .cmp(&is_expired(b, now))
            .then_with(|| b.created_at().cmp(&a.created_at()))
    });
}

/// Unit the session owner picks the duration in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Minutes,
    Hours,
}

impl DurationUnit {
    pub fn millis(&self) -> i64 {
        match self {
            DurationUnit::Minutes => 60_000,
            DurationUnit::Hours => 3_600_000,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionDraftError {
    #[error("Session name is required")]
    EmptyName,
    #[error("Duration must be a positive number")]
    NonPositiveDuration,
    #[error("Duration is too large")]
    DurationOverflow,
}

/// Owner input for a new session, before it gets an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDraft {
    pub name: String,
    pub duration_ms: i64,
    pub contact_name_prefix: Option<String>,
    pub whatsapp_link: Option<String>,
    pub session_password: Option<String>,
    pub owner_id: Option<i32>,
}

impl SessionDraft {
    /// Converts an amount in `unit` to milliseconds.
    pub fn duration_from(amount: i64, unit: DurationUnit) -> Result<i64, SessionDraftError> {
        if amount <= 0 {
            return Err(SessionDraftError::NonPositiveDuration);
        }
        amount
            .checked_mul(unit.millis())
            .ok_or(SessionDraftError::DurationOverflow)
    }

    /// Trims the text fields (the name prefix excepted), turns blank optionals
    /// into `None` and checks the name and duration.
    pub fn normalized(self) -> Result<SessionDraft, SessionDraftError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(SessionDraftError::EmptyName);
        }
        if self.duration_ms <= 0 {
            return Err(SessionDraftError::NonPositiveDuration);
        }
        Ok(SessionDraft {
            name,
            duration_ms: self.duration_ms,
            // Kept verbatim: a trailing space separates prefix and name.
            contact_name_prefix: self.contact_name_prefix.filter(|p| !p.trim().is_empty()),
            whatsapp_link: non_empty_trimmed(self.whatsapp_link),
            session_password: non_empty_trimmed(self.session_password),
            owner_id: self.owner_id,
        })
    }

    /// `created_at + duration`, the end of the validity window.
    pub fn expires_at(&self, created_at: NaiveDateTime) -> Result<NaiveDateTime, SessionDraftError> {
        created_at
            .checked_add_signed(Duration::milliseconds(self.duration_ms))
            .ok_or(SessionDraftError::DurationOverflow)
    }
}

pub(crate) fn non_empty_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Fixture {
        id: String,
        created_at: NaiveDateTime,
        expires_at: NaiveDateTime,
        password: Option<String>,
    }

    impl SessionView for Fixture {
        fn id(&self) -> &str {
            &self.id
        }
        fn name(&self) -> &str {
            "Fixture"
        }
        fn created_at(&self) -> NaiveDateTime {
            self.created_at
        }
        fn expires_at(&self) -> NaiveDateTime {
            self.expires_at
        }
        fn session_password(&self) -> Option<&str> {
            self.password.as_deref()
        }
        fn contact_name_prefix(&self) -> Option<&str> {
            None
        }
    }

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn fixture(duration_ms: i64, password: Option<&str>) -> Fixture {
        Fixture {
            id: "abc123".to_string(),
            created_at: t0(),
            expires_at: t0() + Duration::milliseconds(duration_ms),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let session = fixture(60_000, None);
        assert!(!is_expired(&session, t0() + Duration::milliseconds(59_999)));
        assert!(is_expired(&session, t0() + Duration::milliseconds(60_000)));
    }

    #[test]
    fn test_expiry_is_monotonic() {
        let session = fixture(5_000, None);
        let mut seen_expired = false;
        for step in 0..200 {
            let now = t0() + Duration::milliseconds(step * 50);
            let expired = is_expired(&session, now);
            assert!(!(seen_expired && !expired), "expiry flipped back at step {}", step);
            seen_expired |= expired;
        }
        assert!(seen_expired);
    }

    #[test]
    fn test_time_remaining_units() {
        let session = fixture(2 * 3_600_000 + 5 * 60_000 + 7_500, None);
        let remaining = time_remaining(&session, t0());
        assert_eq!(remaining.hours, 2);
        assert_eq!(remaining.minutes, 5);
        assert_eq!(remaining.seconds, 7);
        assert_eq!(remaining.to_string(), "2h 5m 7s");
    }

    #[test]
    fn test_time_remaining_clamps_to_zero() {
        let session = fixture(1_000, None);
        let remaining = time_remaining(&session, t0() + Duration::hours(1));
        assert_eq!(remaining.total_ms, 0);
        assert_eq!(remaining.to_string(), "Expired");
    }

    #[test]
    fn test_empty_password_is_password_free() {
        let session = fixture(60_000, Some(""));
        assert!(!requires_password(&session));
        assert_eq!(resolve_access(Some(&session), None, t0()), AccessState::Unlocked);
    }

    #[test]
    fn test_password_gate_transitions() {
        let session = fixture(60_000, Some("abc"));
        assert!(requires_password(&session));
        assert_eq!(resolve_access(Some(&session), None, t0()), AccessState::Locked);

        assert!(!check_password(&session, "abd"));
        assert!(!check_password(&session, "ABC"));
        assert_eq!(resolve_access(Some(&session), None, t0()), AccessState::Locked);

        assert!(check_password(&session, "abc"));
        let grant = AccessGrant::for_session(&session);
        assert_eq!(
            resolve_access(Some(&session), Some(&grant), t0()),
            AccessState::Unlocked
        );
    }

    #[test]
    fn test_grant_invalidated_by_expiry() {
        let session = fixture(60_000, Some("abc"));
        let grant = AccessGrant::for_session(&session);
        let later = t0() + Duration::milliseconds(60_000);
        assert!(!grant.unlocks(&session, later));
        assert_eq!(
            resolve_access(Some(&session), Some(&grant), later),
            AccessState::Expired
        );
    }

    #[test]
    fn test_grant_scoped_to_session() {
        let session = fixture(60_000, Some("abc"));
        let other = Fixture {
            id: "other".to_string(),
            ..fixture(60_000, Some("abc"))
        };
        let grant = AccessGrant::for_session(&other);
        assert_eq!(
            resolve_access(Some(&session), Some(&grant), t0()),
            AccessState::Locked
        );
    }

    #[test]
    fn test_missing_session_is_not_found() {
        assert_eq!(
            resolve_access::<Fixture>(None, None, t0()),
            AccessState::NotFound
        );
    }

    #[test]
    fn test_dashboard_order() {
        let at = |minutes: i64, duration_ms: i64, id: &str| Fixture {
            id: id.to_string(),
            created_at: t0() + Duration::minutes(minutes),
            expires_at: t0() + Duration::minutes(minutes) + Duration::milliseconds(duration_ms),
            password: None,
        };
        let now = t0() + Duration::minutes(30);
        let mut sessions = vec![
            at(0, 60_000, "old-expired"),
            at(1, 3_600_000, "old-active"),
            at(20, 60_000, "new-expired"),
            at(25, 3_600_000, "new-active"),
        ];
        sort_for_dashboard(&mut sessions, now);
        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["new-active", "old-active", "new-expired", "old-expired"]);
    }

    #[test]
    fn test_draft_normalization() {
        let draft = SessionDraft {
            name: "  Meetup  ".to_string(),
            duration_ms: SessionDraft::duration_from(30, DurationUnit::Minutes).unwrap(),
            contact_name_prefix: Some("  ".to_string()),
            whatsapp_link: Some(" https://chat.whatsapp.com/x ".to_string()),
            session_password: Some("".to_string()),
            owner_id: Some(4),
        }
        .normalized()
        .unwrap();

        assert_eq!(draft.name, "Meetup");
        assert_eq!(draft.duration_ms, 1_800_000);
        assert_eq!(draft.contact_name_prefix, None);
        assert_eq!(draft.whatsapp_link.as_deref(), Some("https://chat.whatsapp.com/x"));
        assert_eq!(draft.session_password, None);
        assert_eq!(draft.expires_at(t0()).unwrap(), t0() + Duration::minutes(30));

        let prefixed = SessionDraft {
            name: "Meetup".to_string(),
            duration_ms: 1,
            contact_name_prefix: Some("MU ".to_string()),
            ..Default::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(prefixed.contact_name_prefix.as_deref(), Some("MU "));
    }

    #[test]
    fn test_draft_rejects_bad_input() {
        let empty = SessionDraft {
            name: "   ".to_string(),
            duration_ms: 1,
            ..Default::default()
        };
        assert_eq!(empty.normalized(), Err(SessionDraftError::EmptyName));

        let zero = SessionDraft {
            name: "x".to_string(),
            duration_ms: 0,
            ..Default::default()
        };
        assert_eq!(zero.normalized(), Err(SessionDraftError::NonPositiveDuration));

        assert_eq!(
            SessionDraft::duration_from(-1, DurationUnit::Hours),
            Err(SessionDraftError::NonPositiveDuration)
        );
        assert_eq!(
            SessionDraft::duration_from(i64::MAX, DurationUnit::Hours),
            Err(SessionDraftError::DurationOverflow)
        );
    }
}
