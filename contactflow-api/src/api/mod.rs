pub mod contact_form;
pub mod export;
pub mod global_contact;
pub mod login;
pub mod logout;
pub mod session;
pub mod signup;
pub mod status;

use contactcore::{FlowError, TimeRemaining};
use rocket::Route;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    pub code: Option<String>,
}

pub type ApiError = Custom<Json<ErrorResponse>>;

pub fn api_error(status: Status, message: impl Into<String>, code: Option<&str>) -> ApiError {
    Custom(
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.map(str::to_string),
        }),
    )
}

/// HTTP status for each submission outcome.
pub fn flow_status(e: &FlowError) -> Status {
    match e {
        FlowError::NotFound => Status::NotFound,
        FlowError::Expired => Status::Gone,
        FlowError::Locked => Status::Forbidden,
        FlowError::Validation(_) => Status::UnprocessableEntity,
        FlowError::DuplicateContact => Status::Conflict,
        FlowError::Store(_) => Status::InternalServerError,
    }
}

pub fn flow_error(e: FlowError) -> ApiError {
    api_error(flow_status(&e), e.to_string(), Some(e.code()))
}

pub fn database_error(e: diesel::result::Error) -> ApiError {
    error!("Database error: {}", e);
    api_error(Status::InternalServerError, e.to_string(), Some("STORE_ERROR"))
}

pub fn session_not_found() -> ApiError {
    flow_error(FlowError::NotFound)
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct TimeRemainingResponse {
    #[ts(type = "number")]
    pub total_ms: i64,
    #[ts(type = "number")]
    pub hours: i64,
    #[ts(type = "number")]
    pub minutes: i64,
    #[ts(type = "number")]
    pub seconds: i64,
    /// `"<h>h <m>m <s>s"`, or `"Expired"`.
    pub display: String,
}

impl From<TimeRemaining> for TimeRemainingResponse {
    fn from(t: TimeRemaining) -> Self {
        TimeRemainingResponse {
            total_ms: t.total_ms,
            hours: t.hours,
            minutes: t.minutes,
            seconds: t.seconds,
            display: t.to_string(),
        }
    }
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(contact_form::routes());
    routes.extend(export::routes());
    routes.extend(global_contact::routes());
    routes.extend(login::routes());
    routes.extend(logout::routes());
    routes.extend(session::routes());
    routes.extend(signup::routes());
    routes.extend(status::routes());
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactcore::ValidationError;

    #[test]
    fn test_flow_error_statuses() {
        let cases = [
            (FlowError::NotFound, 404, "NOT_FOUND"),
            (FlowError::Expired, 410, "EXPIRED"),
            (FlowError::Locked, 403, "LOCKED"),
            (FlowError::Validation(ValidationError::InvalidPhone), 422, "VALIDATION_ERROR"),
            (FlowError::DuplicateContact, 409, "DUPLICATE_CONTACT"),
            (FlowError::Store("disk full".to_string()), 500, "STORE_ERROR"),
        ];
        for (error, code, name) in cases {
            let message = error.to_string();
            let Custom(status, Json(body)) = flow_error(error);
            assert_eq!(status.code, code);
            assert_eq!(body.code.as_deref(), Some(name));
            assert_eq!(body.error, message);
        }
    }
}
