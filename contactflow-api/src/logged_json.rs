//! A JSON data guard that writes each parsed request body to the log.
//!
//! Use it in place of `Json<T>` on mutating endpoints whose bodies carry no
//! secrets. Endpoints receiving passwords keep plain `Json<T>`.

use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{
    Data, Request,
    data::{self, FromData},
};

pub struct LoggedJson<T>(pub T);

impl<T> LoggedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for LoggedJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// `METHOD /path | Data: {...}`
fn log_line(method: &str, path: &str, body: Option<&str>) -> String {
    format!(
        "{} {} | Data: {}",
        method,
        path,
        body.unwrap_or("<failed to serialize>")
    )
}

#[rocket::async_trait]
impl<'r, T: Deserialize<'r> + Serialize> FromData<'r> for LoggedJson<T> {
    type Error = rocket::serde::json::Error<'r>;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        match Json::<T>::from_data(req, data).await {
            data::Outcome::Success(json) => {
                let body = serde_json::to_string(&json.0).ok();
                info!(
                    "{}",
                    log_line(req.method().as_str(), req.uri().path().as_str(), body.as_deref())
                );
                data::Outcome::Success(LoggedJson(json.into_inner()))
            }
            data::Outcome::Error(e) => data::Outcome::Error(e),
            data::Outcome::Forward(f) => data::Outcome::Forward(f),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LoggedJson<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line() {
        assert_eq!(
            log_line("POST", "/api/1/contact/abc", Some(r#"{"name":"Jo"}"#)),
            r#"POST /api/1/contact/abc | Data: {"name":"Jo"}"#
        );
        assert_eq!(
            log_line("POST", "/x", None),
            "POST /x | Data: <failed to serialize>"
        );
    }
}
