//! Request guard for owner-only routes.
//!
//! ```rust,ignore
//! #[get("/1/Sessions")]
//! async fn list(user: AuthenticatedUser) -> String {
//!     format!("sessions of {}", user.user.email)
//! }
//! ```

use chrono::Utc;
use diesel::prelude::*;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::models::{LoginSession, User};
use crate::orm::login::LOGIN_COOKIE;
use crate::schema::{login_sessions, users};

/// The signed-in owner behind the `user_session` cookie.
///
/// Fails with 401 when the cookie is missing, or when its login session is
/// unknown, revoked or expired.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let Some(token) = request
            .cookies()
            .get(LOGIN_COOKIE)
            .map(|c| c.value().to_string())
        else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let lookup = db
            .run(move |conn| -> QueryResult<Option<User>> {
                let now = Utc::now().naive_utc();
                let login = login_sessions::table
                    .filter(login_sessions::id.eq(&token))
                    .filter(login_sessions::revoked.eq(false))
                    .filter(
                        login_sessions::expires_at
                            .is_null()
                            .or(login_sessions::expires_at.gt(now)),
                    )
                    .first::<LoginSession>(conn)
                    .optional()?;

                match login {
                    Some(login) => users::table
                        .filter(users::id.eq(login.user_id))
                        .first::<User>(conn)
                        .optional(),
                    None => Ok(None),
                }
            })
            .await;

        match lookup {
            Ok(Some(user)) => Outcome::Success(AuthenticatedUser { user }),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error validating login session: {:?}", e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}
