use rocket::Route;
use rocket::http::{Cookie, CookieJar};
use rocket::serde::json::{Json, Value, json};

use crate::DbConn;
use crate::orm::login::LOGIN_COOKIE;
use crate::orm::logout::revoke_login_session;

/// `POST /api/1/logout`: revokes the login session, if any, and drops the
/// cookie. Always succeeds.
#[post("/1/logout")]
pub async fn logout(db: DbConn, cookies: &CookieJar<'_>) -> Json<Value> {
    let token = cookies.get(LOGIN_COOKIE).map(|c| c.value().to_string());

    if let Some(token) = token {
        if let Err(e) = revoke_login_session(&db, &token).await {
            warn!("Failed to revoke login session: {}", e);
        }
        cookies.remove(Cookie::build(LOGIN_COOKIE).path("/"));
    }

    Json(json!({
        "message": "Logout successful",
        "status": "ok"
    }))
}

pub fn routes() -> Vec<Route> {
    routes![logout]
}
