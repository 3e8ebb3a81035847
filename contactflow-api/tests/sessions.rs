//! Owner dashboard: creating, listing, viewing and deleting sessions.

#[macro_use]
extern crate time_test;

use chrono::{Duration, Utc};
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use contactflow_api::DbConn;
use contactflow_api::orm::session::insert_session_with_seed;
use contactflow_api::orm::testing::{sample_session, test_rocket};

/// Signs up (and in) a fresh owner, returning their user id.
async fn sign_up(client: &Client, email: &str) -> i64 {
    let response = client
        .post("/api/1/signup")
        .json(&json!({ "email": email, "password": "hunter22" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let body: Value = response.into_json().await.unwrap();
    body["user_id"].as_i64().unwrap()
}

async fn create_session(client: &Client, body: Value) -> (Status, Value) {
    let response = client.post("/api/1/Sessions").json(&body).dispatch().await;
    let status = response.status();
    (status, response.into_json().await.unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_create_session() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_create_session");
    sign_up(&client, "owner@example.com").await;

    let (status, body) = create_session(
        &client,
        json!({
            "name": "  Launch party ",
            "duration": 2,
            "duration_unit": "hours",
            "contact_name_prefix": "LP ",
            "whatsapp_link": "   ",
            "session_password": "letmein"
        }),
    )
    .await;

    assert_eq!(status, Status::Created);
    assert_eq!(body["name"], "Launch party");
    assert_eq!(body["duration_ms"], 7_200_000);
    assert_eq!(body["contact_name_prefix"], "LP ");
    assert!(body["whatsapp_link"].is_null());
    assert_eq!(body["requires_password"], true);
    assert!(body.get("session_password").is_none());
    assert_eq!(body["state"], "active");
    assert_eq!(body["contact_count"], 0);

    let id = body["id"].as_str().unwrap();
    assert_eq!(
        body["share_link"],
        format!("http://localhost:8000/contact/{}", id)
    );
    let remaining = body["time_remaining"]["total_ms"].as_i64().unwrap();
    assert!(remaining > 7_100_000 && remaining <= 7_200_000);
}

#[tokio::test]
async fn test_create_session_defaults_to_minutes() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    sign_up(&client, "owner@example.com").await;

    let (status, body) =
        create_session(&client, json!({ "name": "Meetup", "duration": 30 })).await;
    assert_eq!(status, Status::Created);
    assert_eq!(body["duration_ms"], 1_800_000);
    assert_eq!(body["requires_password"], false);
}

#[tokio::test]
async fn test_create_session_rejects_bad_input() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_create_session_rejects_bad_input");
    sign_up(&client, "owner@example.com").await;

    let (status, body) = create_session(&client, json!({ "name": "  ", "duration": 5 })).await;
    assert_eq!(status, Status::UnprocessableEntity);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "Session name is required");

    for duration in [0, -5] {
        let (status, body) =
            create_session(&client, json!({ "name": "Meetup", "duration": duration })).await;
        assert_eq!(status, Status::UnprocessableEntity);
        assert_eq!(body["error"], "Duration must be a positive number");
    }

    let (status, _) = create_session(
        &client,
        json!({ "name": "Forever", "duration": i64::MAX, "duration_unit": "hours" }),
    )
    .await;
    assert_eq!(status, Status::UnprocessableEntity);
}

#[tokio::test]
async fn test_create_session_requires_login() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let (status, _) = create_session(&client, json!({ "name": "Meetup", "duration": 5 })).await;
    assert_eq!(status, Status::Unauthorized);
}

#[tokio::test]
async fn test_dashboard_order() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_dashboard_order");
    let owner = sign_up(&client, "owner@example.com").await;

    // Two expired sessions, created an hour apart.
    let conn = DbConn::get_one(client.rocket())
        .await
        .expect("database connection");
    conn.run(move |c| {
        let now = Utc::now().naive_utc();
        for (id, hours_ago) in [("old-expired", 5), ("new-expired", 4)] {
            let mut session = sample_session(id, Some(owner as i32));
            session.created_at = now - Duration::hours(hours_ago);
            session.expires_at = session.created_at + Duration::minutes(10);
            insert_session_with_seed(c, &session, &[]).unwrap();
        }
    })
    .await;

    let (_, first) = create_session(&client, json!({ "name": "First", "duration": 5 })).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (_, second) = create_session(&client, json!({ "name": "Second", "duration": 5 })).await;

    let response = client.get("/api/1/Sessions").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let sessions: Vec<Value> = response.into_json().await.unwrap();
    let ids: Vec<&str> = sessions.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(
        ids,
        [
            second["id"].as_str().unwrap(),
            first["id"].as_str().unwrap(),
            "new-expired",
            "old-expired"
        ]
    );
    assert_eq!(sessions[2]["state"], "expired");
    assert_eq!(sessions[2]["time_remaining"]["display"], "Expired");
    assert_eq!(sessions[2]["time_remaining"]["total_ms"], 0);
}

#[tokio::test]
async fn test_sessions_are_private_to_their_owner() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_sessions_are_private_to_their_owner");

    sign_up(&client, "alice@example.com").await;
    let (_, session) = create_session(&client, json!({ "name": "Alice's", "duration": 5 })).await;
    let id = session["id"].as_str().unwrap().to_string();

    // The tracked client now carries Bob's login cookie.
    sign_up(&client, "bob@example.com").await;
    let listed: Vec<Value> = client
        .get("/api/1/Sessions")
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    let uri = format!("/api/1/Sessions/{}", id);
    let foreign = client.get(uri.as_str()).dispatch().await;
    assert_eq!(foreign.status(), Status::NotFound);
    let body: Value = foreign.into_json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");

    let contacts = client.get(format!("{}/Contacts", uri)).dispatch().await;
    assert_eq!(contacts.status(), Status::NotFound);

    assert_eq!(client.delete(uri.as_str()).dispatch().await.status(), Status::NotFound);

    // Still there for Alice.
    client
        .post("/api/1/login")
        .json(&json!({ "email": "alice@example.com", "password": "hunter22" }))
        .dispatch()
        .await;
    assert_eq!(client.get(uri.as_str()).dispatch().await.status(), Status::Ok);
}

#[tokio::test]
async fn test_delete_session_removes_contacts() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_delete_session_removes_contacts");
    sign_up(&client, "owner@example.com").await;

    let (_, session) = create_session(&client, json!({ "name": "Meetup", "duration": 5 })).await;
    let id = session["id"].as_str().unwrap().to_string();
    let submitted = client
        .post(format!("/api/1/contact/{}", id))
        .json(&json!({ "name": "Jo", "phone": "+12015551111" }))
        .dispatch()
        .await;
    assert_eq!(submitted.status(), Status::Created);

    let uri = format!("/api/1/Sessions/{}", id);
    assert_eq!(client.delete(uri.as_str()).dispatch().await.status(), Status::NoContent);
    assert_eq!(client.get(uri.as_str()).dispatch().await.status(), Status::NotFound);
    assert_eq!(client.delete(uri.as_str()).dispatch().await.status(), Status::NotFound);

    let public = client.get(format!("/api/1/contact/{}", id)).dispatch().await;
    assert_eq!(public.status(), Status::NotFound);

    let conn = DbConn::get_one(client.rocket())
        .await
        .expect("database connection");
    let remaining = conn
        .run(move |c| contactflow_api::orm::contact::list_contacts(c, &id))
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_session_contacts_newest_first() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_session_contacts_newest_first");
    sign_up(&client, "owner@example.com").await;

    let (_, session) = create_session(
        &client,
        json!({ "name": "Meetup", "duration": 5, "contact_name_prefix": "M_" }),
    )
    .await;
    let id = session["id"].as_str().unwrap();

    for (name, phone) in [("Ann", "+12015550001"), ("Ben", "+12015550002")] {
        let response = client
            .post(format!("/api/1/contact/{}", id))
            .json(&json!({ "name": name, "phone": phone }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let response = client
        .get(format!("/api/1/Sessions/{}/Contacts", id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let contacts: Vec<Value> = response.into_json().await.unwrap();
    let names: Vec<&str> = contacts.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["M_Ben", "M_Ann"]);

    let detail: Value = client
        .get(format!("/api/1/Sessions/{}", id))
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(detail["contact_count"], 2);
}
