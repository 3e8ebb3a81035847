//! The global contact list and how new sessions inherit it.

#[macro_use]
extern crate time_test;

use std::io::Write;

use rocket::error::ErrorKind;
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use contactflow_api::build_rocket;
use contactflow_api::orm::testing::{test_figment, test_rocket, test_rocket_with_seed};

async fn sign_up(client: &Client) {
    let response = client
        .post("/api/1/signup")
        .json(&json!({ "email": "owner@example.com", "password": "hunter22" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
}

async fn list_globals(client: &Client) -> Vec<Value> {
    let response = client.get("/api/1/GlobalContacts").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    response.into_json().await.unwrap()
}

#[tokio::test]
async fn test_global_contact_crud() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_global_contact_crud");
    sign_up(&client).await;
    assert!(list_globals(&client).await.is_empty());

    let created = client
        .post("/api/1/GlobalContacts")
        .json(&json!({ "name": " Front desk ", "phone": "+1 201 555 0000", "company": "HQ" }))
        .dispatch()
        .await;
    assert_eq!(created.status(), Status::Created);
    let created: Value = created.into_json().await.unwrap();
    assert_eq!(created["name"], "Front desk");
    assert_eq!(created["phone"], "+12015550000");

    let duplicate = client
        .post("/api/1/GlobalContacts")
        .json(&json!({ "name": "Reception", "phone": "+12015550000" }))
        .dispatch()
        .await;
    assert_eq!(duplicate.status(), Status::Conflict);
    let body: Value = duplicate.into_json().await.unwrap();
    assert_eq!(body["code"], "DUPLICATE_CONTACT");

    let invalid = client
        .post("/api/1/GlobalContacts")
        .json(&json!({ "name": "Reception", "phone": "0100000" }))
        .dispatch()
        .await;
    assert_eq!(invalid.status(), Status::UnprocessableEntity);

    let listed = list_globals(&client).await;
    assert_eq!(listed.len(), 1);

    let uri = format!("/api/1/GlobalContacts/{}", created["id"]);
    assert_eq!(client.delete(uri.as_str()).dispatch().await.status(), Status::NoContent);
    assert_eq!(client.delete(uri.as_str()).dispatch().await.status(), Status::NotFound);
    assert!(list_globals(&client).await.is_empty());
}

#[tokio::test]
async fn test_new_sessions_copy_global_contacts() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    time_test!("test_new_sessions_copy_global_contacts");
    sign_up(&client).await;

    client
        .post("/api/1/GlobalContacts")
        .json(&json!({ "name": "Front desk", "phone": "+12015550000" }))
        .dispatch()
        .await;

    let session: Value = client
        .post("/api/1/Sessions")
        .json(&json!({ "name": "Meetup", "duration": 10, "contact_name_prefix": "M_" }))
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(session["contact_count"], 1);
    let id = session["id"].as_str().unwrap();

    let contacts: Vec<Value> = client
        .get(format!("/api/1/Sessions/{}/Contacts", id))
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(contacts.len(), 1);
    // Copied as-is, no prefix, stamped with the session's creation time.
    assert_eq!(contacts[0]["name"], "Front desk");
    assert_eq!(contacts[0]["submitted_at"], session["created_at"]);

    // A seeded phone counts for duplicate detection.
    let response = client
        .post(format!("/api/1/contact/{}", id))
        .json(&json!({ "name": "Someone", "phone": "+1 201 555 0000" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    // Removing the global contact leaves the session's copy alone.
    let globals = list_globals(&client).await;
    client
        .delete(format!("/api/1/GlobalContacts/{}", globals[0]["id"]))
        .dispatch()
        .await;
    let contacts: Vec<Value> = client
        .get(format!("/api/1/Sessions/{}/Contacts", id))
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(contacts.len(), 1);
}

#[tokio::test]
async fn test_seed_file_loaded_at_ignition() {
    let mut seed = tempfile::NamedTempFile::new().unwrap();
    write!(
        seed,
        r#"
[[contacts]]
name = "Front desk"
phone = "+1 201 555 0000"
email = "desk@example.com"

[[contacts]]
name = "Missing country code"
phone = "2015550001"

[[contacts]]
name = "Front desk again"
phone = "+12015550000"
"#
    )
    .unwrap();

    let client = Client::tracked(test_rocket_with_seed(seed.path()))
        .await
        .unwrap();
    time_test!("test_seed_file_loaded_at_ignition");
    sign_up(&client).await;

    let globals = list_globals(&client).await;
    assert_eq!(globals.len(), 1);
    assert_eq!(globals[0]["name"], "Front desk");
    assert_eq!(globals[0]["email"], "desk@example.com");
}

#[tokio::test]
async fn test_unreadable_seed_file_fails_ignition() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = Client::tracked(test_rocket_with_seed(&missing))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::FailedFairings(_)));
}

#[tokio::test]
async fn test_malformed_config_fails_seeding() {
    let mut seed = tempfile::NamedTempFile::new().unwrap();
    write!(seed, "[[contacts]]\nname = \"Desk\"\nphone = \"+12015550000\"\n").unwrap();
    let figment = test_figment()
        .merge(("seed_file", seed.path().display().to_string()))
        .merge(("secure_cookies", "maybe"));

    let err = Client::tracked(build_rocket(figment)).await.unwrap_err();
    match err.kind() {
        ErrorKind::FailedFairings(failures) => {
            assert!(failures.iter().any(|f| f.name == "Global Contact Seed"));
        }
        other => panic!("unexpected launch error: {:?}", other),
    }
}
