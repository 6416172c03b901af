// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use contacts_api::config::Config;
use contacts_api::db::Database;
use contacts_api::models::{Contact, ContactFields};
use contacts_api::routes::create_router;
use contacts_api::services::{AttachmentService, FakeDisk, AVATARS_FOLDER};
use contacts_api::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "contacts-test-boundary";

/// Router plus handles on its dependencies.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub disk: Arc<FakeDisk>,
}

/// Create a test app backed by an in-memory database and a fake disk.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> TestApp {
    let db = Database::in_memory()
        .await
        .expect("Failed to open in-memory database");
    db.set_email_case_insensitive(config.email_unique_case_insensitive)
        .await
        .expect("Failed to apply email uniqueness rule");
    let disk = Arc::new(FakeDisk::new(config.storage_public_url.clone()));
    let attachments = AttachmentService::new(disk.clone(), AVATARS_FOLDER);
    let state = Arc::new(AppState::new(config, db, attachments));

    TestApp {
        router: create_router(state.clone()),
        state,
        disk,
    }
}

/// Send a request and decode the JSON body (`Value::Null` when empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// URL-encoded form request.
#[allow(dead_code)]
pub fn form_request(method: &str, uri: &str, fields: &[(&str, String)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

/// A file part for [`multipart_request`].
#[allow(dead_code)]
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: Vec<u8>,
}

/// Multipart request with text fields and an optional file part.
#[allow(dead_code)]
pub fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, String)],
    file: Option<FilePart<'_>>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Minimal valid contact form.
#[allow(dead_code)]
pub fn valid_fields(email: &str) -> Vec<(&'static str, String)> {
    vec![
        ("firstName", "Ada".to_string()),
        ("surname", "Lovelace".to_string()),
        ("email1", email.to_string()),
        ("phoneNumber1", "+44 20 7946 0000".to_string()),
    ]
}

/// Replace (or add) one field of a form.
#[allow(dead_code)]
pub fn with_field(
    mut fields: Vec<(&'static str, String)>,
    name: &'static str,
    value: impl Into<String>,
) -> Vec<(&'static str, String)> {
    fields.retain(|(n, _)| *n != name);
    fields.push((name, value.into()));
    fields
}

/// Insert `count` contacts directly, in an order that differs from
/// first-name order.
#[allow(dead_code)]
pub async fn seed_contacts(db: &Database, count: usize) -> Vec<Contact> {
    let mut contacts = Vec::with_capacity(count);
    for i in 0..count {
        let fields = ContactFields {
            first_name: format!("Name{:03}", (i * 37 + 11) % 101),
            surname: "Seeded".to_string(),
            email1: format!("seed{i}@example.com"),
            phone_number1: format!("555-{i:04}"),
            ..Default::default()
        };
        let contact = Contact::create(fields, None, Utc::now());
        db.insert_contact(&contact)
            .await
            .expect("Failed to seed contact");
        contacts.push(contact);
    }
    contacts
}

/// Ids of `contacts` in list order (first name, then id).
#[allow(dead_code)]
pub fn sorted_ids(contacts: &[Contact]) -> Vec<String> {
    let mut keyed: Vec<(&str, &str)> = contacts
        .iter()
        .map(|c| (c.first_name.as_str(), c.id.as_str()))
        .collect();
    keyed.sort();
    keyed.into_iter().map(|(_, id)| id.to_string()).collect()
}

/// Field names of every violation in a 422 body.
#[allow(dead_code)]
pub fn violation_fields(body: &Value) -> Vec<String> {
    violations(body)
        .iter()
        .map(|v| v["field"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn violations(body: &Value) -> Vec<Value> {
    body["error"]["messages"]["errors"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}
