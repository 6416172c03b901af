// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact update tests.

use axum::http::StatusCode;
use common::{FilePart, TestApp};

mod common;

fn picture(file_name: &'static str, bytes: &[u8]) -> FilePart<'static> {
    FilePart {
        field: "profilePicture",
        file_name,
        content_type: "image/png",
        bytes: bytes.to_vec(),
    }
}

async fn create(app: &TestApp, email: &str, file: Option<FilePart<'_>>) -> String {
    let (status, body) = common::send(
        &app.router,
        common::multipart_request("POST", "/contacts", &common::valid_fields(email), file),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_update_keeping_own_email_succeeds() {
    let app = common::create_test_app().await;
    let id = create(&app, "self@example.com", None).await;

    let fields = common::with_field(
        common::valid_fields("self@example.com"),
        "jobTitle",
        "Mathematician",
    );
    let (status, body) = common::send(
        &app.router,
        common::form_request("PUT", &format!("/contacts/{id}"), &fields),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Contact was edited");
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["jobTitle"], "Mathematician");
    assert_eq!(body["data"]["email1"], "self@example.com");
}

#[tokio::test]
async fn test_update_to_other_contacts_email_rejected() {
    let app = common::create_test_app().await;
    create(&app, "first@example.com", None).await;
    let id = create(&app, "second@example.com", None).await;

    let (status, body) = common::send(
        &app.router,
        common::form_request(
            "PUT",
            &format!("/contacts/{id}"),
            &common::valid_fields("first@example.com"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "An error occurred while updating the contact.");
    assert_eq!(common::violation_fields(&body), vec!["email1".to_string()]);

    let stored = app.state.db.find_contact(&id).await.unwrap().unwrap();
    assert_eq!(stored.email1, "second@example.com");
}

#[tokio::test]
async fn test_update_replaces_every_writable_field() {
    let app = common::create_test_app().await;

    let fields = common::with_field(
        common::valid_fields("full@example.com"),
        "company",
        "Old Co",
    );
    let (_, body) = common::send(
        &app.router,
        common::form_request("POST", "/contacts", &fields),
    )
    .await;
    let id = body["data"].as_str().unwrap().to_string();
    let before = app.state.db.find_contact(&id).await.unwrap().unwrap();

    // Omitting an optional field clears it.
    let fields = common::with_field(common::valid_fields("full@example.com"), "city", "London");
    let (status, _) = common::send(
        &app.router,
        common::form_request("PUT", &format!("/contacts/{id}"), &fields),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let after = app.state.db.find_contact(&id).await.unwrap().unwrap();
    assert_eq!(after.company, None);
    assert_eq!(after.city.as_deref(), Some("London"));
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn test_update_validation_failure_leaves_record_unchanged() {
    let app = common::create_test_app().await;
    let id = create(&app, "stable@example.com", None).await;

    let fields = common::with_field(
        common::valid_fields("stable@example.com"),
        "firstName",
        "",
    );
    let (status, _) = common::send(
        &app.router,
        common::form_request("PUT", &format!("/contacts/{id}"), &fields),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let stored = app.state.db.find_contact(&id).await.unwrap().unwrap();
    assert_eq!(stored.first_name, "Ada");
}

#[tokio::test]
async fn test_update_replaces_picture_and_removes_old_file() {
    let app = common::create_test_app().await;
    let id = create(&app, "photo@example.com", Some(picture("old.png", b"old"))).await;

    let old = app.state.db.find_contact(&id).await.unwrap().unwrap();
    let old_name = old.profile_picture().unwrap().name.clone();
    assert!(app.disk.read(&format!("avatars/{old_name}")).is_some());

    let (status, body) = common::send(
        &app.router,
        common::multipart_request(
            "PUT",
            &format!("/contacts/{id}"),
            &common::valid_fields("photo@example.com"),
            Some(picture("new.png", b"new")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let new_name = body["data"]["profilePicture"]["name"].as_str().unwrap();
    assert_ne!(new_name, old_name);
    assert_eq!(
        body["data"]["profilePicture"]["url"],
        format!("/uploads/avatars/{new_name}")
    );
    assert_eq!(app.disk.len(), 1);
    assert!(app.disk.read(&format!("avatars/{old_name}")).is_none());
    assert_eq!(
        app.disk.read(&format!("avatars/{new_name}")),
        Some(b"new".to_vec())
    );
}

#[tokio::test]
async fn test_update_without_picture_keeps_existing_one() {
    let app = common::create_test_app().await;
    let id = create(&app, "keep@example.com", Some(picture("keep.png", b"img"))).await;

    let (status, body) = common::send(
        &app.router,
        common::multipart_request(
            "PUT",
            &format!("/contacts/{id}"),
            &common::valid_fields("keep@example.com"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["profilePicture"]["originalName"], "keep.png");
    assert_eq!(app.disk.len(), 1);
}

#[tokio::test]
async fn test_update_with_bad_picture_keeps_old_file() {
    let app = common::create_test_app().await;
    let id = create(&app, "bad@example.com", Some(picture("ok.png", b"img"))).await;

    let (status, _) = common::send(
        &app.router,
        common::multipart_request(
            "PUT",
            &format!("/contacts/{id}"),
            &common::valid_fields("bad@example.com"),
            Some(FilePart {
                field: "profilePicture",
                file_name: "script.exe",
                content_type: "application/octet-stream",
                bytes: b"MZ".to_vec(),
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.disk.len(), 1);
    let stored = app.state.db.find_contact(&id).await.unwrap().unwrap();
    assert_eq!(stored.profile_picture().unwrap().original_name, "ok.png");
}
