// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tests for id-scoped routes: show, destroy, and unknown ids.

use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn test_unknown_id_is_not_found_everywhere() {
    let app = common::create_test_app().await;
    let uri = "/contacts/does-not-exist";

    let requests = [
        common::get(uri),
        common::form_request("PUT", uri, &common::valid_fields("ghost@example.com")),
        common::delete(uri),
    ];

    for request in requests {
        let method = request.method().clone();
        let (status, body) = common::send(&app.router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(body["message"], "Unknown contact was requested", "{method}");
    }
}

#[tokio::test]
async fn test_unknown_id_update_does_not_validate() {
    let app = common::create_test_app().await;

    // An invalid payload still gets 404: the lookup runs first.
    let (status, _) = common::send(
        &app.router,
        common::form_request("PUT", "/contacts/missing", &[]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_show_existing_contact() {
    let app = common::create_test_app().await;
    let contacts = common::seed_contacts(&app.state.db, 2).await;
    let contact = &contacts[1];

    let (status, body) =
        common::send(&app.router, common::get(&format!("/contacts/{}", contact.id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], contact.id);
    assert_eq!(body["data"]["email1"], contact.email1);
}

#[tokio::test]
async fn test_destroy_then_show_is_not_found() {
    let app = common::create_test_app().await;
    let contacts = common::seed_contacts(&app.state.db, 2).await;
    let uri = format!("/contacts/{}", contacts[0].id);

    let (status, body) = common::send(&app.router, common::delete(&uri)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Contact was deleted");
    assert_eq!(body["data"], contacts[0].id);

    let (status, _) = common::send(&app.router, common::get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::send(&app.router, common::delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(app.state.db.count_contacts().await.unwrap(), 1);
}

#[tokio::test]
async fn test_deleted_email_can_be_reused() {
    let app = common::create_test_app().await;
    let fields = common::valid_fields("reuse@example.com");

    let (_, body) = common::send(
        &app.router,
        common::form_request("POST", "/contacts", &fields),
    )
    .await;
    let id = body["data"].as_str().unwrap().to_string();

    let (status, _) =
        common::send(&app.router, common::delete(&format!("/contacts/{id}"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = common::send(
        &app.router,
        common::form_request("POST", "/contacts", &fields),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}
