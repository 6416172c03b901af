// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact CRUD routes.
//!
//! Id-scoped routes sit behind [`find_contact`], so their handlers receive
//! the already-resolved [`RequestedContact`]. Every handler failure goes
//! through [`OperationError`] for a consistent `{ message, error }` body.

use crate::error::{AppError, Operation, OperationError};
use crate::middleware::find_contact::{find_contact, RequestedContact};
use crate::models::{Contact, ContactSummary};
use crate::pagination::{PageMeta, Paginated, MAX_PER_PAGE};
use crate::routes::form::ContactForm;
use crate::validation::ContactPayload;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CONTACTS_PATH: &str = "/contacts";

/// Contact routes. The lookup middleware needs the state up front.
pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let scoped = Router::new()
        .route("/contacts/{id}", get(show).put(update).delete(destroy))
        .route_layer(middleware::from_fn_with_state(state, find_contact));

    Router::new()
        .route(CONTACTS_PATH, get(index).post(store))
        .merge(scoped)
}

/// `{ data }` envelope.
#[derive(Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// `{ message, data }` envelope.
#[derive(Serialize)]
pub struct MessageResponse<T> {
    pub message: &'static str,
    pub data: T,
}

fn failure(state: &AppState, operation: Operation) -> impl Fn(AppError) -> OperationError {
    let environment = state.config.environment;
    move |err| OperationError::new(operation, err, environment)
}

// ─── List ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListQuery {
    page: Option<u32>,
    #[serde(rename = "perPage")]
    per_page: Option<u32>,
}

/// List contacts, one page at a time, ordered by first name.
async fn index(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<DataResponse<Paginated<ContactSummary>>>, OperationError> {
    let fail = failure(&state, Operation::List);

    let Query(params) = query.map_err(|e| fail(AppError::BadRequest(e.body_text())))?;

    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(fail(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        )));
    }

    let per_page = params.per_page.unwrap_or(state.config.default_per_page);
    if per_page < 1 {
        return Err(fail(AppError::BadRequest(
            "perPage must be greater than 0".to_string(),
        )));
    }
    let per_page = per_page.min(MAX_PER_PAGE);

    tracing::debug!(page, per_page, "Listing contacts");

    let (mut rows, total) = state
        .db
        .list_contacts(page, per_page)
        .await
        .map_err(&fail)?;

    for row in &mut rows {
        if let Some(picture) = row.profile_picture_mut() {
            state.attachments.compute_url(picture);
        }
    }

    Ok(Json(DataResponse {
        data: Paginated {
            meta: PageMeta::new(CONTACTS_PATH, total, per_page, page),
            data: rows,
        },
    }))
}

// ─── Create ──────────────────────────────────────────────────

/// Create a contact from a validated payload.
async fn store(
    State(state): State<Arc<AppState>>,
    form: Result<ContactForm, AppError>,
) -> Result<(StatusCode, Json<MessageResponse<String>>), OperationError> {
    let fail = failure(&state, Operation::Store);

    let ContactForm(input) = form.map_err(&fail)?;

    let ContactPayload {
        fields,
        profile_picture,
    } = state
        .validator
        .validate(&input, &state.db, None)
        .await
        .map_err(&fail)?;

    let picture = match profile_picture {
        Some(file) => Some(state.attachments.store(&file).await.map_err(&fail)?),
        None => None,
    };

    let contact = Contact::create(fields, picture, chrono::Utc::now());

    if let Err(err) = state.db.insert_contact(&contact).await {
        if let Some(picture) = contact.profile_picture() {
            state.attachments.remove(picture).await;
        }
        return Err(fail(err));
    }

    tracing::info!(contact_id = %contact.id, "Contact created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Contact was created.",
            data: contact.id,
        }),
    ))
}

// ─── Show ────────────────────────────────────────────────────

/// Return the contact resolved by the lookup middleware.
async fn show(
    State(state): State<Arc<AppState>>,
    Extension(RequestedContact(mut contact)): Extension<RequestedContact>,
) -> Json<DataResponse<Contact>> {
    if let Some(picture) = contact.profile_picture_mut() {
        state.attachments.compute_url(picture);
    }
    Json(DataResponse { data: contact })
}

// ─── Update ──────────────────────────────────────────────────

/// Replace every writable field of a contact.
///
/// Responds 201 rather than 200; clients depend on it.
async fn update(
    State(state): State<Arc<AppState>>,
    Extension(RequestedContact(mut contact)): Extension<RequestedContact>,
    form: Result<ContactForm, AppError>,
) -> Result<(StatusCode, Json<MessageResponse<Contact>>), OperationError> {
    let fail = failure(&state, Operation::Update);

    let ContactForm(input) = form.map_err(&fail)?;

    let ContactPayload {
        fields,
        profile_picture,
    } = state
        .validator
        .validate(&input, &state.db, Some(&contact.id))
        .await
        .map_err(&fail)?;

    contact.merge(fields, chrono::Utc::now());

    let mut replaced = None;
    let mut stored = None;
    if let Some(file) = profile_picture {
        let picture = state.attachments.store(&file).await.map_err(&fail)?;
        stored = Some(picture.clone());
        replaced = contact.replace_profile_picture(picture);
    }

    if let Err(err) = state.db.update_contact(&contact).await {
        if let Some(picture) = &stored {
            state.attachments.remove(picture).await;
        }
        return Err(fail(err));
    }

    if let Some(old) = &replaced {
        state.attachments.remove(old).await;
    }

    tracing::info!(
        contact_id = %contact.id,
        picture_replaced = replaced.is_some(),
        "Contact updated"
    );

    if let Some(picture) = contact.profile_picture_mut() {
        state.attachments.compute_url(picture);
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Contact was edited",
            data: contact,
        }),
    ))
}

// ─── Destroy ─────────────────────────────────────────────────

/// Hard-delete a contact. Its stored picture, if any, is left in place.
///
/// Responds 201 rather than 200/204; clients depend on it.
async fn destroy(
    State(state): State<Arc<AppState>>,
    Extension(RequestedContact(contact)): Extension<RequestedContact>,
) -> Result<(StatusCode, Json<MessageResponse<String>>), OperationError> {
    let fail = failure(&state, Operation::Destroy);

    state
        .db
        .delete_contact(&contact.id)
        .await
        .map_err(&fail)?;

    tracing::info!(contact_id = %contact.id, "Contact deleted");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Contact was deleted",
            data: contact.id,
        }),
    ))
}
