// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact lookup middleware for id-scoped routes.

use crate::error::AppError;
use crate::models::Contact;
use crate::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Message returned when the `id` path segment matches no contact.
pub const UNKNOWN_CONTACT: &str = "Unknown contact was requested";

/// Contact resolved from the `id` path parameter.
#[derive(Debug, Clone)]
pub struct RequestedContact(pub Contact);

/// Middleware that resolves `{id}` into a [`RequestedContact`] extension.
///
/// Short-circuits with 400 when the id is missing and 404 when no contact
/// has that id, so handlers behind it can rely on the extension.
pub async fn find_contact(
    State(state): State<Arc<AppState>>,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = params
        .ok()
        .and_then(|Path(params)| params.get("id").cloned())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Contact ID not provided".to_string()))?;

    let contact = state.db.find_contact(&id).await?.ok_or_else(|| {
        tracing::debug!(contact_id = %id, "Requested contact not found");
        AppError::NotFound(UNKNOWN_CONTACT.to_string())
    })?;

    request.extensions_mut().insert(RequestedContact(contact));

    Ok(next.run(request).await)
}
