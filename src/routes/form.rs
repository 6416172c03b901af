// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact form extractor.
//!
//! Accepts `multipart/form-data` (text fields plus file parts),
//! `application/x-www-form-urlencoded`, JSON objects, and empty bodies, and
//! normalises all of them into a [`RawInput`]. Rejections keep the status
//! axum assigned them, e.g. 413 for a body over the configured limit.

use crate::error::AppError;
use crate::validation::{RawInput, UploadedFile};
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    Form, Json,
};
use serde_json::Value;
use std::collections::HashMap;

/// Raw contact payload pulled from the request body.
#[derive(Debug)]
pub struct ContactForm(pub RawInput);

impl<S> FromRequest<S> for ContactForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        let input = match content_type.as_deref() {
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;
                read_multipart(multipart).await?
            }
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;
                fields.into_iter().collect()
            }
            Some(ct) if ct.starts_with("application/json") => {
                let Json(object) =
                    Json::<serde_json::Map<String, Value>>::from_request(req, state)
                        .await
                        .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;
                from_json(object)
            }
            other => {
                let body = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;
                if !body.is_empty() {
                    return Err(AppError::rejected(
                        StatusCode::UNSUPPORTED_MEDIA_TYPE,
                        format!("Unsupported content type: {}", other.unwrap_or("none")),
                    ));
                }
                RawInput::default()
            }
        };

        Ok(ContactForm(input))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<RawInput, AppError> {
    let mut input = RawInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::rejected(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(client_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;

            // Browsers send an empty part for an untouched file input.
            if client_name.is_empty() && bytes.is_empty() {
                continue;
            }

            input.insert_file(
                name,
                UploadedFile {
                    client_name,
                    content_type,
                    bytes: bytes.to_vec(),
                },
            );
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::rejected(e.status(), e.body_text()))?;
            input.insert_field(name, text);
        }
    }

    Ok(input)
}

/// Flatten scalar JSON values to strings; nested values and nulls are
/// dropped so they read as absent.
fn from_json(object: serde_json::Map<String, Value>) -> RawInput {
    object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_flattens_scalars() {
        let object = json!({
            "firstName": "Ada",
            "postCode": 12345,
            "notes": null,
            "company": { "name": "nested" }
        });
        let Value::Object(object) = object else {
            unreachable!()
        };

        let input = from_json(object);
        assert_eq!(input.field("firstName"), Some("Ada"));
        assert_eq!(input.field("postCode"), Some("12345"));
        assert_eq!(input.field("notes"), None);
        assert_eq!(input.field("company"), None);
    }
}
