// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::config::Environment;
use crate::validation::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Request rejected by an extractor, keeping the rejection's status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Validation failed with {} error(s)", .0.len())]
    Validation(ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status carried by this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Rejected { status, .. } => *status,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Wrap an axum extractor rejection.
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// Error detail as rendered into the `error` field of a response body.
    fn detail(&self) -> Value {
        match self {
            AppError::Validation(errors) => json!({ "messages": errors }),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(format!("Migration failed: {}", err))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, error) = match &self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => (msg.clone(), None),
            AppError::Rejected { message, .. } => (message.clone(), None),
            AppError::Validation(_) => ("Validation failed".to_string(), Some(self.detail())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("Database error".to_string(), None)
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                ("Storage error".to_string(), None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("Internal server error".to_string(), None)
            }
        };

        (status, Json(ErrorResponse { message, error })).into_response()
    }
}

/// Contact handler operations, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Store,
    Show,
    Update,
    Destroy,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::List => "contacts.list",
            Operation::Store => "contacts.store",
            Operation::Show => "contacts.show",
            Operation::Update => "contacts.update",
            Operation::Destroy => "contacts.destroy",
        }
    }

    /// Stable message returned to clients when the operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "An error occurred while fetching the contacts.",
            Operation::Store => "An error occurred while creating the contact.",
            Operation::Show => "An error occurred while fetching the contact.",
            Operation::Update => "An error occurred while updating the contact.",
            Operation::Destroy => "An error occurred while deleting the contact.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure of a contact handler.
///
/// Renders `{ message, error }` where `message` is the operation's stable
/// failure message. Raw error detail is only echoed outside production,
/// except for validation failures which always carry their violations.
#[derive(Debug)]
pub struct OperationError {
    operation: Operation,
    error: AppError,
    expose_detail: bool,
}

impl OperationError {
    pub fn new(operation: Operation, error: AppError, environment: Environment) -> Self {
        Self {
            operation,
            expose_detail: !environment.is_production(),
            error,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }
}

impl IntoResponse for OperationError {
    fn into_response(self) -> Response {
        let status = self.error.status();

        if self.error.is_validation() {
            tracing::debug!(
                operation = %self.operation,
                error = %self.error,
                "Contact payload rejected"
            );
        } else {
            tracing::error!(
                operation = %self.operation,
                status = status.as_u16(),
                error = %self.error,
                "Contact operation failed"
            );
        }

        let error = if self.expose_detail || self.error.is_validation() {
            self.error.detail()
        } else {
            Value::Null
        };

        let body = json!({
            "message": self.operation.failure_message(),
            "error": error,
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
