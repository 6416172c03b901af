// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Contacts API: a CRUD REST service for contacts.
//!
//! Contacts are persisted in SQLite, validated against a declarative schema,
//! and may carry a profile picture stored on a pluggable disk.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod validation;

use config::Config;
use db::Database;
use services::AttachmentService;
use validation::ContactValidator;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub attachments: AttachmentService,
    pub validator: ContactValidator,
}

impl AppState {
    pub fn new(config: Config, db: Database, attachments: AttachmentService) -> Self {
        let validator = ContactValidator::new(config.email_unique_case_insensitive);
        Self {
            config,
            db,
            attachments,
            validator,
        }
    }
}
