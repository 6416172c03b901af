// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contacts API Server
//!
//! CRUD REST API for contacts with profile picture uploads.

use contacts_api::{
    config::Config,
    db::Database,
    services::{AttachmentService, LocalDisk, AVATARS_FOLDER},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        environment = ?config.environment,
        "Starting Contacts API"
    );

    // Open database and apply migrations
    let db = Database::connect(&config.database_url).await?;
    db.set_email_case_insensitive(config.email_unique_case_insensitive)
        .await?;

    // Attachment disk
    let disk = LocalDisk::new(&config.storage_root, &config.storage_public_url);
    tracing::info!(root = ?disk.root(), "Attachment storage initialized");
    let attachments = AttachmentService::new(Arc::new(disk), AVATARS_FOLDER);

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, attachments));

    // Build router
    let app = contacts_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("contacts_api=debug,tower_http=info,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
