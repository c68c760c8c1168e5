// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Folio API Server
//!
//! Serves portfolio, blog and services content with an admin backend.

use folio_api::{
    config::Config,
    db::{ContentDb, InMemoryUserStore, PgUserStore, UserStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Folio API");

    // Content store; connects (with retry) before we accept traffic
    let content = ContentDb::new(&config.gcp_project_id);
    content.warm_up().await;

    // User side store
    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => Arc::new(PgUserStore::new(url)),
        None => {
            tracing::warn!(
                "DATABASE_URL not set, using in-memory user store (roles are not persisted)"
            );
            Arc::new(InMemoryUserStore::new())
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), content, users)?);

    // Build router
    let app = folio_api::routes::create_router(state);

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

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("folio_api=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
