// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Folio API: backend for a portfolio, blog and services site with an admin area.
//!
//! Content lives in Firestore; user roles and bans live in a relational side
//! store consulted by the authorization gate on every request.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::{Config, ConfigError};
use db::{ContentDb, UserStore};
use middleware::{IdentityVerifier, RouteRules};
use services::{AiService, EmailService, ReplayGuard, UserSyncService, WebhookVerifier};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub content: ContentDb,
    pub users: Arc<dyn UserStore>,
    pub user_sync: UserSyncService,
    pub identity: IdentityVerifier,
    pub rules: RouteRules,
    pub webhooks: WebhookVerifier,
    pub webhook_replays: ReplayGuard,
    pub email: EmailService,
    pub ai: AiService,
}

impl AppState {
    /// Wire services around the two stores.
    pub fn new(
        config: Config,
        content: ContentDb,
        users: Arc<dyn UserStore>,
    ) -> Result<Self, ConfigError> {
        let identity = IdentityVerifier::from_config(&config)?;
        let webhooks = WebhookVerifier::new(&config.identity_webhook_secret)
            .map_err(|e| ConfigError::Invalid("IDENTITY_WEBHOOK_SECRET", e.to_string()))?;
        let email = EmailService::new(config.email_api_key.clone(), config.email_from.clone());
        let ai = AiService::new(config.ai_api_key.clone(), config.ai_model.clone());

        Ok(Self {
            user_sync: UserSyncService::new(users.clone()),
            rules: RouteRules::default(),
            config,
            content,
            users,
            identity,
            webhooks,
            webhook_replays: ReplayGuard::new(),
            email,
            ai,
        })
    }
}
