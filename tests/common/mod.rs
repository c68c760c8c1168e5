// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::Utc;
use folio_api::config::Config;
use folio_api::db::{ContentDb, InMemoryUserStore, UserStore};
use folio_api::error::AppError;
use folio_api::middleware::auth::create_session_token;
use folio_api::models::{RoleFlags, RoleUpdate, UserProfile, UserRecord};
use folio_api::routes::create_router;
use folio_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a content store against the emulator.
#[allow(dead_code)]
pub async fn test_content_db() -> ContentDb {
    let db = ContentDb::new("test-project");
    db.warm_up().await;
    db
}

/// A user row with the given flags.
#[allow(dead_code)]
pub fn user(id: &str, is_admin: bool, is_banned: bool) -> UserRecord {
    let now = Utc::now();
    UserRecord {
        external_auth_id: id.to_string(),
        email: Some(format!("{}@example.com", id)),
        first_name: None,
        last_name: None,
        image_url: None,
        is_admin,
        is_banned,
        created_at: now,
        updated_at: now,
    }
}

/// Session token for `id`, signed with the test config key.
#[allow(dead_code)]
pub fn token_for(id: &str) -> String {
    let profile = UserProfile {
        external_auth_id: id.to_string(),
        email: Some(format!("{}@example.com", id)),
        ..Default::default()
    };
    create_session_token(&profile, &Config::test_default().identity_jwt_key)
        .expect("Failed to sign test token")
}

/// User store whose every call fails, as if the side store were unreachable.
#[allow(dead_code)]
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn role_flags(&self, _: &str) -> Result<Option<RoleFlags>, AppError> {
        Err(AppError::Database("connection refused".to_string()))
    }
    async fn upsert_profile(&self, _: &UserProfile) -> Result<UserRecord, AppError> {
        Err(AppError::Database("connection refused".to_string()))
    }
    async fn get_user(&self, _: &str) -> Result<Option<UserRecord>, AppError> {
        Err(AppError::Database("connection refused".to_string()))
    }
    async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        Err(AppError::Database("connection refused".to_string()))
    }
    async fn set_flags(&self, _: &str, _: RoleUpdate) -> Result<Option<UserRecord>, AppError> {
        Err(AppError::Database("connection refused".to_string()))
    }
    async fn delete_user(&self, _: &str) -> Result<bool, AppError> {
        Err(AppError::Database("connection refused".to_string()))
    }
}

/// Create a test app with an offline content store and the given user store.
#[allow(dead_code)]
pub fn create_test_app_with(users: Arc<dyn UserStore>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(Config::test_default(), ContentDb::new_mock(), users)
            .expect("Test config should be valid"),
    );
    (create_router(state.clone()), state)
}

/// Create a test app backed by an in-memory user store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, InMemoryUserStore) {
    let users = InMemoryUserStore::new();
    let (app, _) = create_test_app_with(Arc::new(users.clone()));
    (app, users)
}
