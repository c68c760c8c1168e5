// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider → side store sync tests.

use async_trait::async_trait;
use folio_api::db::{InMemoryUserStore, UserStore};
use folio_api::error::AppError;
use folio_api::models::{RoleFlags, RoleUpdate, UserProfile, UserRecord};
use folio_api::services::user_sync::SyncError;
use folio_api::services::UserSyncService;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Wraps an in-memory store and injects failures.
struct FlakyStore {
    inner: InMemoryUserStore,
    /// Number of upserts that fail before one succeeds
    write_failures: AtomicU32,
    /// When set, writes succeed but the row never becomes visible
    never_visible: bool,
    writes: AtomicU32,
}

impl FlakyStore {
    fn new(write_failures: u32) -> Self {
        Self {
            inner: InMemoryUserStore::new(),
            write_failures: AtomicU32::new(write_failures),
            never_visible: false,
            writes: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn role_flags(&self, id: &str) -> Result<Option<RoleFlags>, AppError> {
        if self.never_visible {
            return Ok(None);
        }
        self.inner.role_flags(id).await
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserRecord, AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let remaining = self.write_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.write_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::Database("connection reset".to_string()));
        }
        self.inner.upsert_profile(profile).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserRecord>, AppError> {
        self.inner.get_user(id).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        self.inner.list_users().await
    }

    async fn set_flags(&self, id: &str, update: RoleUpdate) -> Result<Option<UserRecord>, AppError> {
        self.inner.set_flags(id, update).await
    }

    async fn delete_user(&self, id: &str) -> Result<bool, AppError> {
        self.inner.delete_user(id).await
    }
}

fn profile(id: &str, email: &str) -> UserProfile {
    UserProfile {
        external_auth_id: id.to_string(),
        email: Some(email.to_string()),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
        image_url: None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_sync_creates_unprivileged_user() {
    let store = Arc::new(InMemoryUserStore::new());
    let sync = UserSyncService::new(store.clone());

    let record = sync.sync(&profile("user_1", "ada@example.com")).await.unwrap();

    assert_eq!(record.email.as_deref(), Some("ada@example.com"));
    assert!(!record.is_admin);
    assert!(!record.is_banned);
    assert_eq!(
        store.role_flags("user_1").await.unwrap(),
        Some(RoleFlags::default())
    );
}

#[tokio::test(start_paused = true)]
async fn test_resync_keeps_role_flags() {
    let store = Arc::new(InMemoryUserStore::new());
    let sync = UserSyncService::new(store.clone());

    sync.sync(&profile("user_1", "ada@example.com")).await.unwrap();
    store
        .set_flags(
            "user_1",
            RoleUpdate {
                is_admin: Some(true),
                is_banned: None,
            },
        )
        .await
        .unwrap();

    let record = sync.sync(&profile("user_1", "ada@new.example.com")).await.unwrap();

    assert_eq!(record.email.as_deref(), Some("ada@new.example.com"));
    assert!(record.is_admin);
}

#[tokio::test(start_paused = true)]
async fn test_transient_write_failures_are_retried() {
    let store = Arc::new(FlakyStore::new(2));
    let sync = UserSyncService::new(store.clone());

    let record = sync.sync(&profile("user_2", "b@example.com")).await.unwrap();

    assert_eq!(record.external_auth_id, "user_2");
    assert_eq!(store.writes.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_write_gives_up_after_retry_budget() {
    let store = Arc::new(FlakyStore::new(10));
    let sync = UserSyncService::new(store.clone());

    let err = sync.sync(&profile("user_3", "c@example.com")).await.unwrap_err();

    assert!(matches!(err, SyncError::Write(ref e) if e.attempts == 3));
    assert_eq!(store.writes.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_sync_fails_when_record_never_visible() {
    let store = Arc::new(FlakyStore {
        never_visible: true,
        ..FlakyStore::new(0)
    });
    let sync = UserSyncService::new(store);

    let err = sync.sync(&profile("user_4", "d@example.com")).await.unwrap_err();

    assert!(matches!(err, SyncError::Confirm(_)));
}

#[tokio::test(start_paused = true)]
async fn test_remove_user() {
    let store = Arc::new(InMemoryUserStore::new());
    let sync = UserSyncService::new(store.clone());
    sync.sync(&profile("user_5", "e@example.com")).await.unwrap();

    assert!(sync.remove("user_5").await.unwrap());
    assert!(!sync.remove("user_5").await.unwrap());
    assert_eq!(store.role_flags("user_5").await.unwrap(), None);
}
