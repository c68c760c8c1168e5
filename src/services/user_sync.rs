// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider → side store user sync.
//!
//! Runs in two phases, each retried with the shared backoff policy:
//! 1. write: upsert the profile fields (role flags untouched)
//! 2. confirm: read the role flags back so the record is known to be visible
//!    to the authorization gate before the sync is reported successful.

use crate::db::connection::{retry_with_backoff, RetriesExhausted, RetryPolicy};
use crate::db::UserStore;
use crate::error::AppError;
use crate::models::{UserProfile, UserRecord};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("profile write failed: {0}")]
    Write(RetriesExhausted),
    #[error("synced user not visible: {0}")]
    Confirm(RetriesExhausted),
    #[error("user removal failed: {0}")]
    Remove(RetriesExhausted),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        AppError::Unavailable(err.to_string())
    }
}

#[derive(Clone)]
pub struct UserSyncService {
    store: Arc<dyn UserStore>,
    policy: RetryPolicy,
}

impl UserSyncService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self::with_policy(store, RetryPolicy::default())
    }

    pub fn with_policy(store: Arc<dyn UserStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Sync a profile and return the stored record with its current flags.
    pub async fn sync(&self, profile: &UserProfile) -> Result<UserRecord, SyncError> {
        let id = profile.external_auth_id.as_str();
        let store = &self.store;

        let mut record = retry_with_backoff(self.policy, "user-sync/write", |_| {
            store.upsert_profile(profile)
        })
        .await
        .map_err(SyncError::Write)?;

        let flags = retry_with_backoff(self.policy, "user-sync/confirm", |_| async move {
            store
                .role_flags(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("user {} after write", id)))
        })
        .await
        .map_err(SyncError::Confirm)?;

        record.is_admin = flags.is_admin;
        record.is_banned = flags.is_banned;

        tracing::info!(
            user = %id,
            is_admin = flags.is_admin,
            is_banned = flags.is_banned,
            "User synced"
        );
        Ok(record)
    }

    /// Remove a user deleted at the identity provider.
    pub async fn remove(&self, external_auth_id: &str) -> Result<bool, SyncError> {
        let store = &self.store;
        let removed = retry_with_backoff(self.policy, "user-sync/remove", |_| {
            store.delete_user(external_auth_id)
        })
        .await
        .map_err(SyncError::Remove)?;

        tracing::info!(user = %external_auth_id, removed, "User removed");
        Ok(removed)
    }
}
