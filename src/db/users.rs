// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Relational side store for user role and ban flags.
//!
//! Profile syncs from the identity provider only ever touch profile columns;
//! `is_admin` and `is_banned` are changed exclusively through [`UserStore::set_flags`].

use crate::db::connection::{ConnectionManager, Connector};
use crate::error::AppError;
use crate::models::{RoleFlags, RoleUpdate, UserProfile, UserRecord};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;

/// Operations on the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Role flags for an identity, `None` if the user has never been synced.
    async fn role_flags(&self, external_auth_id: &str) -> Result<Option<RoleFlags>, AppError>;

    /// Insert or update profile fields, preserving existing role flags.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserRecord, AppError>;

    async fn get_user(&self, external_auth_id: &str) -> Result<Option<UserRecord>, AppError>;

    /// All users, newest first.
    async fn list_users(&self) -> Result<Vec<UserRecord>, AppError>;

    /// Apply an admin flag change. Returns `None` if the user does not exist.
    async fn set_flags(
        &self,
        external_auth_id: &str,
        update: RoleUpdate,
    ) -> Result<Option<UserRecord>, AppError>;

    /// Returns whether a row was removed.
    async fn delete_user(&self, external_auth_id: &str) -> Result<bool, AppError>;
}

// ─── PostgreSQL ──────────────────────────────────────────────

/// Opens the PostgreSQL pool and makes sure the `users` table exists.
pub struct PgConnector {
    database_url: String,
}

impl PgConnector {
    pub fn new(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgPool;

    fn target(&self) -> &str {
        "postgres/users"
    }

    async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&self.database_url)
            .await?;

        run_migrations(&pool).await?;
        tracing::info!("Connected to user side store");
        Ok(pool)
    }
}

/// Create the `users` table if missing.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            external_auth_id TEXT PRIMARY KEY,
            email TEXT,
            first_name TEXT,
            last_name TEXT,
            image_url TEXT,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            is_banned BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

const USER_COLUMNS: &str = "external_auth_id, email, first_name, last_name, image_url, \
                            is_admin, is_banned, created_at, updated_at";

/// PostgreSQL-backed user store.
#[derive(Clone)]
pub struct PgUserStore {
    manager: Arc<ConnectionManager<PgConnector>>,
}

impl PgUserStore {
    pub fn new(database_url: &str) -> Self {
        Self {
            manager: Arc::new(ConnectionManager::new(PgConnector::new(database_url))),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    async fn pool(&self) -> &PgPool {
        self.manager.get().await
    }
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Database(e.to_string())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn role_flags(&self, external_auth_id: &str) -> Result<Option<RoleFlags>, AppError> {
        sqlx::query_as::<_, RoleFlags>(
            "SELECT is_admin, is_banned FROM users WHERE external_auth_id = $1",
        )
        .bind(external_auth_id)
        .fetch_optional(self.pool().await)
        .await
        .map_err(db_err)
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserRecord, AppError> {
        let sql = format!(
            r#"
            INSERT INTO users (external_auth_id, email, first_name, last_name, image_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (external_auth_id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                image_url = EXCLUDED.image_url,
                updated_at = NOW()
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&profile.external_auth_id)
            .bind(&profile.email)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.image_url)
            .fetch_one(self.pool().await)
            .await
            .map_err(db_err)
    }

    async fn get_user(&self, external_auth_id: &str) -> Result<Option<UserRecord>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE external_auth_id = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(external_auth_id)
            .fetch_optional(self.pool().await)
            .await
            .map_err(db_err)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, UserRecord>(&sql)
            .fetch_all(self.pool().await)
            .await
            .map_err(db_err)
    }

    async fn set_flags(
        &self,
        external_auth_id: &str,
        update: RoleUpdate,
    ) -> Result<Option<UserRecord>, AppError> {
        let sql = format!(
            r#"
            UPDATE users SET
                is_admin = COALESCE($2, is_admin),
                is_banned = COALESCE($3, is_banned),
                updated_at = NOW()
            WHERE external_auth_id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(external_auth_id)
            .bind(update.is_admin)
            .bind(update.is_banned)
            .fetch_optional(self.pool().await)
            .await
            .map_err(db_err)
    }

    async fn delete_user(&self, external_auth_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE external_auth_id = $1")
            .bind(external_auth_id)
            .execute(self.pool().await)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

// ─── In-memory ───────────────────────────────────────────────

/// Process-local user store for development without PostgreSQL and for tests.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<DashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a full record, flags included.
    pub fn insert(&self, record: UserRecord) {
        self.users.insert(record.external_auth_id.clone(), record);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn role_flags(&self, external_auth_id: &str) -> Result<Option<RoleFlags>, AppError> {
        Ok(self.users.get(external_auth_id).map(|u| u.flags()))
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserRecord, AppError> {
        let now = Utc::now();
        let mut entry = self
            .users
            .entry(profile.external_auth_id.clone())
            .or_insert_with(|| UserRecord {
                external_auth_id: profile.external_auth_id.clone(),
                email: None,
                first_name: None,
                last_name: None,
                image_url: None,
                is_admin: false,
                is_banned: false,
                created_at: now,
                updated_at: now,
            });

        let record = entry.value_mut();
        record.email = profile.email.clone();
        record.first_name = profile.first_name.clone();
        record.last_name = profile.last_name.clone();
        record.image_url = profile.image_url.clone();
        record.updated_at = now;

        Ok(record.clone())
    }

    async fn get_user(&self, external_auth_id: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get(external_auth_id).map(|u| u.value().clone()))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        let mut users: Vec<UserRecord> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn set_flags(
        &self,
        external_auth_id: &str,
        update: RoleUpdate,
    ) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get_mut(external_auth_id).map(|mut user| {
            if let Some(is_admin) = update.is_admin {
                user.is_admin = is_admin;
            }
            if let Some(is_banned) = update.is_banned {
                user.is_banned = is_banned;
            }
            user.updated_at = Utc::now();
            user.value().clone()
        }))
    }

    async fn delete_user(&self, external_auth_id: &str) -> Result<bool, AppError> {
        Ok(self.users.remove(external_auth_id).is_some())
    }
}
