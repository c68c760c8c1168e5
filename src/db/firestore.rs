// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Content documents (blogs, portfolios, services, ads, contact messages)
//! - The singleton SEO config
//!
//! The underlying client is opened lazily through a [`ConnectionManager`], so
//! the first request that touches Firestore pays the handshake and every later
//! one reuses it.

use crate::db::collections;
use crate::db::connection::{ConnectionManager, Connector};
use crate::error::AppError;
use crate::models::seo::SEO_DOCUMENT_ID;
use crate::models::{ContentDocument, SeoConfig};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreQueryDirection;
use std::sync::Arc;

/// Opens Firestore connections for one project.
pub struct FirestoreConnector {
    project_id: String,
    target: String,
}

impl FirestoreConnector {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            target: format!("firestore/{}", project_id),
        }
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn connect_emulator(&self) -> anyhow::Result<firestore::FirestoreDb> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Dummy token so the emulator never sees local credentials.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(self.project_id.clone());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await?;

        tracing::info!(
            project = %self.project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );
        Ok(client)
    }
}

#[async_trait]
impl Connector for FirestoreConnector {
    type Handle = firestore::FirestoreDb;

    fn target(&self) -> &str {
        &self.target
    }

    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    async fn connect(&self) -> anyhow::Result<firestore::FirestoreDb> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return self.connect_emulator().await;
        }

        let client = firestore::FirestoreDb::new(&self.project_id).await?;
        tracing::info!(project = %self.project_id, "Connected to Firestore");
        Ok(client)
    }
}

/// Firestore content store.
#[derive(Clone)]
pub struct ContentDb {
    manager: Option<Arc<ConnectionManager<FirestoreConnector>>>,
}

impl ContentDb {
    /// Create a lazily connected content store for `project_id`.
    pub fn new(project_id: &str) -> Self {
        Self::with_manager(Arc::new(ConnectionManager::new(FirestoreConnector::new(
            project_id,
        ))))
    }

    pub fn with_manager(manager: Arc<ConnectionManager<FirestoreConnector>>) -> Self {
        Self {
            manager: Some(manager),
        }
    }

    /// Create a mock content store for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { manager: None }
    }

    /// Whether the Firestore connection has been established.
    pub fn is_connected(&self) -> bool {
        self.manager.as_ref().is_some_and(|m| m.is_connected())
    }

    /// Connect now instead of on first use. Fatal if Firestore is unreachable.
    pub async fn warm_up(&self) {
        if let Some(manager) = &self.manager {
            manager.get().await;
        }
    }

    /// Helper to get the client or return an error if offline.
    async fn client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        match &self.manager {
            Some(manager) => Ok(manager.get().await),
            None => Err(AppError::Database(
                "Database not connected (offline mode)".to_string(),
            )),
        }
    }

    // ─── Content Operations ──────────────────────────────────────

    /// List every document of a collection in display order.
    pub async fn list<T: ContentDocument>(&self) -> Result<Vec<T>, AppError> {
        let direction = if T::DESCENDING {
            FirestoreQueryDirection::Descending
        } else {
            FirestoreQueryDirection::Ascending
        };

        self.client()
            .await?
            .fluent()
            .select()
            .from(T::COLLECTION)
            .order_by([(T::ORDER_BY, direction)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get one document by ID.
    pub async fn get<T: ContentDocument>(&self, id: &str) -> Result<Option<T>, AppError> {
        self.client()
            .await?
            .fluent()
            .select()
            .by_id_in(T::COLLECTION)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a document under its own ID, failing with
    /// [`AppError::Conflict`] if one already exists.
    pub async fn create<T: ContentDocument>(&self, doc: &T) -> Result<(), AppError> {
        let result: Result<(), FirestoreError> = self
            .client()
            .await?
            .fluent()
            .insert()
            .into(T::COLLECTION)
            .document_id(doc.document_id())
            .object(doc)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(FirestoreError::DataConflictError(_)) => Err(AppError::Conflict(format!(
                "{} {} already exists",
                T::COLLECTION,
                doc.document_id()
            ))),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Create or replace a document under its own ID.
    pub async fn upsert<T: ContentDocument>(&self, doc: &T) -> Result<(), AppError> {
        let _: () = self
            .client()
            .await?
            .fluent()
            .update()
            .in_col(T::COLLECTION)
            .document_id(doc.document_id())
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a document. Deleting a missing document is not an error.
    pub async fn delete<T: ContentDocument>(&self, id: &str) -> Result<(), AppError> {
        self.client()
            .await?
            .fluent()
            .delete()
            .from(T::COLLECTION)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(collection = T::COLLECTION, id, "Deleted document");
        Ok(())
    }

    // ─── SEO Operations ──────────────────────────────────────────

    pub async fn get_seo(&self) -> Result<Option<SeoConfig>, AppError> {
        self.client()
            .await?
            .fluent()
            .select()
            .by_id_in(collections::SEO)
            .obj()
            .one(SEO_DOCUMENT_ID)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_seo(&self, seo: &SeoConfig) -> Result<(), AppError> {
        let _: () = self
            .client()
            .await?
            .fluent()
            .update()
            .in_col(collections::SEO)
            .document_id(SEO_DOCUMENT_ID)
            .object(seo)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
