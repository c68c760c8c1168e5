// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes. The authorization gate only lets `is_admin` callers through.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    Ad, Blog, ContactMessage, ContentDocument, Portfolio, RoleUpdate, SeoConfig, Service,
    UserRecord,
};
use crate::services::ai::{GenerateRequest, GenerateResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(crud::<Blog>("/api/admin/blogs"))
        .merge(crud::<Portfolio>("/api/admin/portfolios"))
        .merge(crud::<Service>("/api/admin/services"))
        .merge(crud::<Ad>("/api/admin/ads"))
        .route("/api/admin/seo", put(update_seo))
        .route("/api/admin/contacts", get(list_all::<ContactMessage>))
        .route("/api/admin/contacts/{id}", delete(delete_doc::<ContactMessage>))
        .route("/api/admin/contacts/{id}/read", put(mark_contact_read))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}", put(update_user))
        .route("/api/admin/generate", post(generate))
}

/// List/create/get/update/delete routes for one content collection.
fn crud<T: ContentDocument>(base: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(base, get(list_all::<T>).post(create_doc::<T>))
        .route(
            &format!("{}/{{id}}", base),
            get(get_doc::<T>).put(update_doc::<T>).delete(delete_doc::<T>),
        )
}

// ─── Content CRUD ────────────────────────────────────────────

/// All documents, drafts and inactive ones included.
async fn list_all<T: ContentDocument>(State(state): State<Arc<AppState>>) -> Result<Json<Vec<T>>> {
    Ok(Json(state.content.list::<T>().await?))
}

async fn get_doc<T: ContentDocument>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<T>> {
    state
        .content
        .get::<T>(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} {}", T::COLLECTION, id)))
}

async fn create_doc<T: ContentDocument>(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Json(mut doc): Json<T>,
) -> Result<(StatusCode, Json<T>)> {
    doc.validate()?;
    doc.set_author(&admin.external_auth_id);
    doc.prepare(None, &now_rfc3339());

    if doc.document_id().is_empty() {
        return Err(AppError::BadRequest(
            "title must contain at least one letter or digit".to_string(),
        ));
    }

    // Create-only write; an existing ID surfaces as 409.
    state.content.create(&doc).await?;
    tracing::info!(collection = T::COLLECTION, id = %doc.document_id(), "Document created");

    Ok((StatusCode::CREATED, Json(doc)))
}

async fn update_doc<T: ContentDocument>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut doc): Json<T>,
) -> Result<Json<T>> {
    doc.validate()?;

    let existing = state
        .content
        .get::<T>(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", T::COLLECTION, id)))?;

    doc.prepare(Some(&existing), &now_rfc3339());
    // Renames are not supported; the path ID wins over any slug in the body.
    doc.set_document_id(&id);

    state.content.upsert(&doc).await?;
    tracing::info!(collection = T::COLLECTION, id = %id, "Document updated");

    Ok(Json(doc))
}

async fn delete_doc<T: ContentDocument>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if state.content.get::<T>(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("{} {}", T::COLLECTION, id)));
    }

    state.content.delete::<T>(&id).await?;
    tracing::info!(collection = T::COLLECTION, id = %id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ─── SEO ─────────────────────────────────────────────────────

async fn update_seo(
    State(state): State<Arc<AppState>>,
    Json(mut seo): Json<SeoConfig>,
) -> Result<Json<SeoConfig>> {
    seo.validate()?;
    seo.updated_at = now_rfc3339();
    state.content.set_seo(&seo).await?;
    tracing::info!("SEO config updated");
    Ok(Json(seo))
}

// ─── Contacts ────────────────────────────────────────────────

async fn mark_contact_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ContactMessage>> {
    let mut message = state
        .content
        .get::<ContactMessage>(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contact message {}", id)))?;

    if !message.read {
        message.read = true;
        state.content.upsert(&message).await?;
    }

    Ok(Json(message))
}

// ─── Users ───────────────────────────────────────────────────

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserRecord>>> {
    Ok(Json(state.users.list_users().await?))
}

/// Grant/revoke admin or ban/unban a user.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<RoleUpdate>,
) -> Result<Json<UserRecord>> {
    let locks_self_out = update.is_banned == Some(true) || update.is_admin == Some(false);
    if id == admin.external_auth_id && locks_self_out {
        return Err(AppError::Forbidden(
            "admins cannot ban or demote themselves".to_string(),
        ));
    }

    let record = state
        .users
        .set_flags(&id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;

    tracing::info!(
        admin = %admin.external_auth_id,
        user = %id,
        is_admin = record.is_admin,
        is_banned = record.is_banned,
        "User flags updated"
    );

    Ok(Json(record))
}

// ─── AI drafts ───────────────────────────────────────────────

async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    request.validate()?;
    let text = state.ai.generate(&request).await?;
    Ok(Json(GenerateResponse {
        kind: request.kind,
        text,
    }))
}
