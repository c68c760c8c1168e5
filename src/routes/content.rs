// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public read-only content routes.

use crate::error::{AppError, Result};
use crate::models::{Ad, Blog, ContentDocument, Portfolio, SeoConfig, Service};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

const MAX_LIMIT: usize = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/blogs", get(list_public::<Blog>))
        .route("/api/blogs/{id}", get(get_public::<Blog>))
        .route("/api/portfolios", get(list_public::<Portfolio>))
        .route("/api/portfolios/{id}", get(get_public::<Portfolio>))
        .route("/api/services", get(list_public::<Service>))
        .route("/api/services/{id}", get(get_public::<Service>))
        .route("/api/ads", get(list_public::<Ad>))
        .route("/api/seo", get(get_seo))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum number of documents (1-100)
    limit: Option<usize>,
}

/// List the publicly visible documents of a collection.
async fn list_public<T: ContentDocument>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<T>>> {
    let limit = query.limit.unwrap_or(MAX_LIMIT).clamp(1, MAX_LIMIT);
    let now = Utc::now();

    let docs: Vec<T> = state
        .content
        .list::<T>()
        .await?
        .into_iter()
        .filter(|doc| doc.is_public(now))
        .take(limit)
        .collect();

    Ok(Json(docs))
}

/// Get one publicly visible document. Hidden documents are reported as missing.
async fn get_public<T: ContentDocument>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<T>> {
    state
        .content
        .get::<T>(&id)
        .await?
        .filter(|doc| doc.is_public(Utc::now()))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} {}", T::COLLECTION, id)))
}

/// Site SEO config, falling back to defaults before one is saved.
async fn get_seo(State(state): State<Arc<AppState>>) -> Result<Json<SeoConfig>> {
    Ok(Json(state.content.get_seo().await?.unwrap_or_default()))
}
