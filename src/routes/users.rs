// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routes for the signed-in caller.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::UserRecord;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Authenticated routes. The gate rejects anonymous callers before these run.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/users/sync", post(sync_me))
}

/// Current caller as seen by the gate.
#[derive(Serialize)]
pub struct MeResponse {
    pub external_auth_id: String,
    pub email: Option<String>,
    pub is_admin: bool,
    /// False when the role lookup failed or the user has not been synced yet
    pub roles_known: bool,
}

async fn get_me(Extension(user): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse {
        is_admin: user.is_admin(),
        roles_known: user.flags.is_some(),
        email: user.claims.email.clone(),
        external_auth_id: user.external_auth_id,
    })
}

/// Sign-in sync: push the token's profile into the side store.
async fn sync_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserRecord>> {
    let record = state.user_sync.sync(&user.claims.profile()).await?;
    Ok(Json(record))
}
