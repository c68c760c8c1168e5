// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public contact form.

use crate::error::Result;
use crate::models::{ContactMessage, ContactRequest};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/contact", post(submit))
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: String,
    /// Whether the owner notification email went out
    pub notified: bool,
}

/// Store a contact message and notify the site owner.
///
/// The message is stored first; a failed notification is logged but does not
/// fail the submission since the message is visible in the admin inbox.
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    request.validate()?;

    let message = ContactMessage::from_request(request, &now_rfc3339());
    message.validate()?;
    state.content.upsert(&message).await?;
    tracing::info!(id = %message.id, "Contact message stored");

    let notified = match state
        .email
        .notify_contact(
            &message,
            &state.config.contact_notify_email,
            &state.config.public_base_url,
        )
        .await
    {
        Ok(_) => true,
        Err(err) => {
            tracing::error!(id = %message.id, error = %err, "Contact notification failed");
            false
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            id: message.id,
            notified,
        }),
    ))
}
