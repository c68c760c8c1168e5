// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for identity provider user events.

use crate::models::UserProfile;
use crate::services::webhook_signature::{ID_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/webhooks/identity", post(handle_event))
}

/// Identity provider event envelope.
#[derive(Deserialize, Debug)]
struct IdentityEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: serde_json::Value,
}

#[derive(Deserialize, Debug)]
struct EmailAddress {
    id: String,
    email_address: String,
}

/// `data` of `user.created` / `user.updated`.
#[derive(Deserialize, Debug)]
struct WebhookUser {
    id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    primary_email_address_id: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

impl WebhookUser {
    fn into_profile(self) -> UserProfile {
        let email = self
            .email_addresses
            .iter()
            .find(|e| Some(&e.id) == self.primary_email_address_id.as_ref())
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.clone());

        UserProfile {
            external_auth_id: self.id,
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            image_url: self.image_url,
        }
    }
}

/// `data` of `user.deleted`.
#[derive(Deserialize, Debug)]
struct DeletedUser {
    id: Option<String>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

/// Handle incoming webhook events (POST).
///
/// Returns 5xx when the side store cannot be updated so the provider
/// redelivers the event. A message id already handled is acknowledged
/// without being processed again.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let now = chrono::Utc::now().timestamp();
    let id = header(&headers, ID_HEADER);
    let timestamp = header(&headers, TIMESTAMP_HEADER);

    if let Err(err) = state.webhooks.verify(
        id,
        timestamp,
        header(&headers, SIGNATURE_HEADER),
        &body,
        now,
    ) {
        tracing::warn!(error = %err, "Rejected identity webhook");
        return StatusCode::UNAUTHORIZED;
    }

    // Both headers are present and the timestamp parses once verified.
    let id = id.unwrap_or_default();
    let timestamp = timestamp
        .and_then(|t| t.trim().parse().ok())
        .unwrap_or(now);

    if !state.webhook_replays.claim(id, timestamp, now) {
        tracing::info!(message_id = %id, "Ignoring replayed identity webhook");
        return StatusCode::OK;
    }

    let status = process_event(&state, &body).await;
    if status.is_server_error() {
        state.webhook_replays.release(id);
    }
    status
}

async fn process_event(state: &AppState, body: &[u8]) -> StatusCode {
    let event: IdentityEvent = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "Malformed identity webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(event_type = %event.event_type, "Identity webhook received");

    match event.event_type.as_str() {
        "user.created" | "user.updated" => {
            let user: WebhookUser = match serde_json::from_value(event.data) {
                Ok(user) => user,
                Err(err) => {
                    tracing::warn!(error = %err, "Malformed user in identity webhook");
                    return StatusCode::BAD_REQUEST;
                }
            };

            match state.user_sync.sync(&user.into_profile()).await {
                Ok(_) => StatusCode::OK,
                Err(err) => {
                    tracing::error!(error = %err, "Webhook user sync failed");
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }
        }
        "user.deleted" => {
            let deleted: DeletedUser =
                serde_json::from_value(event.data).unwrap_or(DeletedUser { id: None });
            let Some(id) = deleted.id else {
                tracing::warn!("user.deleted event without id");
                return StatusCode::BAD_REQUEST;
            };

            match state.user_sync.remove(&id).await {
                Ok(_) => StatusCode::OK,
                Err(err) => {
                    tracing::error!(error = %err, "Webhook user removal failed");
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }
        }
        other => {
            tracing::debug!(event_type = %other, "Ignoring identity webhook event");
            StatusCode::OK
        }
    }
}
