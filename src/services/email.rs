// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transactional email through the provider's HTTP API.

use crate::error::AppError;
use crate::models::ContactMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Outgoing email body as the provider expects it.
#[derive(Debug, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Email provider client.
#[derive(Clone)]
pub struct EmailService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl EmailService {
    pub fn new(api_key: String, from: String) -> Self {
        Self::with_base_url(api_key, from, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, from: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url,
            api_key,
            from,
        }
    }

    /// Send an email, returning the provider's message ID.
    pub async fn send(&self, email: &OutgoingEmail) -> Result<String, AppError> {
        let url = format!("{}/emails", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Email request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Email provider returned {}: {}",
                status, body
            )));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid email provider response: {}", e)))?;

        tracing::info!(email_id = %sent.id, subject = %email.subject, "Email sent");
        Ok(sent.id)
    }

    /// Notify the site owner about a new contact message.
    pub async fn notify_contact(
        &self,
        message: &ContactMessage,
        recipient: &str,
        site_url: &str,
    ) -> Result<String, AppError> {
        self.send(&contact_notification(message, &self.from, recipient, site_url))
            .await
    }
}

/// Build the owner notification for a contact message.
pub fn contact_notification(
    message: &ContactMessage,
    from: &str,
    recipient: &str,
    site_url: &str,
) -> OutgoingEmail {
    let subject = match &message.subject {
        Some(subject) => format!("New contact message: {}", subject),
        None => format!("New contact message from {}", message.name),
    };

    let text = format!(
        "{name} <{email}> wrote:\n\n{body}\n\nManage messages: {site}/admin/contacts",
        name = message.name,
        email = message.email,
        body = message.message,
        site = site_url,
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![recipient.to_string()],
        subject,
        text,
        reply_to: Some(message.email.clone()),
    }
}
