// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact form submissions.

use super::content::ContentDocument;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Payload posted by the public contact form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(length(max = 5000), custom(function = "long_enough_message"))]
    pub message: String,
}

/// Minimum message length once surrounding whitespace is removed.
const MIN_MESSAGE_CHARS: usize = 10;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn long_enough_message(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < MIN_MESSAGE_CHARS {
        return Err(ValidationError::new("too_short"));
    }
    Ok(())
}

/// Stored contact message.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ContactMessage {
    /// Generated on submit (also used as document ID)
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
    /// Marked by an admin from the inbox
    #[serde(default)]
    pub read: bool,
    pub created_at: String,
}

impl ContactMessage {
    /// Build a new unread message from a validated request.
    pub fn from_request(request: ContactRequest, now: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            subject: request
                .subject
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            message: request.message.trim().to_string(),
            read: false,
            created_at: now.to_string(),
        }
    }
}

impl ContentDocument for ContactMessage {
    const COLLECTION: &'static str = crate::db::collections::CONTACTS;
    const ORDER_BY: &'static str = "created_at";
    const DESCENDING: bool = true;

    fn document_id(&self) -> &str {
        &self.id
    }

    fn set_document_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn prepare(&mut self, existing: Option<&Self>, now: &str) {
        if let Some(existing) = existing {
            self.created_at = existing.created_at.clone();
        } else if self.created_at.is_empty() {
            self.created_at = now.to_string();
        }
    }

    fn is_public(&self, _now: chrono::DateTime<chrono::Utc>) -> bool {
        false
    }
}
