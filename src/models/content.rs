// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Content documents stored in Firestore (blogs, portfolios, services, ads).

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A document kept in its own Firestore collection and managed through the
/// generic admin CRUD routes.
pub trait ContentDocument:
    Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static
{
    /// Firestore collection name.
    const COLLECTION: &'static str;
    /// Field used to order listings.
    const ORDER_BY: &'static str;
    /// Sort newest/largest first.
    const DESCENDING: bool;

    fn document_id(&self) -> &str;

    /// Force the document id, e.g. from the request path on update.
    fn set_document_id(&mut self, id: &str);

    /// Fill server-managed fields before a write.
    ///
    /// `existing` is the stored version when updating.
    fn prepare(&mut self, existing: Option<&Self>, now: &str);

    /// Record the admin creating the document. No-op for documents without
    /// an author.
    fn set_author(&mut self, _author_id: &str) {}

    /// Whether the document may be served on public routes.
    fn is_public(&self, _now: DateTime<Utc>) -> bool {
        true
    }
}

/// Turn a title into a URL slug: lowercase ASCII alphanumerics separated by
/// single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Normalize a client supplied slug, falling back to the title.
fn normalize_slug(slug: &str, title: &str) -> String {
    let source = if slug.trim().is_empty() { title } else { slug };
    slugify(source)
}

fn keep_created_at<'a>(existing: Option<&'a str>, now: &'a str) -> String {
    existing
        .filter(|created| !created.is_empty())
        .unwrap_or(now)
        .to_string()
}

// ─── Blog ────────────────────────────────────────────────────

/// Blog post.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Blog {
    /// URL slug (also used as document ID)
    #[serde(default)]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub excerpt: String,
    /// Markdown body
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    #[validate(url)]
    pub cover_image: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub tags: Vec<String>,
    /// Drafts are only visible to admins
    #[serde(default)]
    pub published: bool,
    /// Identity of the admin who created the post
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ContentDocument for Blog {
    const COLLECTION: &'static str = crate::db::collections::BLOGS;
    const ORDER_BY: &'static str = "created_at";
    const DESCENDING: bool = true;

    fn document_id(&self) -> &str {
        &self.slug
    }

    fn set_document_id(&mut self, id: &str) {
        self.slug = id.to_string();
    }

    fn prepare(&mut self, existing: Option<&Self>, now: &str) {
        self.slug = normalize_slug(&self.slug, &self.title);
        self.created_at = keep_created_at(existing.map(|e| e.created_at.as_str()), now);
        self.updated_at = now.to_string();
        if let Some(existing) = existing {
            self.author_id = existing.author_id.clone();
        }
    }

    fn set_author(&mut self, author_id: &str) {
        self.author_id = author_id.to_string();
    }

    fn is_public(&self, _now: DateTime<Utc>) -> bool {
        self.published
    }
}

// ─── Portfolio ───────────────────────────────────────────────

/// Portfolio project.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Portfolio {
    #[serde(default)]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[serde(default)]
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub project_url: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    /// Ascending display order
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ContentDocument for Portfolio {
    const COLLECTION: &'static str = crate::db::collections::PORTFOLIOS;
    const ORDER_BY: &'static str = "sort_order";
    const DESCENDING: bool = false;

    fn document_id(&self) -> &str {
        &self.slug
    }

    fn set_document_id(&mut self, id: &str) {
        self.slug = id.to_string();
    }

    fn prepare(&mut self, existing: Option<&Self>, now: &str) {
        self.slug = normalize_slug(&self.slug, &self.title);
        self.created_at = keep_created_at(existing.map(|e| e.created_at.as_str()), now);
        self.updated_at = now.to_string();
    }
}

// ─── Service ─────────────────────────────────────────────────

/// Service offering.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Service {
    #[serde(default)]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    /// Icon identifier understood by the frontend
    #[serde(default)]
    #[validate(length(max = 64))]
    pub icon: Option<String>,
    /// Free-form price label ("from $500")
    #[serde(default)]
    #[validate(length(max = 64))]
    pub price: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ContentDocument for Service {
    const COLLECTION: &'static str = crate::db::collections::SERVICES;
    const ORDER_BY: &'static str = "sort_order";
    const DESCENDING: bool = false;

    fn document_id(&self) -> &str {
        &self.slug
    }

    fn set_document_id(&mut self, id: &str) {
        self.slug = id.to_string();
    }

    fn prepare(&mut self, existing: Option<&Self>, now: &str) {
        self.slug = normalize_slug(&self.slug, &self.title);
        self.created_at = keep_created_at(existing.map(|e| e.created_at.as_str()), now);
        self.updated_at = now.to_string();
    }
}

// ─── Ad ──────────────────────────────────────────────────────

/// Advertisement slot content.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_ad_window"))]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Ad {
    /// Generated on create (also used as document ID)
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(url)]
    pub image_url: String,
    #[validate(url)]
    pub link_url: String,
    /// Where the frontend renders the ad ("sidebar", "banner", ...)
    #[validate(length(min = 1, max = 50))]
    pub placement: String,
    #[serde(default)]
    pub active: bool,
    /// Optional schedule (RFC 3339)
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn validate_ad_window(ad: &Ad) -> Result<(), ValidationError> {
    let starts = match ad.starts_at.as_deref() {
        Some(s) => Some(parse_time(s).ok_or_else(|| ValidationError::new("invalid_starts_at"))?),
        None => None,
    };
    let ends = match ad.ends_at.as_deref() {
        Some(s) => Some(parse_time(s).ok_or_else(|| ValidationError::new("invalid_ends_at"))?),
        None => None,
    };

    match (starts, ends) {
        (Some(start), Some(end)) if end <= start => Err(ValidationError::new("empty_schedule")),
        _ => Ok(()),
    }
}

impl ContentDocument for Ad {
    const COLLECTION: &'static str = crate::db::collections::ADS;
    const ORDER_BY: &'static str = "created_at";
    const DESCENDING: bool = true;

    fn document_id(&self) -> &str {
        &self.id
    }

    fn set_document_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn prepare(&mut self, existing: Option<&Self>, now: &str) {
        if self.id.is_empty() {
            self.id = uuid::Uuid::new_v4().to_string();
        }
        self.created_at = keep_created_at(existing.map(|e| e.created_at.as_str()), now);
        self.updated_at = now.to_string();
    }

    fn is_public(&self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        let started = self
            .starts_at
            .as_deref()
            .and_then(parse_time)
            .map_or(true, |start| start <= now);
        let not_ended = self
            .ends_at
            .as_deref()
            .and_then(parse_time)
            .map_or(true, |end| now < end);
        started && not_ended
    }
}
