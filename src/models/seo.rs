// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Site-wide SEO configuration (single Firestore document).

use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Document ID of the singleton SEO config.
pub const SEO_DOCUMENT_ID: &str = "site";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SeoConfig {
    #[validate(length(min = 1, max = 120))]
    pub site_title: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub keywords: Vec<String>,
    #[serde(default)]
    #[validate(url)]
    pub og_image: Option<String>,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub twitter_handle: Option<String>,
    #[serde(default)]
    pub updated_at: String,
}

impl Default for SeoConfig {
    /// Served before an admin has saved anything.
    fn default() -> Self {
        Self {
            site_title: "Portfolio".to_string(),
            description: String::new(),
            keywords: Vec::new(),
            og_image: None,
            twitter_handle: None,
            updated_at: String::new(),
        }
    }
}
