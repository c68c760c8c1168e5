// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod contact;
pub mod content;
pub mod seo;
pub mod user;

pub use contact::{ContactMessage, ContactRequest};
pub use content::{Ad, Blog, ContentDocument, Portfolio, Service};
pub use seo::SeoConfig;
pub use user::{RoleFlags, RoleUpdate, UserProfile, UserRecord};
