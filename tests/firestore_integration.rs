// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with `FIRESTORE_EMULATOR_HOST=localhost:8081 cargo test`.
//!
//! The emulator provides a clean state for each test run.

use folio_api::error::AppError;
use folio_api::models::{Blog, ContactMessage, ContactRequest, ContentDocument, SeoConfig};
use folio_api::time_utils::now_rfc3339;

mod common;
use common::test_content_db;

/// Generate a unique suffix for test isolation.
fn unique_suffix() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn test_blog(title: &str, published: bool) -> Blog {
    let mut blog = Blog {
        slug: String::new(),
        title: title.to_string(),
        excerpt: "Excerpt".to_string(),
        content: "# Heading\n\nBody".to_string(),
        cover_image: None,
        tags: vec!["rust".to_string()],
        published,
        author_id: "user_admin".to_string(),
        created_at: String::new(),
        updated_at: String::new(),
    };
    blog.prepare(None, &now_rfc3339());
    blog
}

// ═══════════════════════════════════════════════════════════════════════════
// CONTENT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_blog_roundtrip() {
    require_emulator!();

    let db = test_content_db().await;
    assert!(db.is_connected());

    let blog = test_blog(&format!("Roundtrip {}", unique_suffix()), true);
    assert!(db.get::<Blog>(&blog.slug).await.unwrap().is_none());

    db.upsert(&blog).await.unwrap();

    let stored = db.get::<Blog>(&blog.slug).await.unwrap().unwrap();
    assert_eq!(stored.title, blog.title);
    assert_eq!(stored.tags, blog.tags);
    assert!(stored.published);

    db.delete::<Blog>(&blog.slug).await.unwrap();
    assert!(db.get::<Blog>(&blog.slug).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_refuses_existing_document() {
    require_emulator!();

    let db = test_content_db().await;
    let blog = test_blog(&format!("Create once {}", unique_suffix()), true);
    db.create(&blog).await.unwrap();

    let mut second = blog.clone();
    second.content = "Overwritten".to_string();
    let err = db.create(&second).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    let stored = db.get::<Blog>(&blog.slug).await.unwrap().unwrap();
    assert_eq!(stored.content, blog.content);
}

#[tokio::test]
async fn test_list_includes_drafts() {
    require_emulator!();

    let db = test_content_db().await;
    let suffix = unique_suffix();
    let published = test_blog(&format!("Published {}", suffix), true);
    let draft = test_blog(&format!("Draft {}", suffix), false);
    db.upsert(&published).await.unwrap();
    db.upsert(&draft).await.unwrap();

    let all = db.list::<Blog>().await.unwrap();
    assert!(all.iter().any(|b| b.slug == published.slug));
    assert!(all.iter().any(|b| b.slug == draft.slug));

    let now = chrono::Utc::now();
    let public: Vec<_> = all.iter().filter(|b| b.is_public(now)).collect();
    assert!(public.iter().all(|b| b.published));
}

#[tokio::test]
async fn test_contact_message_stored() {
    require_emulator!();

    let db = test_content_db().await;
    let message = ContactMessage::from_request(
        ContactRequest {
            name: "Visitor".to_string(),
            email: "visitor@example.com".to_string(),
            subject: None,
            message: "Please get in touch about a project.".to_string(),
        },
        &now_rfc3339(),
    );

    db.upsert(&message).await.unwrap();

    let stored = db.get::<ContactMessage>(&message.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "visitor@example.com");
    assert!(!stored.read);
}

#[tokio::test]
async fn test_seo_singleton() {
    require_emulator!();

    let db = test_content_db().await;
    let seo = SeoConfig {
        site_title: format!("Site {}", unique_suffix()),
        description: "Portfolio and blog".to_string(),
        ..SeoConfig::default()
    };

    db.set_seo(&seo).await.unwrap();

    let stored = db.get_seo().await.unwrap().unwrap();
    assert_eq!(stored.site_title, seo.site_title);
}
