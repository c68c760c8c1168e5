// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization gate tests over the full router.
//!
//! These tests verify that:
//! 1. Banned users are sent to the suspension page from every route
//! 2. Admin routes require `is_admin` and fail closed when roles are unknown
//! 3. Other authenticated routes fail open when the role lookup fails
//! 4. Anonymous callers only reach public routes

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::{create_test_app, create_test_app_with, token_for, user, FailingUserStore};

async fn get(app: axum::Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_banned_user_redirected_from_public_and_private_routes() {
    let (app, users) = create_test_app();
    users.insert(user("user_banned", false, true));
    let token = token_for("user_banned");

    for uri in ["/", "/api/blogs", "/api/me", "/dashboard"] {
        let response = get(app.clone(), uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{}", uri);
        assert_eq!(location(&response), "/suspended", "{}", uri);
    }
}

#[tokio::test]
async fn test_ban_takes_precedence_over_admin() {
    let (app, users) = create_test_app();
    users.insert(user("user_banned_admin", true, true));

    let response = get(app, "/api/admin/users", Some(&token_for("user_banned_admin"))).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/suspended");
}

#[tokio::test]
async fn test_member_redirected_home_from_admin_route() {
    let (app, users) = create_test_app();
    users.insert(user("user_member", false, false));

    let response = get(app, "/api/admin/users", Some(&token_for("user_member"))).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_admin_reaches_admin_route() {
    let (app, users) = create_test_app();
    users.insert(user("user_admin", true, false));
    users.insert(user("user_member", false, false));

    let response = get(app, "/api/admin/users", Some(&token_for("user_admin"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json.as_array().map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn test_member_reaches_authenticated_route() {
    let (app, users) = create_test_app();
    users.insert(user("user_member", false, false));

    let response = get(app, "/api/me", Some(&token_for("user_member"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["external_auth_id"], "user_member");
    assert_eq!(json["is_admin"], false);
    assert_eq!(json["roles_known"], true);
}

#[tokio::test]
async fn test_lookup_failure_fails_closed_on_admin_routes() {
    let (app, _) = create_test_app_with(Arc::new(FailingUserStore));

    let response = get(app, "/api/admin/users", Some(&token_for("user_any"))).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_lookup_failure_fails_open_elsewhere() {
    let (app, _) = create_test_app_with(Arc::new(FailingUserStore));

    let response = get(app, "/api/me", Some(&token_for("user_any"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["is_admin"], false);
    assert_eq!(json["roles_known"], false);
}

#[tokio::test]
async fn test_unsynced_user_treated_like_failed_lookup() {
    let (app, _) = create_test_app();
    let token = token_for("user_new");

    let response = get(app.clone(), "/api/me", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app, "/api/admin/blogs", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_anonymous_api_request_rejected() {
    let (app, _) = create_test_app();

    let response = get(app, "/api/me", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn test_invalid_token_is_anonymous() {
    let (app, _) = create_test_app();

    let response = get(app, "/api/me", Some("invalid.token.here")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_page_request_sent_to_sign_in() {
    let (app, _) = create_test_app();

    let response = get(app.clone(), "/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/sign-in?redirect_url=%2Fdashboard");

    let response = get(app, "/admin", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/sign-in?redirect_url=%2Fadmin");
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let (app, users) = create_test_app();
    users.insert(user("user_cookie", false, false));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(
                    header::COOKIE,
                    format!("__session={}", token_for("user_cookie")),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = create_test_app();

    let response = get(app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["content_store_connected"], false);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/admin/blogs")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Preflight is answered before the gate runs
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_admin_cannot_ban_self() {
    let (app, users) = create_test_app();
    users.insert(user("user_admin", true, false));

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/admin/users/user_admin")
                .header(header::AUTHORIZATION, format!("Bearer {}", token_for("user_admin")))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"is_banned":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ban_applies_on_next_request() {
    let (app, users) = create_test_app();
    users.insert(user("user_admin", true, false));
    users.insert(user("user_target", false, false));
    let target_token = token_for("user_target");

    let response = get(app.clone(), "/api/me", Some(&target_token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/admin/users/user_target")
                .header(header::AUTHORIZATION, format!("Bearer {}", token_for("user_admin")))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"is_banned":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["is_banned"], true);

    // Flags are read per request, never cached
    let response = get(app, "/api/me", Some(&target_token)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/suspended");
}
