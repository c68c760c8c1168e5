// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization gate run before route dispatch.
//!
//! Per request: resolve the caller, fetch `{is_admin, is_banned}` from the
//! user side store (one lookup, never cached), then decide. Evaluation order
//! is ban → admin → public passthrough → authentication required.
//!
//! A failed lookup (transport error or unknown user alike) closes admin routes
//! and lets every other route fall through to the plain authentication
//! requirement, which the caller already satisfies.

use crate::config::{ADMIN_ROUTES, HOME_PATH, PUBLIC_ROUTES, SIGN_IN_PATH, SUSPENDED_PATH};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::RoleFlags;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// One entry of a static route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    /// Matches the prefix itself and any path below it (segment aware:
    /// `/blog` does not match `/blogger`).
    Prefix(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/*") {
            Some(prefix) => RoutePattern::Prefix(prefix.to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => {
                path == exact.as_str() || path.strip_suffix('/') == Some(exact.as_str())
            }
            RoutePattern::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// Result of a role lookup for an identified caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleLookup {
    Found(RoleFlags),
    /// Lookup error or unknown user; not distinguished.
    Failed,
}

/// What the gate does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectSuspended,
    RedirectHome,
    RequireAuth,
}

/// Static public/admin route classification.
#[derive(Debug, Clone)]
pub struct RouteRules {
    public: Vec<RoutePattern>,
    admin: Vec<RoutePattern>,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self::new(PUBLIC_ROUTES, ADMIN_ROUTES)
    }
}

impl RouteRules {
    pub fn new(public: &[&str], admin: &[&str]) -> Self {
        Self {
            public: public.iter().map(|p| RoutePattern::parse(p)).collect(),
            admin: admin.iter().map(|p| RoutePattern::parse(p)).collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| p.matches(path))
    }

    pub fn is_admin(&self, path: &str) -> bool {
        self.admin.iter().any(|p| p.matches(path))
    }

    /// Decide a request. `caller` is `None` for anonymous requests.
    pub fn evaluate(&self, path: &str, caller: Option<RoleLookup>) -> GateDecision {
        let admin_route = self.is_admin(path);

        match caller {
            Some(RoleLookup::Found(flags)) => {
                if flags.is_banned && path != SUSPENDED_PATH {
                    GateDecision::RedirectSuspended
                } else if admin_route && !flags.is_admin {
                    GateDecision::RedirectHome
                } else {
                    GateDecision::Allow
                }
            }
            Some(RoleLookup::Failed) if admin_route => GateDecision::RedirectHome,
            Some(RoleLookup::Failed) => GateDecision::Allow,
            None if !admin_route && self.is_public(path) => GateDecision::Allow,
            None => GateDecision::RequireAuth,
        }
    }
}

/// Response for an unauthenticated request to a protected route: API callers
/// get a 401, page requests are sent to sign-in.
fn require_auth_response(path: &str) -> Response {
    if path == "/api" || path.starts_with("/api/") {
        AppError::Unauthorized.into_response()
    } else {
        let target = format!("{}?redirect_url={}", SIGN_IN_PATH, urlencoding::encode(path));
        Redirect::temporary(&target).into_response()
    }
}

/// Middleware applied to the whole router.
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let claims = state.identity.resolve(&jar, request.headers());

    let lookup = match &claims {
        None => None,
        Some(claims) => Some(match state.users.role_flags(&claims.sub).await {
            Ok(Some(flags)) => RoleLookup::Found(flags),
            Ok(None) => {
                tracing::warn!(user = %claims.sub, path = %path, "Role lookup: user not synced");
                RoleLookup::Failed
            }
            Err(err) => {
                tracing::error!(user = %claims.sub, path = %path, error = %err, "Role lookup failed");
                RoleLookup::Failed
            }
        }),
    };

    match state.rules.evaluate(&path, lookup) {
        GateDecision::Allow => {
            if let Some(claims) = claims {
                let flags = match lookup {
                    Some(RoleLookup::Found(flags)) => Some(flags),
                    _ => None,
                };
                request.extensions_mut().insert(AuthUser {
                    external_auth_id: claims.sub.clone(),
                    flags,
                    claims,
                });
            }
            next.run(request).await
        }
        GateDecision::RedirectSuspended => {
            tracing::info!(path = %path, "Blocked banned user");
            Redirect::temporary(SUSPENDED_PATH).into_response()
        }
        GateDecision::RedirectHome => {
            tracing::warn!(path = %path, "Blocked non-admin request to admin route");
            Redirect::temporary(HOME_PATH).into_response()
        }
        GateDecision::RequireAuth => require_auth_response(&path),
    }
}
