// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider session tokens.

use crate::config::{Config, ConfigError, SESSION_COOKIE};
use crate::models::{RoleFlags, UserProfile};
use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity provider user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Claims {
    /// Profile fields carried by the token, for sign-in sync.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            external_auth_id: self.sub.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Caller admitted by the authorization gate, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub external_auth_id: String,
    /// `None` when the role lookup failed and the request was let through
    /// without privileges.
    pub flags: Option<RoleFlags>,
    pub claims: Claims,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.flags.is_some_and(|f| f.is_admin)
    }
}

/// Verifies session tokens issued by the identity provider.
#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    /// Use the RS256 public key when configured, otherwise the HS256 secret.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        match &config.identity_jwt_public_key {
            Some(pem) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| ConfigError::Invalid("IDENTITY_JWT_PUBLIC_KEY", e.to_string()))?;
                Ok(Self {
                    key,
                    validation: Validation::new(Algorithm::RS256),
                })
            }
            None => Ok(Self::hs256(&config.identity_jwt_key)),
        }
    }

    pub fn hs256(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decode and validate a token. Any failure yields `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) if !data.claims.sub.is_empty() => Some(data.claims),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "Rejected session token");
                None
            }
        }
    }

    /// Resolve the caller from the session cookie, then the bearer header.
    pub fn resolve(&self, jar: &CookieJar, headers: &HeaderMap) -> Option<Claims> {
        let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
            cookie.value().to_string()
        } else {
            let auth_header = headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())?;
            auth_header.strip_prefix("Bearer ")?.trim().to_string()
        };

        self.verify(&token)
    }
}

/// Create an HS256 session token. Used by tests and local tooling; production
/// tokens come from the identity provider.
pub fn create_session_token(claims_for: &UserProfile, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: claims_for.external_auth_id.clone(),
        iat: now,
        exp: now + 60 * 60, // 1 hour
        email: claims_for.email.clone(),
        first_name: claims_for.first_name.clone(),
        last_name: claims_for.last_name.clone(),
        image_url: claims_for.image_url.clone(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    const KEY: &[u8] = b"unit_test_key_32_bytes_minimum!!";

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            external_auth_id: id.to_string(),
            email: Some("me@example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_token_roundtrip_keeps_profile_claims() {
        let token = create_session_token(&profile("user_abc"), KEY).unwrap();
        let claims = IdentityVerifier::hs256(KEY).verify(&token).unwrap();
        assert_eq!(claims.sub, "user_abc");
        assert_eq!(claims.profile().email.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let token = create_session_token(&profile("user_abc"), KEY).unwrap();
        let other = IdentityVerifier::hs256(b"another_key_that_is_long_enough!");
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_cookie_takes_precedence_over_header() {
        let verifier = IdentityVerifier::hs256(KEY);
        let cookie_token = create_session_token(&profile("from_cookie"), KEY).unwrap();
        let header_token = create_session_token(&profile("from_header"), KEY).unwrap();

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, cookie_token));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", header_token)).unwrap(),
        );

        let claims = verifier.resolve(&jar, &headers).unwrap();
        assert_eq!(claims.sub, "from_cookie");

        let claims = verifier.resolve(&CookieJar::new(), &headers).unwrap();
        assert_eq!(claims.sub, "from_header");
    }

    #[test]
    fn test_missing_or_malformed_credentials() {
        let verifier = IdentityVerifier::hs256(KEY);
        assert!(verifier.resolve(&CookieJar::new(), &HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(verifier.resolve(&CookieJar::new(), &headers).is_none());
    }
}
