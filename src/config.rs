// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

/// Page shown to banned users.
pub const SUSPENDED_PATH: &str = "/suspended";
/// Where non-admins are sent when they hit an admin route.
pub const HOME_PATH: &str = "/";
/// Sign-in page for unauthenticated page requests.
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Session cookie set by the identity provider's frontend SDK.
pub const SESSION_COOKIE: &str = "__session";

/// Routes reachable without an identity. Entries ending in `/*` match the
/// prefix and everything below it; other entries match exactly.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/health",
    "/about",
    "/contact",
    "/suspended",
    "/blog/*",
    "/portfolio/*",
    "/services/*",
    "/sign-in/*",
    "/sign-up/*",
    "/api/blogs/*",
    "/api/portfolios/*",
    "/api/services/*",
    "/api/ads/*",
    "/api/seo",
    "/api/contact",
    "/api/webhooks/*",
];

/// Routes that additionally require `is_admin`.
pub const ADMIN_ROUTES: &[&str] = &["/admin/*", "/api/admin/*"];

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// GCP project hosting the Firestore content store
    pub gcp_project_id: String,
    /// PostgreSQL URL of the user side store; in-memory store when unset
    pub database_url: Option<String>,
    /// Public site URL (CORS origin, links in emails)
    pub public_base_url: String,
    /// Sender address for outgoing email
    pub email_from: String,
    /// Recipient of contact form notifications
    pub contact_notify_email: String,
    /// AI model used for draft generation
    pub ai_model: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// HS256 key for identity provider session tokens
    pub identity_jwt_key: Vec<u8>,
    /// RS256 public key (PEM); preferred over the HS256 key when present
    pub identity_jwt_public_key: Option<String>,
    /// Identity provider webhook signing secret (`whsec_...`)
    pub identity_webhook_secret: String,
    /// Email provider API key
    pub email_api_key: String,
    /// AI provider API key
    pub ai_api_key: String,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            database_url: None,
            public_base_url: "http://localhost:3000".to_string(),
            email_from: "noreply@example.com".to_string(),
            contact_notify_email: "owner@example.com".to_string(),
            ai_model: "gemini-2.0-flash".to_string(),
            port: 8080,
            identity_jwt_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            identity_jwt_public_key: None,
            // base64("test_webhook_secret_bytes")
            identity_webhook_secret: "whsec_dGVzdF93ZWJob29rX3NlY3JldF9ieXRlcw==".to_string(),
            email_api_key: "test_email_key".to_string(),
            ai_api_key: "test_ai_key".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// For local development, values can be put in a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@localhost".to_string()),
            contact_notify_email: env::var("CONTACT_NOTIFY_EMAIL")
                .unwrap_or_else(|_| "owner@localhost".to_string()),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            public_base_url,

            identity_jwt_key: env::var("IDENTITY_JWT_KEY")
                .map_err(|_| ConfigError::Missing("IDENTITY_JWT_KEY"))?
                .into_bytes(),
            identity_jwt_public_key: env::var("IDENTITY_JWT_PUBLIC_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            identity_webhook_secret: env::var("IDENTITY_WEBHOOK_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_WEBHOOK_SECRET"))?,
            email_api_key: env::var("EMAIL_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("EMAIL_API_KEY"))?,
            ai_api_key: env::var("AI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("AI_API_KEY"))?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("IDENTITY_JWT_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("IDENTITY_WEBHOOK_SECRET", " whsec_c2VjcmV0 ");
        env::set_var("EMAIL_API_KEY", "re_test");
        env::set_var("AI_API_KEY", "ai_test");
        env::set_var("PUBLIC_BASE_URL", "https://example.com/");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.identity_webhook_secret, "whsec_c2VjcmV0");
        assert_eq!(config.public_base_url, "https://example.com");
        assert_eq!(config.email_api_key, "re_test");
    }
}
