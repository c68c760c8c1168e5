// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signature verification for identity provider webhooks.
//!
//! Signed content is `"{id}.{timestamp}.{body}"`, HMAC-SHA256 keyed with the
//! base64 part of the `whsec_` secret. The signature header holds one or more
//! space separated `v1,<base64>` entries (several during key rotation).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const ID_HEADER: &str = "svix-id";
pub const TIMESTAMP_HEADER: &str = "svix-timestamp";
pub const SIGNATURE_HEADER: &str = "svix-signature";

/// Maximum age (either direction) of a webhook timestamp.
pub const TOLERANCE_SECS: i64 = 5 * 60;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("missing header {0}")]
    MissingHeader(&'static str),
    #[error("invalid signing secret")]
    InvalidSecret,
    #[error("invalid timestamp")]
    InvalidTimestamp,
    #[error("timestamp outside tolerance")]
    Stale,
    #[error("no matching signature")]
    BadSignature,
}

/// Verifier holding a MAC keyed with the decoded secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| WebhookError::InvalidSecret)?;
        if key.is_empty() {
            return Err(WebhookError::InvalidSecret);
        }
        let mac = HmacSha256::new_from_slice(&key).map_err(|_| WebhookError::InvalidSecret)?;
        Ok(Self { mac })
    }

    /// Compute the `v1,<base64>` signature for a message.
    pub fn sign(&self, id: &str, timestamp: i64, body: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(format!("{}.{}.", id, timestamp).as_bytes());
        mac.update(body);
        format!("v1,{}", STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Verify a delivery against `now` (Unix seconds).
    pub fn verify(
        &self,
        id: Option<&str>,
        timestamp: Option<&str>,
        signatures: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), WebhookError> {
        let id = id.ok_or(WebhookError::MissingHeader(ID_HEADER))?;
        let timestamp = timestamp.ok_or(WebhookError::MissingHeader(TIMESTAMP_HEADER))?;
        let signatures = signatures.ok_or(WebhookError::MissingHeader(SIGNATURE_HEADER))?;

        let timestamp: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        if (now - timestamp).abs() > TOLERANCE_SECS {
            return Err(WebhookError::Stale);
        }

        let expected = self.sign(id, timestamp, body);
        let matched = signatures
            .split_whitespace()
            .filter(|candidate| candidate.starts_with("v1,"))
            .any(|candidate| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes())));

        if matched {
            Ok(())
        } else {
            Err(WebhookError::BadSignature)
        }
    }
}

/// Message ids already handled, so a captured delivery cannot be replayed
/// while its timestamp is still inside the tolerance window.
///
/// Entries are keyed by message id and hold the delivery timestamp; they are
/// pruned once that timestamp falls outside [`TOLERANCE_SECS`], at which
/// point signature verification rejects the delivery as stale anyway.
#[derive(Clone, Default)]
pub struct ReplayGuard {
    seen: Arc<DashMap<String, i64>>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a verified message id. Returns `false` if it was already claimed.
    pub fn claim(&self, id: &str, timestamp: i64, now: i64) -> bool {
        self.seen
            .retain(|_, seen_at| (now - *seen_at).abs() <= TOLERANCE_SECS);

        match self.seen.entry(id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(timestamp);
                true
            }
        }
    }

    /// Forget a claim so a redelivery of the same message is processed.
    pub fn release(&self, id: &str) {
        self.seen.remove(id);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
