// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ai;
pub mod email;
pub mod user_sync;
pub mod webhook_signature;

pub use ai::AiService;
pub use email::EmailService;
pub use user_sync::{SyncError, UserSyncService};
pub use webhook_signature::{ReplayGuard, WebhookError, WebhookVerifier};
