// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (identity, authorization gate, security headers).

pub mod auth;
pub mod gate;
pub mod security;

pub use auth::{AuthUser, IdentityVerifier};
pub use gate::{authorize, RouteRules};
