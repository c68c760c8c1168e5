//! User records kept in the relational side store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full user row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    /// Identity provider user ID (unique key)
    pub external_auth_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub is_admin: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn flags(&self) -> RoleFlags {
        RoleFlags {
            is_admin: self.is_admin,
            is_banned: self.is_banned,
        }
    }
}

/// Role flags consulted by the authorization gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_banned: bool,
}

/// Profile fields synced from the identity provider.
///
/// Deliberately carries no role flags: a sync can never grant or revoke them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub external_auth_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

/// Admin edit of a user's flags. `None` leaves the flag untouched.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RoleUpdate {
    pub is_admin: Option<bool>,
    pub is_banned: Option<bool>,
}
