use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::{PublicUser, UserRole};

/// Identity carried inside an access token. Taken from the user record at
/// issuance; authorization decisions re-read the live record instead.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
    pub iat: i64, // issued at (UNIX seconds)
    pub exp: i64, // expiration (UNIX seconds)
}

impl Claims {
    /// `None` when `issued_at + ttl` is past the end of the calendar.
    pub fn for_user(user: &PublicUser, issued_at: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(ttl)?;
        Some(Claims {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }
}
