use std::sync::Arc;

use uuid::Uuid;

use crate::db::user_repository::UserRepository;
use crate::models::user::PublicUser;
use crate::utils::jwt::TokenService;

const BEARER_PREFIX: &str = "Bearer ";

/// Maps an `Authorization` header to the live user it identifies.
///
/// The token only proves who the caller was at issuance. The record is
/// fetched again on every call so that a deleted account or a changed role
/// takes effect on the next request, even while the token is still valid.
#[derive(Clone)]
pub struct IdentityResolver {
    db: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl IdentityResolver {
    pub fn new(db: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { db, tokens }
    }

    /// `Ok(None)` covers every "not authenticated" outcome. `Err` is reserved
    /// for the store being unreachable.
    pub async fn resolve_from_bearer(
        &self,
        authorization: Option<&str>,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        let Some(token) = authorization.and_then(bearer_token) else {
            return Ok(None);
        };

        let Some(claims) = self.tokens.verify(token) else {
            return Ok(None);
        };

        let Ok(user_id) = Uuid::parse_str(&claims.user_id) else {
            tracing::warn!("verified token carries a malformed user id");
            return Ok(None);
        };

        let user = self.db.find_public_user_by_id(user_id).await?;
        if user.is_none() {
            tracing::debug!(%user_id, "token subject no longer exists");
        }
        Ok(user)
    }
}

pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
