use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::resolver::IdentityResolver;
use crate::models::user::{PublicUser, UserRole};
use crate::responses::JsonResponse;

/// Access rule a route declares once instead of re-checking inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Authenticated,
    Admin,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("Forbidden - Admin access required")]
    Forbidden,
    #[error("identity lookup failed: {0}")]
    Internal(#[from] sqlx::Error),
}

impl AccessPolicy {
    pub fn permits(self, role: UserRole) -> bool {
        match self {
            AccessPolicy::Authenticated => true,
            AccessPolicy::Admin => role == UserRole::Admin,
        }
    }

    pub async fn authorize(
        self,
        resolver: &IdentityResolver,
        authorization: Option<&str>,
    ) -> Result<PublicUser, AccessError> {
        let user = resolver
            .resolve_from_bearer(authorization)
            .await?
            .ok_or(AccessError::Unauthenticated)?;

        if !self.permits(user.role) {
            tracing::info!(user_id = %user.id, role = %user.role, policy = ?self, "access denied");
            return Err(AccessError::Forbidden);
        }

        Ok(user)
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            AccessError::Unauthenticated => JsonResponse::unauthorized(&message),
            AccessError::Forbidden => JsonResponse::forbidden(&message),
            AccessError::Internal(error) => {
                tracing::error!(?error, "failed to resolve request identity");
                JsonResponse::server_error("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use super::*;
    use crate::db::memory_user_repository::InMemoryUserRepository;
    use crate::test_support::{insert_user, test_tokens};

    async fn setup(role: UserRole) -> (Arc<InMemoryUserRepository>, IdentityResolver, String) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(test_tokens());
        let user = insert_user(&repo, "someone@shop.test", "password123", role).await;
        let header = format!("Bearer {}", tokens.issue(&PublicUser::from(&user)).unwrap());
        let resolver = IdentityResolver::new(repo.clone(), tokens);
        (repo, resolver, header)
    }

    #[test]
    fn admin_policy_only_admits_admins() {
        assert!(AccessPolicy::Authenticated.permits(UserRole::User));
        assert!(AccessPolicy::Authenticated.permits(UserRole::Admin));
        assert!(!AccessPolicy::Admin.permits(UserRole::User));
        assert!(AccessPolicy::Admin.permits(UserRole::Admin));
    }

    #[tokio::test]
    async fn no_token_is_unauthenticated() {
        let (_, resolver, _) = setup(UserRole::Admin).await;
        for policy in [AccessPolicy::Authenticated, AccessPolicy::Admin] {
            let err = policy.authorize(&resolver, None).await.unwrap_err();
            assert!(matches!(err, AccessError::Unauthenticated));
        }
    }

    #[tokio::test]
    async fn bad_token_is_unauthenticated_even_for_admin_routes() {
        let (_, resolver, _) = setup(UserRole::User).await;
        let err = AccessPolicy::Admin
            .authorize(&resolver, Some("Bearer forged.token.value"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Unauthenticated));
    }

    #[tokio::test]
    async fn user_token_on_admin_rule_is_forbidden() {
        let (_, resolver, header) = setup(UserRole::User).await;

        let user = AccessPolicy::Authenticated
            .authorize(&resolver, Some(&header))
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::User);

        let err = AccessPolicy::Admin
            .authorize(&resolver, Some(&header))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden));
    }

    #[tokio::test]
    async fn admin_token_passes_both_rules() {
        let (_, resolver, header) = setup(UserRole::Admin).await;
        for policy in [AccessPolicy::Authenticated, AccessPolicy::Admin] {
            let user = policy.authorize(&resolver, Some(&header)).await.unwrap();
            assert_eq!(user.role, UserRole::Admin);
        }
    }

    #[tokio::test]
    async fn outage_is_internal_not_unauthenticated() {
        let (repo, resolver, header) = setup(UserRole::Admin).await;
        repo.set_unavailable(true);

        let err = AccessPolicy::Authenticated
            .authorize(&resolver, Some(&header))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Internal(_)));
    }

    #[test]
    fn rejections_map_to_distinct_statuses() {
        assert_eq!(
            AccessError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AccessError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AccessError::Internal(sqlx::Error::RowNotFound)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
