use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::policy::{AccessError, AccessPolicy};
use crate::models::user::PublicUser;
use crate::state::AppState;

/// Any signed-in user. Rejects with 401 before the handler runs.
#[derive(Debug)]
pub struct CurrentUser(pub PublicUser);

/// Signed-in user whose live record has the ADMIN role. 401 without a
/// usable token, 403 for everyone else.
#[derive(Debug)]
pub struct AdminUser(pub PublicUser);

async fn guard<S>(
    parts: &Parts,
    state: &S,
    policy: AccessPolicy,
) -> Result<PublicUser, AccessError>
where
    AppState: FromRef<S>,
{
    let app_state = AppState::from_ref(state);
    let authorization = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    policy.authorize(&app_state.resolver(), authorization).await
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, state, AccessPolicy::Authenticated)
            .await
            .map(CurrentUser)
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, state, AccessPolicy::Admin).await.map(AdminUser)
    }
}
