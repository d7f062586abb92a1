//! Fixtures shared by the unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{
        memory_user_repository::InMemoryUserRepository,
        user_repository::{CreateUserError, UserRepository},
    },
    models::user::{NewUser, PublicUser, User, UserRole},
    state::AppState,
    utils::{
        jwt::{JwtKeys, TokenService, DEFAULT_TOKEN_TTL},
        password::hash_password,
    },
};

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const TEST_SEED_SECRET: &str = "let-me-seed";

pub fn test_tokens() -> TokenService {
    TokenService::new(
        JwtKeys::from_secret(TEST_SECRET).expect("test secret is valid"),
        DEFAULT_TOKEN_TTL,
    )
}

pub fn test_config() -> Config {
    Config::from_lookup(|name| match name {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "SEED_SECRET" => Some(TEST_SEED_SECRET.to_string()),
        "ADMIN_EMAIL" => Some("owner@shop.test".to_string()),
        "ADMIN_PASSWORD" => Some("owner-password".to_string()),
        "ADMIN_NAME" => Some("Shop Owner".to_string()),
        _ => None,
    })
    .expect("test config is valid")
}

pub fn test_state() -> (AppState, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::new());
    let state = AppState {
        db: repo.clone(),
        tokens: Arc::new(test_tokens()),
        config: Arc::new(test_config()),
    };
    (state, repo)
}

pub async fn insert_user(
    repo: &InMemoryUserRepository,
    email: &str,
    password: &str,
    role: UserRole,
) -> User {
    repo.create_user(&NewUser {
        email: email.to_string(),
        password_hash: hash_password(password).expect("hashing works in tests"),
        name: Some("Test User".to_string()),
        role,
    })
    .await
    .expect("fixture user is unique")
}

pub fn bearer_for(state: &AppState, user: &User) -> String {
    let token = state
        .tokens
        .issue(&PublicUser::from(user))
        .expect("token should encode");
    format!("Bearer {token}")
}

pub fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = bearer {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = bearer {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Store whose availability check always reports a free email, as when a
/// concurrent signup commits between the check and the insert.
pub struct LateEmailCheck(pub Arc<InMemoryUserRepository>);

#[async_trait]
impl UserRepository for LateEmailCheck {
    async fn find_public_user_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        self.0.find_public_user_by_id(user_id).await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.0.find_user_by_id(user_id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.0.find_user_by_email(email).await
    }

    async fn is_email_taken(&self, _email: &str) -> Result<bool, sqlx::Error> {
        Ok(false)
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, CreateUserError> {
        self.0.create_user(new_user).await
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        self.0.update_user_password(user_id, password_hash).await
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        self.0.list_users().await
    }

    async fn upsert_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        self.0.upsert_user(new_user).await
    }
}
