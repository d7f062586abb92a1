use axum::{
    extract::{Json, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::{
    auth::AdminUser,
    db::user_repository::CreateUserError,
    models::user::{NewUser, UserRole, UserSummary},
    responses::JsonResponse,
    state::AppState,
    utils::{
        password::hash_password_async,
        validation::{normalize_email, validate_payload},
    },
};

const ADMIN_EXISTS: &str = "User with this email already exists";

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct CreateAdminPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

pub async fn list_users(State(state): State<AppState>, AdminUser(_admin): AdminUser) -> Response {
    match state.db.list_users().await {
        Ok(users) => {
            let users: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
            JsonResponse::ok(json!({ "users": users }))
        }
        Err(e) => {
            error!(error = ?e, "failed to list users");
            JsonResponse::server_error("Database error")
        }
    }
}

pub async fn create_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(mut payload): Json<CreateAdminPayload>,
) -> Response {
    payload.email = normalize_email(&payload.email);
    payload.name = payload.name.trim().to_string();
    if let Err(details) = validate_payload(&payload) {
        return JsonResponse::validation_failed(details);
    }

    match state.db.is_email_taken(&payload.email).await {
        Ok(true) => return JsonResponse::conflict(ADMIN_EXISTS),
        Ok(false) => {}
        Err(e) => {
            error!(error = ?e, "failed to check email availability");
            return JsonResponse::server_error("Database error");
        }
    }

    let password_hash = match hash_password_async(payload.password).await {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = ?e, "password hashing failed");
            return JsonResponse::server_error("Password hashing failed");
        }
    };

    let new_user = NewUser {
        email: payload.email,
        password_hash,
        name: Some(payload.name),
        role: UserRole::Admin,
    };
    match state.db.create_user(&new_user).await {
        Ok(user) => {
            info!(created_by = %admin.id, user_id = %user.id, "created admin user");
            JsonResponse::created(json!({
                "message": "Admin user created successfully",
                "user": UserSummary::from(&user),
            }))
        }
        Err(CreateUserError::DuplicateEmail) => JsonResponse::conflict(ADMIN_EXISTS),
        Err(CreateUserError::Database(e)) => {
            error!(error = ?e, "failed to insert admin user");
            JsonResponse::server_error("Could not create user")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{http::StatusCode, Router};
    use serde_json::json;

    use crate::{
        db::{memory_user_repository::InMemoryUserRepository, user_repository::UserRepository},
        models::user::UserRole,
        routes::api_router,
        test_support::{
            bearer_for, get_request, insert_user, json_request, send, test_state, LateEmailCheck,
        },
    };

    async fn app_with(role: UserRole) -> (Router, String, Arc<InMemoryUserRepository>) {
        let (state, repo) = test_state();
        let caller = insert_user(&repo, "caller@shop.test", "password123", role).await;
        let bearer = bearer_for(&state, &caller);
        (api_router(state), bearer, repo)
    }

    #[tokio::test]
    async fn admins_can_list_users_without_credentials() {
        let (app, bearer, repo) = app_with(UserRole::Admin).await;
        insert_user(&repo, "shopper@shop.test", "password123", UserRole::User).await;

        let (status, json) = send(&app, get_request("/api/admin/users", Some(&bearer))).await;

        assert_eq!(status, StatusCode::OK);
        let users = json["data"]["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.get("passwordHash").is_none()));
        assert!(users.iter().all(|u| u["createdAt"].is_string()));
    }

    #[tokio::test]
    async fn regular_users_are_forbidden() {
        let (app, bearer, _) = app_with(UserRole::User).await;

        let (status, json) = send(&app, get_request("/api/admin/users", Some(&bearer))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["message"], "Forbidden - Admin access required");
    }

    #[tokio::test]
    async fn anonymous_callers_are_unauthenticated() {
        let (app, _, _) = app_with(UserRole::Admin).await;

        let (status, _) = send(&app, get_request("/api/admin/users", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admins_can_create_admins() {
        let (app, bearer, repo) = app_with(UserRole::Admin).await;

        let (status, json) = send(
            &app,
            json_request(
                "POST",
                "/api/admin/users",
                Some(&bearer),
                json!({ "email": "new-admin@shop.test", "password": "password123", "name": "New Admin" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["user"]["role"], "ADMIN");
        let stored = repo
            .find_user_by_email("new-admin@shop.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn creating_an_existing_email_conflicts() {
        let (app, bearer, repo) = app_with(UserRole::Admin).await;

        let (status, json) = send(
            &app,
            json_request(
                "POST",
                "/api/admin/users",
                Some(&bearer),
                json!({ "email": "caller@shop.test", "password": "password123", "name": "Dup" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["message"], "User with this email already exists");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn insert_losing_a_race_still_conflicts() {
        let (mut state, repo) = test_state();
        state.db = Arc::new(LateEmailCheck(repo.clone()));
        let caller = insert_user(&repo, "caller@shop.test", "password123", UserRole::Admin).await;
        insert_user(&repo, "taken@shop.test", "password123", UserRole::User).await;
        let bearer = bearer_for(&state, &caller);

        let (status, json) = send(
            &api_router(state),
            json_request(
                "POST",
                "/api/admin/users",
                Some(&bearer),
                json!({ "email": "taken@shop.test", "password": "password123", "name": "Dup" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["message"], "User with this email already exists");
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn regular_users_cannot_create_admins() {
        let (app, bearer, repo) = app_with(UserRole::User).await;

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/admin/users",
                Some(&bearer),
                json!({ "email": "sneaky@shop.test", "password": "password123", "name": "Sneaky" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(repo.len(), 1);
    }
}
