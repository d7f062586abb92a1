use axum::{
    extract::{Json, State},
    response::Response,
};
use tracing::{error, info};

use super::AuthResponse;
use crate::{
    db::user_repository::CreateUserError,
    models::{
        signup::RegisterPayload,
        user::{NewUser, PublicUser, UserRole},
    },
    responses::JsonResponse,
    state::AppState,
    utils::{
        password::hash_password_async,
        validation::{normalize_email, validate_payload},
    },
};

const USER_EXISTS: &str = "User already exists";

pub async fn handle_register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Response {
    let mut payload = payload;
    payload.email = normalize_email(&payload.email);
    payload.name = payload
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    if let Err(details) = validate_payload(&payload) {
        return JsonResponse::validation_failed(details);
    }

    match state.db.is_email_taken(&payload.email).await {
        Ok(true) => return JsonResponse::conflict(USER_EXISTS),
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
        name: payload.name,
        role: UserRole::User,
    };
    let user = match state.db.create_user(&new_user).await {
        Ok(user) => user,
        Err(CreateUserError::DuplicateEmail) => return JsonResponse::conflict(USER_EXISTS),
        Err(CreateUserError::Database(e)) => {
            error!(error = ?e, "failed to insert user");
            return JsonResponse::server_error("Could not create user");
        }
    };

    let public = PublicUser::from(&user);
    match state.tokens.issue(&public) {
        Ok(token) => {
            info!(user_id = %user.id, "registered new user");
            JsonResponse::created(AuthResponse {
                user: public,
                token,
                expires_in: state.tokens.ttl().num_seconds(),
            })
        }
        Err(e) => {
            error!(error = ?e, "failed to sign access token");
            JsonResponse::server_error("Token generation failed")
        }
    }
}
