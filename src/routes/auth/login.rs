use axum::{
    extract::{Json, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::Validate;

use super::AuthResponse;
use crate::{
    models::user::PublicUser,
    responses::JsonResponse,
    state::AppState,
    utils::{
        password::verify_password_async,
        validation::{normalize_email, validate_payload},
    },
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct LoginPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

pub async fn handle_login(
    State(app_state): State<AppState>,
    Json(mut payload): Json<LoginPayload>,
) -> Response {
    payload.email = normalize_email(&payload.email);
    if let Err(details) = validate_payload(&payload) {
        return JsonResponse::validation_failed(details);
    }

    let user = match app_state.db.find_user_by_email(&payload.email).await {
        Ok(Some(record)) => record,
        Ok(None) => return JsonResponse::unauthorized(INVALID_CREDENTIALS),
        Err(e) => {
            error!(error = ?e, "failed to look up user during login");
            return JsonResponse::server_error("Database error");
        }
    };

    match verify_password_async(payload.password, user.password_hash.clone()).await {
        Ok(true) => {}
        Ok(false) => return JsonResponse::unauthorized(INVALID_CREDENTIALS),
        Err(e) => {
            error!(error = ?e, "password verification task failed");
            return JsonResponse::server_error("Internal error");
        }
    }

    let public = PublicUser::from(&user);
    match app_state.tokens.issue(&public) {
        Ok(token) => {
            info!(user_id = %user.id, "user logged in");
            JsonResponse::ok(AuthResponse {
                user: public,
                token,
                expires_in: app_state.tokens.ttl().num_seconds(),
            })
        }
        Err(e) => {
            error!(error = ?e, "failed to sign access token");
            JsonResponse::server_error("Token generation failed")
        }
    }
}
