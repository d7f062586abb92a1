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
    responses::JsonResponse,
    state::AppState,
    utils::{
        password::{hash_password_async, verify_password_async},
        validation::validate_payload,
    },
};

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Replaces the caller's credential. Two concurrent changes race in the
/// store; the last write wins.
pub async fn handle_change_password(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> Response {
    if let Err(details) = validate_payload(&payload) {
        return JsonResponse::validation_failed(details);
    }

    let user = match state.db.find_user_by_id(admin.id).await {
        Ok(Some(user)) => user,
        Ok(None) => return JsonResponse::not_found("User not found"),
        Err(e) => {
            error!(error = ?e, "failed to load user for password change");
            return JsonResponse::server_error("Database error");
        }
    };

    match verify_password_async(payload.current_password, user.password_hash).await {
        Ok(true) => {}
        Ok(false) => return JsonResponse::unauthorized("Current password is incorrect"),
        Err(e) => {
            error!(error = ?e, "password verification task failed");
            return JsonResponse::server_error("Internal error");
        }
    }

    let password_hash = match hash_password_async(payload.new_password).await {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = ?e, "password hashing failed");
            return JsonResponse::server_error("Password hashing failed");
        }
    };

    if let Err(e) = state.db.update_user_password(user.id, &password_hash).await {
        error!(error = ?e, user_id = %user.id, "failed to store new password");
        return JsonResponse::server_error("Could not update password");
    }

    info!(user_id = %user.id, "password changed");
    JsonResponse::ok(json!({ "message": "Password changed successfully" }))
}
