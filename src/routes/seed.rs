use axum::{
    extract::{Json, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use crate::{
    models::user::{NewUser, UserRole, UserSummary},
    responses::JsonResponse,
    state::AppState,
    utils::{password::hash_password_async, validation::normalize_email},
};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SeedPayload {
    pub secret: String,
}

fn secret_matches(expected: Option<&str>, provided: &str) -> bool {
    match expected {
        Some(expected) => bool::from(expected.as_bytes().ct_eq(provided.as_bytes())),
        None => false,
    }
}

/// Bootstraps the primary admin account from `ADMIN_*` configuration.
/// Disabled unless `SEED_SECRET` is set.
pub async fn handle_seed(
    State(state): State<AppState>,
    Json(payload): Json<SeedPayload>,
) -> Response {
    let config = &state.config;
    if !secret_matches(config.seed_secret.as_deref(), &payload.secret) {
        warn!("rejected seed request");
        return JsonResponse::unauthorized("Unauthorized");
    }

    let Some(password) = config.seed_admin.password.clone() else {
        error!("seed requested but ADMIN_PASSWORD is not configured");
        return JsonResponse::server_error("Admin credentials are not configured");
    };

    let password_hash = match hash_password_async(password).await {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = ?e, "password hashing failed");
            return JsonResponse::server_error("Password hashing failed");
        }
    };

    let admin = NewUser {
        email: normalize_email(&config.seed_admin.email),
        password_hash,
        name: Some(config.seed_admin.name.clone()),
        role: UserRole::Admin,
    };
    match state.db.upsert_user(&admin).await {
        Ok(user) => {
            info!(user_id = %user.id, "seeded primary admin");
            JsonResponse::ok(json!({
                "message": "Database seeded successfully",
                "admin": UserSummary::from(&user),
            }))
        }
        Err(e) => {
            error!(error = ?e, "failed to seed admin user");
            JsonResponse::server_error("Could not seed admin user")
        }
    }
}
