pub mod admin;
pub mod auth;
pub mod seed;

use axum::{
    response::Response,
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::{responses::JsonResponse, state::AppState};

/// Every `/api` route. Access rules live on the handlers' extractors.
pub fn api_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::handle_register))
        .route("/login", post(auth::handle_login))
        .route("/me", get(auth::handle_me));

    let admin_routes = Router::new()
        .route(
            "/users",
            get(admin::users::list_users).post(admin::users::create_admin),
        )
        .route(
            "/change-password",
            post(admin::change_password::handle_change_password),
        );

    let api = Router::new()
        .route("/health", get(health))
        .route("/seed", post(seed::handle_seed))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes);

    Router::new().nest("/api", api).with_state(state)
}

async fn health() -> Response {
    JsonResponse::ok(json!({ "status": "ok" }))
}
