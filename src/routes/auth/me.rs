use axum::response::Response;
use serde_json::json;

use crate::{auth::CurrentUser, responses::JsonResponse};

pub async fn handle_me(CurrentUser(user): CurrentUser) -> Response {
    JsonResponse::ok(json!({ "user": user }))
}
