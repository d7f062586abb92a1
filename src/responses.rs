use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::utils::validation::FieldError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Error envelope: `{ "success": false, "error": { "message", "code"?, "details"? } }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub error: ApiError,
}

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonData<T> {
    pub success: bool,
    pub data: T,
}

impl JsonResponse {
    pub fn ok<T: Serialize>(data: T) -> Response {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created<T: Serialize>(data: T) -> Response {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status<T: Serialize>(status: StatusCode, data: T) -> Response {
        (
            status,
            Json(JsonData {
                success: true,
                data,
            }),
        )
            .into_response()
    }

    pub fn error(status: StatusCode, msg: &str) -> Response {
        (
            status,
            Json(JsonResponse {
                success: false,
                error: ApiError {
                    message: msg.to_string(),
                    code: None,
                    details: None,
                },
            }),
        )
            .into_response()
    }

    pub fn validation_failed(details: Vec<FieldError>) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(JsonResponse {
                success: false,
                error: ApiError {
                    message: "Validation failed".to_string(),
                    code: Some("VALIDATION_FAILED".to_string()),
                    details: Some(details),
                },
            }),
        )
            .into_response()
    }

    pub fn unauthorized(msg: &str) -> Response {
        Self::error(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: &str) -> Response {
        Self::error(StatusCode::FORBIDDEN, msg)
    }

    pub fn not_found(msg: &str) -> Response {
        Self::error(StatusCode::NOT_FOUND, msg)
    }

    pub fn conflict(msg: &str) -> Response {
        Self::error(StatusCode::CONFLICT, msg)
    }

    pub fn server_error(msg: &str) -> Response {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}
