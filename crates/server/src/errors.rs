use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use service::auth::AuthError;
use service::contact::ContactError;
use service::errors::CatalogError;

/// Every failure an HTTP handler can return, rendered as a JSON body.
#[derive(Debug, Error)]
pub enum JsonApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Contact(#[from] ContactError),
    #[error("internal: {0}")]
    Internal(String),
}

fn internal() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "Internal server error"}))).into_response()
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        match self {
            JsonApiError::Catalog(e) => match e {
                CatalogError::ValidationFailed(details) => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "Validation failed", "details": details})),
                )
                    .into_response(),
                CatalogError::Conflict(_) => (
                    StatusCode::CONFLICT,
                    Json(json!({"error": "Service with this slug already exists"})),
                )
                    .into_response(),
                CatalogError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, Json(json!({"error": "Service not found"}))).into_response()
                }
                CatalogError::StorageUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"error": "Storage is temporarily unavailable. Please try again."})),
                )
                    .into_response(),
            },
            JsonApiError::Auth(e) => match e {
                AuthError::Validation(_) => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"success": false, "error": "Password is required"})),
                )
                    .into_response(),
                AuthError::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"success": false, "error": "Invalid password"})),
                )
                    .into_response(),
                AuthError::NotConfigured => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"success": false, "error": "Admin password not configured"})),
                )
                    .into_response(),
                AuthError::InvalidSession => {
                    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response()
                }
                other => {
                    error!(code = other.code(), error = %other, "auth failure");
                    internal()
                }
            },
            JsonApiError::Contact(e) => match e {
                ContactError::RateLimited { retry_after_secs } => {
                    let mut resp = (
                        StatusCode::TOO_MANY_REQUESTS,
                        Json(json!({
                            "success": false,
                            "error": "Too many requests. Please try again later.",
                            "retryAfter": retry_after_secs,
                        })),
                    )
                        .into_response();
                    resp.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                    resp
                }
                ContactError::Invalid(errors) => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"success": false, "error": "Validation failed", "errors": errors})),
                )
                    .into_response(),
                ContactError::Delivery(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to send message. Please try again or contact us directly.",
                    })),
                )
                    .into_response(),
            },
            JsonApiError::Internal(msg) => {
                error!(error = %msg, "internal error");
                internal()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
