use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("sign-in failed: {0}")]
    SignIn(String),

    #[error("backend request failed: {0}")]
    Backend(#[from] reqwest::Error),

    #[error("backend rejected {context}: {status}")]
    BackendRejected {
        context: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("qr renderer failed: {0}")]
    Renderer(String),

    #[error("secure randomness unavailable: {0}")]
    TokenEntropy(#[from] rand::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "not_authenticated",
                "sign in required".to_string(),
            ),
            AppError::SignIn(e) => {
                tracing::warn!("Sign-in failed: {}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    "authentication_error",
                    "sign_in_failed",
                    "sign in failed".to_string(),
                )
            }
            AppError::Backend(e) => {
                tracing::error!("Backend error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "backend_error",
                    "backend_unreachable",
                    "backend unreachable".to_string(),
                )
            }
            AppError::BackendRejected {
                context,
                status,
                body,
            } => {
                tracing::error!("Backend rejected {}: {} {}", context, status, body);
                (
                    StatusCode::BAD_GATEWAY,
                    "backend_error",
                    "backend_rejected",
                    format!("backend rejected {context}"),
                )
            }
            AppError::Renderer(e) => {
                tracing::error!("QR renderer error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "renderer_error",
                    "renderer_failed",
                    "qr renderer unavailable".to_string(),
                )
            }
            AppError::TokenEntropy(e) => {
                tracing::error!("OS entropy source failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "entropy_unavailable",
                    "internal server error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
