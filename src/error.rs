use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Catalog failed to load: {0}")]
    CatalogLoad(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::CatalogLoad(e) => {
                tracing::error!(error = %e, "Catalog load error");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::CatalogUnavailable(msg) => {
                tracing::warn!(error = %msg, "Catalog unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::ConfigError(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
