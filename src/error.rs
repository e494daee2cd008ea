use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::response::{IntoResponse, Response};
use axum::{http::StatusCode, Json};
use serde_json::json;
use tracing::{error, warn};

use crate::models::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(String),
    #[error("Todo not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("validation failed")]
    Validation(FieldErrors),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(msg) => {
                error!(error = %msg, "Database failure");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": AppError::NotFound.to_string() }),
            ),
            AppError::BadRequest(msg) => {
                warn!(error = %msg, "Rejected malformed request");
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::Validation(fields) => {
                warn!(fields = ?fields, "Rejected invalid todo");
                let messages: Vec<&String> = fields.values().collect();
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": messages, "fields": fields }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
