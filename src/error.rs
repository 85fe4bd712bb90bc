use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const INVALID_ANSWERS_MESSAGE: &str = "Invalid answers format. Expected 25 answers.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid answers format. Expected 25 answers.")]
    InvalidInput,

    #[error("ML model not loaded")]
    ModelUnavailable,

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the `prediction_errors_total` counter.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput => "invalid_input",
            AppError::ModelUnavailable => "model_unavailable",
            _ => "internal",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::InvalidInput | AppError::ModelUnavailable | AppError::PredictionFailed(_) => {
                self.to_string()
            }
            other => format!("Prediction failed: {}", other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "message": self.message(),
        }));

        (status, body).into_response()
    }
}

// Helper function for creating outer-boundary failures
pub fn prediction_failed(detail: impl std::fmt::Display) -> AppError {
    AppError::PredictionFailed(detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::ModelUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            prediction_failed("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(AppError::InvalidInput.message(), INVALID_ANSWERS_MESSAGE);
        assert_eq!(AppError::ModelUnavailable.message(), "ML model not loaded");
        assert_eq!(
            prediction_failed("bad body").message(),
            "Prediction failed: bad body"
        );

        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(io.message().starts_with("Prediction failed: IO error"));
    }
}
