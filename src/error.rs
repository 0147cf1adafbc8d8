use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as RespJson, Response},
};
use serde_json::json;
use thiserror::Error;

pub const DUPLICATE_BOOKING_MESSAGE: &str = "A booking for this selection already exists. \
     Please wait for it to be processed or cancel it before booking again.";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Request content failed validation; `fields` names the offending inputs.
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<&'static str>,
    },

    /// An active booking already exists for the same user and target.
    #[error("{}", DUPLICATE_BOOKING_MESSAGE)]
    Conflict,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>, fields: Vec<&'static str>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An [`AppError`] bound to the handler that produced it.
///
/// `failure` is the generic message shown for unexpected (500) failures, e.g.
/// "Failed to submit booking". The underlying database message is attached as
/// `error` only when `expose_details` is set, which is the case outside
/// production.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub failure: &'static str,
    pub expose_details: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();

        let body = match &self.error {
            AppError::Validation { message, fields } => json!({
                "success": false,
                "message": message,
                "fields": fields,
            }),
            AppError::Conflict | AppError::NotFound(_) => json!({
                "success": false,
                "message": self.error.to_string(),
            }),
            AppError::Persistence(e) => {
                tracing::error!(error = %e, "{}", self.failure);
                if self.expose_details {
                    json!({
                        "success": false,
                        "message": self.failure,
                        "error": e.to_string(),
                    })
                } else {
                    json!({
                        "success": false,
                        "message": self.failure,
                    })
                }
            }
        };

        (status, RespJson(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn persistence_details_hidden_in_production() {
        let hidden = ApiError {
            error: AppError::Persistence(sqlx::Error::PoolTimedOut),
            failure: "Failed to submit booking",
            expose_details: false,
        }
        .into_response();
        assert_eq!(hidden.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(hidden).await;
        assert_eq!(body["message"], "Failed to submit booking");
        assert!(body.get("error").is_none());

        let shown = ApiError {
            error: AppError::Persistence(sqlx::Error::PoolTimedOut),
            failure: "Failed to submit booking",
            expose_details: true,
        }
        .into_response();
        let body = body_of(shown).await;
        assert!(body["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        let response = ApiError {
            error: AppError::validation("Name and email are required", vec!["name", "email"]),
            failure: "Failed to submit booking",
            expose_details: true,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Name and email are required");
        assert_eq!(body["fields"], json!(["name", "email"]));
    }
}
