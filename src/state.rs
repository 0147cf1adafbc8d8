use std::sync::Arc;

use axum::extract::rejection::JsonRejection;

use crate::error::{ApiError, AppError};
use crate::store::BookingStore;

/// Shared handler state, installed on the router as an `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    /// Attach database error details to 500 responses.
    pub expose_errors: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn BookingStore>, production: bool) -> Self {
        Self {
            store,
            expose_errors: !production,
        }
    }

    /// Error mapper for `map_err`, tagging failures with the handler's 500 message.
    pub fn fail(&self, failure: &'static str) -> impl Fn(AppError) -> ApiError {
        let expose_details = self.expose_errors;
        move |error| ApiError {
            error,
            failure,
            expose_details,
        }
    }
}

/// Malformed JSON bodies are reported with the regular validation envelope.
pub fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::validation(format!("Invalid request body: {}", rejection.body_text()), Vec::new())
}
