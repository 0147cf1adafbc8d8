use axum::{
    Router,
    routing::{get, patch, post},
    extract::{rejection::JsonRejection, Extension, Json, Path},
    http::StatusCode,
    response::Json as RespJson,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, AppError};
use crate::model::booking::{BookingCommand, BookingRequest, BookingStatus, StatusUpdateRequest};
use crate::model::catalog::ProgramView;
use crate::services::booking::submit_booking;
use crate::state::{invalid_body, AppState};

type HandlerResult = Result<(StatusCode, RespJson<Value>), ApiError>;

pub fn booking_router() -> Router {
    Router::new()
        .route("/api/book", post(create_booking).get(list_bookings))
        .route("/api/book/programs", get(list_programs))
        .route("/api/book/:id/status", patch(update_booking_status))
}

// POST /api/book - booking form from the programs, trainers and pricing pages
async fn create_booking(
    Extension(state): Extension<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> HandlerResult {
    let fail = state.fail("Failed to submit booking");

    let Json(request) = payload.map_err(|rejection| fail(invalid_body(rejection)))?;
    let command = BookingCommand::parse(request, Utc::now()).map_err(&fail)?;

    info!(kind = ?command.kind, target_name = ?command.target_name, "booking submitted");

    let receipt = submit_booking(state.store.as_ref(), command)
        .await
        .map_err(&fail)?;

    Ok((
        StatusCode::CREATED,
        RespJson(json!({
            "success": true,
            "message": "Booking submitted successfully",
            "data": receipt,
        })),
    ))
}

// GET /api/book - every booking, for the admin dashboard
async fn list_bookings(Extension(state): Extension<AppState>) -> HandlerResult {
    let bookings = state
        .store
        .list_bookings()
        .await
        .map_err(state.fail("Failed to fetch bookings"))?;

    Ok((
        StatusCode::OK,
        RespJson(json!({
            "success": true,
            "total": bookings.len(),
            "data": bookings,
        })),
    ))
}

// GET /api/book/programs
async fn list_programs(Extension(state): Extension<AppState>) -> HandlerResult {
    let programs: Vec<ProgramView> = state
        .store
        .list_programs()
        .await
        .map_err(state.fail("Failed to fetch programs"))?
        .into_iter()
        .map(ProgramView::from)
        .collect();

    Ok((StatusCode::OK, RespJson(json!({ "success": true, "data": programs }))))
}

// PATCH /api/book/:id/status - cancelling releases the slot for a new booking
async fn update_booking_status(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> HandlerResult {
    let fail = state.fail("Failed to update booking");

    let id = Uuid::parse_str(&id)
        .map_err(|_| fail(AppError::validation("Invalid booking ID", vec!["id"])))?;
    let Json(request) = payload.map_err(|rejection| fail(invalid_body(rejection)))?;
    let status = request
        .status
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .parse::<BookingStatus>()
        .map_err(&fail)?;

    let booking = state
        .store
        .update_booking_status(id, status)
        .await
        .map_err(&fail)?
        .ok_or_else(|| fail(AppError::NotFound("Booking")))?;

    info!(booking_id = %booking.id, %status, "booking status updated");

    Ok((
        StatusCode::OK,
        RespJson(json!({
            "success": true,
            "message": "Booking status updated successfully",
            "data": booking,
        })),
    ))
}
