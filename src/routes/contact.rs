use axum::{
    Router,
    routing::post,
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::Json as RespJson,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::model::contact::{ContactRequest, NewContact};
use crate::services::contact::submit_contact;
use crate::state::{invalid_body, AppState};

pub fn contact_router() -> Router {
    Router::new().route("/api/contact", post(create_contact).get(list_contacts))
}

async fn create_contact(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<(StatusCode, RespJson<Value>), ApiError> {
    let fail = state.fail("Failed to send message");

    let Json(request) = payload.map_err(|rejection| fail(invalid_body(rejection)))?;
    let contact = NewContact::parse(request).map_err(&fail)?;
    let stored = submit_contact(state.store.as_ref(), contact).await.map_err(&fail)?;

    Ok((
        StatusCode::CREATED,
        RespJson(json!({
            "success": true,
            "message": "Message sent successfully",
            "data": { "id": stored.id, "createdAt": stored.created_at },
        })),
    ))
}

async fn list_contacts(Extension(state): Extension<AppState>) -> Result<RespJson<Value>, ApiError> {
    let contacts = state
        .store
        .list_contacts()
        .await
        .map_err(state.fail("Failed to fetch messages"))?;

    Ok(RespJson(json!({
        "success": true,
        "total": contacts.len(),
        "data": contacts,
    })))
}
