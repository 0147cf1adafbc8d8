use axum::{
    Router,
    routing::post,
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::Json as RespJson,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::model::newsletter::{SubscribeRequest, Subscription};
use crate::services::contact::subscribe;
use crate::state::{invalid_body, AppState};

pub fn newsletter_router() -> Router {
    Router::new().route("/api/newsletter", post(create_subscription).get(list_subscribers))
}

async fn create_subscription(
    Extension(state): Extension<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<(StatusCode, RespJson<Value>), ApiError> {
    let fail = state.fail("Failed to subscribe");

    let Json(request) = payload.map_err(|rejection| fail(invalid_body(rejection)))?;
    let subscription = subscribe(state.store.as_ref(), request.email.as_deref())
        .await
        .map_err(&fail)?;

    let (status, message, subscriber) = match subscription {
        Subscription::Created(s) => (StatusCode::CREATED, "Subscribed successfully", s),
        Subscription::AlreadySubscribed(s) => (StatusCode::OK, "Already subscribed", s),
    };

    Ok((
        status,
        RespJson(json!({
            "success": true,
            "message": message,
            "data": subscriber,
        })),
    ))
}

async fn list_subscribers(Extension(state): Extension<AppState>) -> Result<RespJson<Value>, ApiError> {
    let subscribers = state
        .store
        .list_subscribers()
        .await
        .map_err(state.fail("Failed to fetch subscribers"))?;

    Ok(RespJson(json!({
        "success": true,
        "total": subscribers.len(),
        "data": subscribers,
    })))
}
