use axum::{
    Router,
    routing::get,
    extract::Extension,
    response::Json as RespJson,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub fn catalog_router() -> Router {
    Router::new()
        .route("/api/trainers", get(list_trainers))
        .route("/api/pricing", get(list_pricing_plans))
        .route("/api/health", get(health))
}

async fn health() -> RespJson<Value> {
    RespJson(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

async fn list_trainers(Extension(state): Extension<AppState>) -> Result<RespJson<Value>, ApiError> {
    let trainers = state
        .store
        .list_trainers()
        .await
        .map_err(state.fail("Failed to fetch trainers"))?;

    Ok(RespJson(json!({ "success": true, "data": trainers })))
}

async fn list_pricing_plans(Extension(state): Extension<AppState>) -> Result<RespJson<Value>, ApiError> {
    let plans = state
        .store
        .list_pricing_plans()
        .await
        .map_err(state.fail("Failed to fetch pricing plans"))?;

    Ok(RespJson(json!({ "success": true, "data": plans })))
}
