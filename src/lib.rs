//! Backend of the gym website: booking submissions, contact messages,
//! newsletter signups and the program/trainer/pricing catalog.
//!
//! Bookings are de-duplicated per user and target: a user may hold at most one
//! non-cancelled booking for a given program, trainer or pricing plan. The
//! guarantee lives in the datastore (`store::BookingStore::insert_booking`), so
//! concurrent submissions cannot both get through.

use std::path::Path;

use axum::{extract::Extension, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use routes::booking::booking_router;
use routes::catalog::catalog_router;
use routes::contact::contact_router;
use routes::newsletter::newsletter_router;
use state::AppState;

/// Assembles every API route around `state`.
///
/// When `frontend_dir` is given, any other path is served from it, falling
/// back to its `index.html` so client-side routes of the SPA resolve.
pub fn build_router(state: AppState, frontend_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .merge(booking_router())
        .merge(contact_router())
        .merge(newsletter_router())
        .merge(catalog_router());

    if let Some(dir) = frontend_dir {
        let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(serve_dir);
    }

    app.layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}
