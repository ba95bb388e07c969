//! CRUD backend for a small competition scoring tracker: athletes and
//! per-wod scores in a SQLite table store, exposed as an action-dispatch
//! HTTP API.

use axum::{routing::get, Router};
use sqlx::sqlite::SqlitePool;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

pub mod db;
pub mod error;
pub mod models;
pub mod routes;

/// Build the application router around an explicit database handle.
pub fn app(pool: SqlitePool) -> Router {
    // CORS configuration for the scoreboard frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/",
            get(routes::api::handle_get).post(routes::api::handle_post),
        )
        .route("/health", get(routes::health::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}
