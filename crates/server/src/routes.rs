use std::path::PathBuf;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::catalogue::CatalogueService;

use crate::errors::ApiError;

pub mod catalogue;
pub mod images;

/// Shared handler state: the catalogue service plus the two pieces of
/// configuration the handlers need directly (where uploads land, and the
/// base address used when building `image_url`s).
#[derive(Clone)]
pub struct ServerState {
    pub catalogue: CatalogueService,
    pub uploads_dir: PathBuf,
    pub public_base_url: String,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not found")
}

/// Build the full application router: catalogue routes, image serving,
/// health, CORS, and request tracing.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", post(catalogue::search_products))
        .route("/upload", post(catalogue::upload_image))
        .route("/compare", get(catalogue::compare_products))
        .route("/images/:filename", get(images::serve_image))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
