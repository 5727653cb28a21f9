use axum::{
    extract::{DefaultBodyLimit, State},
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod prizes;

/// Images travel inline as data URIs, so bodies are allowed to be large.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health { status: "ok", backend: state.prizes.backend() })
}

/// Build the full application router: health plus the prize API.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/prizes", get(prizes::list_prizes).post(prizes::create_prize))
        .route(
            "/api/prizes/:id",
            get(prizes::get_prize)
                .patch(prizes::update_prize)
                .delete(prizes::delete_prize),
        );

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                        // 5xx responses are logged at ERROR
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}
