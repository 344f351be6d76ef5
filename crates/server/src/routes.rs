use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod contact;
pub mod services;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    common::metrics::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public catalog reads, contact, admin
/// login and the session-protected admin catalog.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/services", get(services::list))
        .route("/api/services/search", get(services::search))
        .route("/api/services/:slug", get(services::get))
        .route("/api/contact", post(contact::submit))
        .route("/api/admin/login", post(auth::login).delete(auth::logout))
        .route("/api/admin/logout", post(auth::logout));

    let admin_routes = Router::new()
        .route("/api/admin/services", get(admin::list).post(admin::create))
        .route("/api/admin/services/import", post(admin::import))
        .route(
            "/api/admin/services/:slug",
            get(admin::get).put(admin::update).delete(admin::remove),
        )
        .route("/api/admin/services/:slug/rename", post(admin::rename))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_admin));

    public
        .merge(admin_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
