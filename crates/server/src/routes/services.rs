//! Public catalog reads. No authentication; inactive records are invisible.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use service::errors::CatalogError;
use service::storage::Source;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const SOURCE_HEADER: &str = "x-catalog-source";

/// JSON body tagged with where the data came from.
pub(crate) fn with_source(source: Source, body: Value) -> Response {
    (
        [(HeaderName::from_static(SOURCE_HEADER), HeaderValue::from_static(source.as_str()))],
        Json(body),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[utoipa::path(get, path = "/api/services", tag = "services", responses((status = 200, description = "Active services in display order", body = crate::openapi::ServiceListDoc), (status = 503, description = "Storage unavailable")))]
pub async fn list(State(state): State<AppState>) -> Result<Response, JsonApiError> {
    let fetched = state.catalog.list_active().await?;
    Ok(with_source(fetched.source, json!({"services": fetched.value, "source": fetched.source.as_str()})))
}

#[utoipa::path(get, path = "/api/services/search", tag = "services", params(("q" = Option<String>, Query, description = "Case-insensitive search term")), responses((status = 200, description = "Matching active services", body = crate::openapi::ServiceListDoc)))]
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Response, JsonApiError> {
    let fetched = state.catalog.search(&params.q).await?;
    Ok(with_source(
        fetched.source,
        json!({"services": fetched.value, "query": params.q, "source": fetched.source.as_str()}),
    ))
}

#[utoipa::path(get, path = "/api/services/{slug}", tag = "services", params(("slug" = String, Path, description = "Service slug")), responses((status = 200, description = "The service", body = crate::openapi::ServiceDoc), (status = 404, description = "Unknown or inactive slug")))]
pub async fn get(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response, JsonApiError> {
    let fetched = state.catalog.get_public(&slug).await?;
    let Some(service) = fetched.value else {
        return Err(CatalogError::NotFound(slug).into());
    };
    Ok(with_source(fetched.source, json!({"service": service})))
}
