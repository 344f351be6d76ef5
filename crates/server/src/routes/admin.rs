//! Admin catalog surface. Every route here sits behind [`require_admin`].

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::JsonApiError;
use crate::routes::auth::SESSION_COOKIE;
use crate::routes::services::with_source;
use crate::state::AppState;

/// Middleware: reject requests without a valid admin session cookie.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()).unwrap_or_default();
    state.auth.verify(&token)?;
    Ok(next.run(req).await)
}

#[derive(Debug, Deserialize)]
pub struct RenameInput {
    pub slug: String,
}

#[utoipa::path(get, path = "/api/admin/services", tag = "admin", responses((status = 200, description = "All services including inactive", body = crate::openapi::ServiceListDoc), (status = 401, description = "Unauthorized")))]
pub async fn list(State(state): State<AppState>) -> Result<Response, JsonApiError> {
    let fetched = state.catalog.list_all().await?;
    Ok(with_source(
        fetched.source,
        json!({"success": true, "services": fetched.value, "source": fetched.source.as_str()}),
    ))
}

#[utoipa::path(post, path = "/api/admin/services", tag = "admin", request_body = crate::openapi::ServiceDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 409, description = "Slug already exists")))]
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> Result<Response, JsonApiError> {
    let service = state.catalog.create(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Service created successfully", "service": service})),
    )
        .into_response())
}

#[utoipa::path(get, path = "/api/admin/services/{slug}", tag = "admin", params(("slug" = String, Path, description = "Service slug")), responses((status = 200, description = "The service, active or not", body = crate::openapi::ServiceDoc), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Value>, JsonApiError> {
    let service = state.catalog.get_for_admin(&slug).await?;
    Ok(Json(json!({"success": true, "service": service})))
}

#[utoipa::path(put, path = "/api/admin/services/{slug}", tag = "admin", params(("slug" = String, Path, description = "Service slug")), request_body = crate::openapi::ServicePatchDoc, responses((status = 200, description = "Updated"), (status = 400, description = "Validation failed"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, JsonApiError> {
    let service = state.catalog.update(&slug, &patch).await?;
    Ok(Json(json!({"success": true, "message": "Service updated successfully", "service": service})))
}

#[utoipa::path(delete, path = "/api/admin/services/{slug}", tag = "admin", params(("slug" = String, Path, description = "Service slug")), responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn remove(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Value>, JsonApiError> {
    state.catalog.remove(&slug).await?;
    Ok(Json(json!({"success": true, "message": "Service deleted successfully"})))
}

#[utoipa::path(post, path = "/api/admin/services/{slug}/rename", tag = "admin", params(("slug" = String, Path, description = "Current slug")), request_body = crate::openapi::RenameRequest, responses((status = 200, description = "Renamed"), (status = 400, description = "Invalid slug"), (status = 404, description = "Not found"), (status = 409, description = "Slug already exists")))]
pub async fn rename(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<RenameInput>,
) -> Result<Json<Value>, JsonApiError> {
    let service = state.catalog.rename(&slug, &input.slug).await?;
    Ok(Json(json!({"success": true, "message": "Service renamed successfully", "service": service})))
}

#[utoipa::path(post, path = "/api/admin/services/import", tag = "admin", request_body = [crate::openapi::ServiceDoc], responses((status = 200, description = "Import report")))]
pub async fn import(State(state): State<AppState>, Json(payloads): Json<Vec<Value>>) -> Result<Json<Value>, JsonApiError> {
    let report = state.catalog.import(&payloads).await?;
    Ok(Json(json!({"success": true, "report": report})))
}
