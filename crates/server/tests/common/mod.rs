#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use serde_json::Value;

use configs::DeletePolicy;
use server::state::AppState;
use service::auth::{AdminAuth, AdminAuthConfig};
use service::catalog::CatalogService;
use service::contact::{ContactService, ContactSettings, FixedWindowLimiter, LogMailer};
use service::storage::{CollectionBackend, MemoryStore};

pub const ADMIN_PASSWORD: &str = "let-me-in";
pub const CONTACT_LIMIT: u32 = 2;

pub fn state_with(store: MemoryStore, policy: DeletePolicy) -> anyhow::Result<AppState> {
    let catalog = CatalogService::new(Arc::new(CollectionBackend::new(store, policy)));
    let auth = AdminAuth::new(AdminAuthConfig {
        password: ADMIN_PASSWORD.into(),
        session_secret: "test-secret".into(),
        session_ttl_secs: 600,
    })?;
    let contact = ContactService::new(
        FixedWindowLimiter::new(CONTACT_LIMIT, Duration::from_secs(60)),
        Arc::new(LogMailer),
        ContactSettings { company_email: "office@example.com".into(), from_email: "noreply@example.com".into() },
    );
    Ok(AppState { catalog, auth: Arc::new(auth), contact: Arc::new(contact), secure_cookie: false })
}

pub fn seeded_app() -> anyhow::Result<Router> {
    Ok(server::startup::build_app(state_with(MemoryStore::seeded(), DeletePolicy::Hard)?))
}

pub fn json_request(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    Ok(builder.body(Body::from(serde_json::to_vec(body)?))?)
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    Ok(builder.body(Body::empty())?)
}

pub async fn body_json(resp: Response<Body>) -> anyhow::Result<Value> {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// `name=value` pair from the first `Set-Cookie` header.
pub fn session_pair(resp: &Response<Body>) -> Option<String> {
    let raw = resp.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(str::to_string)
}
