use std::{net::SocketAddr, sync::Arc, time::{Duration, Instant}};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use service::auth::{AdminAuth, AdminAuthConfig};
use service::contact::{ContactService, LogMailer};
use service::runtime;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// How often elapsed rate-limit windows are dropped.
const LIMITER_PURGE_EVERY: Duration = Duration::from_secs(5 * 60);

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Assemble handler state from a validated configuration.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let catalog = runtime::build_catalog(cfg).await?;
    let auth = AdminAuth::new(AdminAuthConfig::from(&cfg.admin))
        .map_err(|e| StartupError::InvalidConfig(format!("admin.password: {e}")))?;
    common::env::warn_on_dev_defaults(&cfg.admin.session_secret, auth.is_enabled());
    let contact = ContactService::from_config(&cfg.contact, Arc::new(LogMailer));
    Ok(AppState {
        catalog,
        auth: Arc::new(auth),
        contact: Arc::new(contact),
        secure_cookie: cfg.admin.secure_cookie,
    })
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

fn spawn_limiter_purge(state: &AppState) {
    let contact = Arc::clone(&state.contact);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(LIMITER_PURGE_EVERY);
        loop {
            ticker.tick().await;
            let removed = contact.limiter().purge_expired(Instant::now());
            if removed > 0 {
                debug!(removed, "purged expired contact rate-limit windows");
            }
        }
    });
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> Result<(), StartupError> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let state = build_state(&cfg).await?;
    spawn_limiter_purge(&state);
    let app = build_app(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting catalog server");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}
