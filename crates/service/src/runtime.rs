//! Runtime wiring: turn an [`AppConfig`] into a ready catalog.
//!
//! The backend is constructed once at process start and injected into the
//! façade; nothing here is global.

use std::sync::Arc;

use tracing::{info, warn};

use configs::{AppConfig, BackendKind};

use crate::catalog::CatalogService;
use crate::storage::{
    CollectionBackend, DocumentBackend, JsonFileStore, MemoryStore, ServiceBackend,
};
use crate::storage::document::FirestoreClient;

/// Whether the host discards local file writes between invocations.
pub fn on_serverless() -> bool {
    ["VERCEL", "AWS_LAMBDA_FUNCTION_NAME", "NETLIFY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Construct the backend selected by configuration.
pub async fn build_backend(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ServiceBackend>> {
    let kind = cfg.resolve_backend(on_serverless());
    let policy = cfg.storage.delete_policy;
    let backend: Arc<dyn ServiceBackend> = match kind {
        BackendKind::File | BackendKind::Auto => {
            common::env::ensure_data_dir(&cfg.storage.data_file).await?;
            Arc::new(CollectionBackend::new(JsonFileStore::new(&cfg.storage.data_file), policy))
        }
        BackendKind::Memory => {
            let snapshot = std::env::var(&cfg.storage.snapshot_env).ok();
            warn!("memory backend selected; catalog writes last only for this process");
            Arc::new(CollectionBackend::new(MemoryStore::from_snapshot(snapshot.as_deref()), policy))
        }
        BackendKind::Firestore => {
            let client = FirestoreClient::new(&cfg.firestore)?;
            Arc::new(DocumentBackend::new(client, policy))
        }
    };
    info!(
        backend = backend.backend_name(),
        durable = backend.is_durable(),
        delete_policy = ?policy,
        "catalog backend ready"
    );
    Ok(backend)
}

pub async fn build_catalog(cfg: &AppConfig) -> anyhow::Result<CatalogService> {
    let backend = build_backend(cfg).await?;
    Ok(CatalogService::new(backend).with_read_fallback(cfg.storage.read_fallback))
}
