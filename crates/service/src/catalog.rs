//! Catalog façade: the single entry point for public and admin callers.
//!
//! Payloads are validated here before any backend call. Backend `Conflict`
//! and `NotFound` pass through; anything else becomes `StorageUnavailable`.
//! Public reads may be answered from the seed when the backend fails; such
//! answers are tagged [`Source::Fallback`] and counted.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use common::metrics;
use models::{seed, validation, FieldErrors, Service};

use crate::errors::{CatalogError, CatalogResult};
use crate::query;
use crate::storage::{Fetched, ServiceBackend, Source, StoreError};

/// Outcome of a batch import.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub created: Vec<String>,
    /// Slugs that already existed and were left untouched.
    pub skipped: Vec<String>,
    /// Payload label (slug or `#index`) with its validation errors.
    pub invalid: Vec<(String, FieldErrors)>,
}

#[derive(Clone)]
pub struct CatalogService {
    backend: Arc<dyn ServiceBackend>,
    read_fallback: bool,
}

impl CatalogService {
    pub fn new(backend: Arc<dyn ServiceBackend>) -> Self {
        Self { backend, read_fallback: true }
    }

    /// Whether public reads may be served from the seed when the backend fails.
    pub fn with_read_fallback(mut self, enabled: bool) -> Self {
        self.read_fallback = enabled;
        self
    }

    pub fn backend_name(&self) -> &'static str { self.backend.backend_name() }

    pub fn is_durable(&self) -> bool { self.backend.is_durable() }

    fn storage_error(&self, op: &'static str, err: StoreError) -> CatalogError {
        let mapped = match err {
            StoreError::NotFound(slug) => CatalogError::NotFound(slug),
            StoreError::Conflict(slug) => CatalogError::Conflict(slug),
            StoreError::Unexpected(e) => {
                error!(op, backend = self.backend_name(), error = %format!("{e:#}"), "storage failure");
                CatalogError::StorageUnavailable(e.to_string())
            }
        };
        metrics::record_operation(op, mapped.kind());
        mapped
    }

    fn observe<T>(&self, fetched: Fetched<T>) -> Fetched<T> {
        if fetched.source == Source::Fallback {
            metrics::record_fallback(self.backend_name());
        }
        fetched
    }

    /// Seed data for a failed public read, if allowed.
    fn fallback_or(&self, op: &'static str, err: StoreError) -> CatalogResult<Fetched<Vec<Service>>> {
        if self.read_fallback && matches!(err, StoreError::Unexpected(_)) {
            warn!(op, backend = self.backend_name(), error = %err, "backend read failed; serving seed");
            metrics::record_fallback(self.backend_name());
            return Ok(Fetched::fallback(seed::default_services()));
        }
        Err(self.storage_error(op, err))
    }

    async fn public_collection(&self, op: &'static str) -> CatalogResult<Fetched<Vec<Service>>> {
        match self.backend.list_all().await {
            Ok(all) => Ok(self.observe(all)),
            Err(e) => self.fallback_or(op, e),
        }
    }

    /// Every record, including inactive ones, in storage order.
    pub async fn list_all(&self) -> CatalogResult<Fetched<Vec<Service>>> {
        let all = self.backend.list_all().await.map_err(|e| self.storage_error("list_all", e))?;
        Ok(self.observe(all))
    }

    /// Active records sorted by `order`, ties in storage order.
    pub async fn list_active(&self) -> CatalogResult<Fetched<Vec<Service>>> {
        let all = self.public_collection("list_active").await?;
        Ok(all.map(|services| query::public_listing(&services)))
    }

    /// The record, only if it exists and is active.
    pub async fn get_public(&self, slug: &str) -> CatalogResult<Fetched<Option<Service>>> {
        let found = match self.backend.get_by_slug(slug).await {
            Ok(found) => self.observe(found),
            Err(e) => self
                .fallback_or("get_public", e)?
                .map(|services| services.into_iter().find(|s| s.slug == slug)),
        };
        Ok(found.map(|svc| svc.filter(|s| s.active)))
    }

    /// The record regardless of `active`.
    pub async fn get_for_admin(&self, slug: &str) -> CatalogResult<Service> {
        let found = self
            .backend
            .get_by_slug(slug)
            .await
            .map_err(|e| self.storage_error("get_for_admin", e))?;
        self.observe(found)
            .value
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))
    }

    /// Active records matching `term`, in display order.
    pub async fn search(&self, term: &str) -> CatalogResult<Fetched<Vec<Service>>> {
        let all = self.public_collection("search").await?;
        Ok(all.map(|services| query::search(&services, term)))
    }

    #[instrument(skip(self, payload), fields(backend = self.backend_name()))]
    pub async fn create(&self, payload: &Value) -> CatalogResult<Service> {
        let new = validation::validate_create(payload).inspect_err(|errs| {
            metrics::record_operation("create", "validation_failed");
            info!(fields = errs.len(), "create rejected by validation");
        })?;
        let created = self.backend.create(new).await.map_err(|e| self.storage_error("create", e))?;
        metrics::record_operation("create", "ok");
        info!(slug = %created.slug, "service created");
        Ok(created)
    }

    #[instrument(skip(self, patch), fields(backend = self.backend_name()))]
    pub async fn update(&self, slug: &str, patch: &Value) -> CatalogResult<Service> {
        let patch = validation::validate_patch(patch).inspect_err(|errs| {
            metrics::record_operation("update", "validation_failed");
            info!(fields = errs.len(), "update rejected by validation");
        })?;
        let updated = self
            .backend
            .update(slug, &patch)
            .await
            .map_err(|e| self.storage_error("update", e))?;
        metrics::record_operation("update", "ok");
        info!(fields = ?patch.field_names(), "service updated");
        Ok(updated)
    }

    /// Change a record's slug. The only way a slug ever changes.
    #[instrument(skip(self), fields(backend = self.backend_name()))]
    pub async fn rename(&self, slug: &str, new_slug: &str) -> CatalogResult<Service> {
        if let Err(msg) = validation::validate_slug(new_slug) {
            metrics::record_operation("rename", "validation_failed");
            return Err(FieldErrors::single("slug", msg).into());
        }
        let renamed = self
            .backend
            .rename(slug, new_slug)
            .await
            .map_err(|e| self.storage_error("rename", e))?;
        metrics::record_operation("rename", "ok");
        info!("service renamed");
        Ok(renamed)
    }

    #[instrument(skip(self), fields(backend = self.backend_name(), policy = ?self.backend.delete_policy()))]
    pub async fn remove(&self, slug: &str) -> CatalogResult<()> {
        self.backend.delete(slug).await.map_err(|e| self.storage_error("remove", e))?;
        metrics::record_operation("remove", "ok");
        info!("service removed");
        Ok(())
    }

    /// Create every valid payload whose slug is not taken yet.
    ///
    /// Invalid payloads and existing slugs are reported, not fatal. A storage
    /// failure aborts the batch; records created before it remain.
    pub async fn import(&self, payloads: &[Value]) -> CatalogResult<ImportReport> {
        let mut report = ImportReport::default();
        for (i, payload) in payloads.iter().enumerate() {
            match self.create(payload).await {
                Ok(svc) => report.created.push(svc.slug),
                Err(CatalogError::Conflict(slug)) => report.skipped.push(slug),
                Err(CatalogError::ValidationFailed(errs)) => {
                    let label = payload
                        .get("slug")
                        .and_then(Value::as_str)
                        .map(String::from)
                        .unwrap_or_else(|| format!("#{i}"));
                    report.invalid.push((label, errs));
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            invalid = report.invalid.len(),
            "import finished"
        );
        Ok(report)
    }
}
