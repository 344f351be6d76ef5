//! Catalog storage backends.
//!
//! Every backend implements [`ServiceBackend`] with identical semantics:
//! unique slugs, `Conflict` on duplicate create, `NotFound` on a missing slug,
//! and monotonic `lastUpdated` on mutation. File and memory backends share the
//! whole-collection read-modify-write logic in [`collection::CollectionBackend`];
//! the document backend talks to a remote store one record at a time.

use async_trait::async_trait;
use thiserror::Error;

use configs::DeletePolicy;
use models::{NewService, Service, ServicePatch};

pub mod collection;
pub mod document;
pub mod json_file;
pub mod memory;

pub use collection::{CollectionBackend, CollectionStore};
pub use document::DocumentBackend;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Where a read was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The configured backend.
    Primary,
    /// The built-in seed collection, because the backend's data was unreadable.
    Fallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Primary => "primary",
            Source::Fallback => "fallback",
        }
    }
}

/// A read result tagged with its [`Source`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Fetched<T> {
    pub fn primary(value: T) -> Self { Self { value, source: Source::Primary } }
    pub fn fallback(value: T) -> Self { Self { value, source: Source::Fallback } }

    pub fn is_fallback(&self) -> bool { self.source == Source::Fallback }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched { value: f(self.value), source: self.source }
    }
}

/// Persistence contract for the service catalog.
///
/// Inputs are already validated; backends enforce slug uniqueness and
/// existence, and stamp `lastUpdated`.
#[async_trait]
pub trait ServiceBackend: Send + Sync {
    /// Every stored record, active or not, in storage order.
    async fn list_all(&self) -> StoreResult<Fetched<Vec<Service>>>;

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Fetched<Option<Service>>> {
        let all = self.list_all().await?;
        Ok(all.map(|services| services.into_iter().find(|s| s.slug == slug)))
    }

    async fn create(&self, new: NewService) -> StoreResult<Service>;

    async fn update(&self, slug: &str, patch: &ServicePatch) -> StoreResult<Service>;

    /// Move a record to `new_slug`, keeping everything else.
    async fn rename(&self, slug: &str, new_slug: &str) -> StoreResult<Service>;

    /// Remove (or deactivate, under [`DeletePolicy::Soft`]) the record.
    async fn delete(&self, slug: &str) -> StoreResult<()>;

    fn delete_policy(&self) -> DeletePolicy;

    fn backend_name(&self) -> &'static str;

    /// Whether writes survive a process restart.
    fn is_durable(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Behaviour every backend must share, run against each implementation.

    use super::*;
    use serde_json::json;

    pub fn new_service(slug: &str, order: u32) -> NewService {
        models::validation::validate_create(&json!({
            "slug": slug,
            "name": format!("Service {slug}"),
            "shortDescription": "Short",
            "description": "Long description",
            "order": order,
        }))
        .expect("valid fixture")
    }

    pub async fn exercise_backend(backend: &dyn ServiceBackend) -> anyhow::Result<()> {
        let before = backend.list_all().await?.value.len();

        let created = backend.create(new_service("gutters", 9)).await?;
        assert_eq!(created.slug, "gutters");
        assert!(created.active);

        match backend.create(new_service("gutters", 10)).await {
            Err(StoreError::Conflict(slug)) => assert_eq!(slug, "gutters"),
            other => panic!("expected conflict, got {other:?}"),
        }

        let patch = ServicePatch { name: Some("Gutter Cleaning".into()), ..Default::default() };
        let updated = backend.update("gutters", &patch).await?;
        assert_eq!(updated.name, "Gutter Cleaning");
        assert_eq!(updated.order, 9);
        assert!(updated.last_updated >= created.last_updated);

        let fetched = backend.get_by_slug("gutters").await?.value.expect("present");
        assert_eq!(fetched.name, "Gutter Cleaning");

        assert!(matches!(backend.update("missing", &patch).await, Err(StoreError::NotFound(_))));
        assert!(matches!(backend.delete("missing").await, Err(StoreError::NotFound(_))));

        let renamed = backend.rename("gutters", "gutter-cleaning").await?;
        assert_eq!(renamed.slug, "gutter-cleaning");
        assert!(backend.get_by_slug("gutters").await?.value.is_none());
        assert!(matches!(backend.rename("gutters", "x").await, Err(StoreError::NotFound(_))));

        backend.create(new_service("taken", 11)).await?;
        assert!(matches!(
            backend.rename("gutter-cleaning", "taken").await,
            Err(StoreError::Conflict(_))
        ));

        backend.delete("gutter-cleaning").await?;
        backend.delete("taken").await?;
        match backend.delete_policy() {
            DeletePolicy::Hard => {
                assert!(backend.get_by_slug("gutter-cleaning").await?.value.is_none());
                assert_eq!(backend.list_all().await?.value.len(), before);
            }
            DeletePolicy::Soft => {
                let kept = backend.get_by_slug("gutter-cleaning").await?.value.expect("kept");
                assert!(!kept.active);
            }
        }
        Ok(())
    }
}
