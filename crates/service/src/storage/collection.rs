use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use configs::DeletePolicy;
use models::{NewService, Service, ServicePatch};

use super::{Fetched, ServiceBackend, StoreError, StoreResult};

/// Whole-collection persistence primitive.
///
/// Implementations only know how to read and replace the full list; record
/// semantics live in [`CollectionBackend`].
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Current collection for reads. May answer from the seed when the
    /// underlying data is unreadable, tagged as a fallback.
    async fn load(&self) -> StoreResult<Fetched<Vec<Service>>>;

    /// Current collection as the base of a mutation.
    ///
    /// Defaults to [`load`](Self::load). Stores that must never overwrite
    /// unreadable data with a fallback override this to fail instead.
    async fn load_for_write(&self) -> StoreResult<Vec<Service>> {
        Ok(self.load().await?.value)
    }

    /// Replace the stored collection.
    async fn save(&self, services: &[Service]) -> StoreResult<()>;

    fn name(&self) -> &'static str;

    fn is_durable(&self) -> bool;
}

/// [`ServiceBackend`] over any [`CollectionStore`] via read-modify-write.
///
/// Writers inside this process are serialized; separate processes sharing
/// the same store still race with last-writer-wins.
pub struct CollectionBackend<S> {
    store: S,
    policy: DeletePolicy,
    write_lock: Mutex<()>,
}

impl<S: CollectionStore> CollectionBackend<S> {
    pub fn new(store: S, policy: DeletePolicy) -> Self {
        Self { store, policy, write_lock: Mutex::new(()) }
    }

    pub fn store(&self) -> &S { &self.store }

    async fn mutate<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send,
        F: FnOnce(&mut Vec<Service>) -> StoreResult<T> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut services = self.store.load_for_write().await?;
        let out = f(&mut services)?;
        self.store.save(&services).await?;
        Ok(out)
    }
}

fn position(services: &[Service], slug: &str) -> StoreResult<usize> {
    services
        .iter()
        .position(|s| s.slug == slug)
        .ok_or_else(|| StoreError::NotFound(slug.to_string()))
}

#[async_trait]
impl<S: CollectionStore> ServiceBackend for CollectionBackend<S> {
    async fn list_all(&self) -> StoreResult<Fetched<Vec<Service>>> {
        self.store.load().await
    }

    async fn create(&self, new: NewService) -> StoreResult<Service> {
        let created = self
            .mutate(move |services| {
                if services.iter().any(|s| s.slug == new.slug) {
                    return Err(StoreError::Conflict(new.slug));
                }
                let service = new.into_service(None, Utc::now());
                services.push(service.clone());
                Ok(service)
            })
            .await?;
        debug!(store = self.store.name(), slug = %created.slug, "service stored");
        Ok(created)
    }

    async fn update(&self, slug: &str, patch: &ServicePatch) -> StoreResult<Service> {
        self.mutate(|services| {
            let idx = position(services, slug)?;
            let target = &mut services[idx];
            patch.apply_to(target);
            target.touch(Utc::now());
            Ok(target.clone())
        })
        .await
    }

    async fn rename(&self, slug: &str, new_slug: &str) -> StoreResult<Service> {
        self.mutate(|services| {
            let idx = position(services, slug)?;
            if slug != new_slug && services.iter().any(|s| s.slug == new_slug) {
                return Err(StoreError::Conflict(new_slug.to_string()));
            }
            let target = &mut services[idx];
            target.slug = new_slug.to_string();
            target.touch(Utc::now());
            Ok(target.clone())
        })
        .await
    }

    async fn delete(&self, slug: &str) -> StoreResult<()> {
        let policy = self.policy;
        self.mutate(|services| {
            let idx = position(services, slug)?;
            match policy {
                DeletePolicy::Hard => {
                    services.remove(idx);
                }
                DeletePolicy::Soft => {
                    let target = &mut services[idx];
                    target.active = false;
                    target.touch(Utc::now());
                }
            }
            Ok(())
        })
        .await?;
        debug!(store = self.store.name(), slug, ?policy, "service deleted");
        Ok(())
    }

    fn delete_policy(&self) -> DeletePolicy { self.policy }

    fn backend_name(&self) -> &'static str { self.store.name() }

    fn is_durable(&self) -> bool { self.store.is_durable() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::testing::{exercise_backend, new_service};

    #[tokio::test]
    async fn hard_delete_semantics() -> anyhow::Result<()> {
        let backend = CollectionBackend::new(MemoryStore::empty(), DeletePolicy::Hard);
        exercise_backend(&backend).await
    }

    #[tokio::test]
    async fn soft_delete_semantics() -> anyhow::Result<()> {
        let backend = CollectionBackend::new(MemoryStore::empty(), DeletePolicy::Soft);
        exercise_backend(&backend).await
    }

    #[tokio::test]
    async fn failed_mutation_leaves_collection_untouched() -> anyhow::Result<()> {
        let backend = CollectionBackend::new(MemoryStore::empty(), DeletePolicy::Hard);
        backend.create(new_service("a", 1)).await?;
        backend.create(new_service("b", 2)).await?;
        assert!(backend.rename("a", "b").await.is_err());

        let slugs: Vec<_> = backend.list_all().await?.value.into_iter().map(|s| s.slug).collect();
        assert_eq!(slugs, vec!["a", "b"]);
        Ok(())
    }

    #[tokio::test]
    async fn rename_to_same_slug_is_a_touch() -> anyhow::Result<()> {
        let backend = CollectionBackend::new(MemoryStore::empty(), DeletePolicy::Hard);
        let created = backend.create(new_service("a", 1)).await?;
        let renamed = backend.rename("a", "a").await?;
        assert_eq!(renamed.slug, "a");
        assert!(renamed.last_updated >= created.last_updated);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_keep_every_record() -> anyhow::Result<()> {
        let backend = std::sync::Arc::new(CollectionBackend::new(MemoryStore::empty(), DeletePolicy::Hard));
        let mut handles = Vec::new();
        for i in 0..16u32 {
            let b = backend.clone();
            handles.push(tokio::spawn(async move { b.create(new_service(&format!("svc-{i}"), i)).await }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(backend.list_all().await?.value.len(), 16);
        Ok(())
    }
}
