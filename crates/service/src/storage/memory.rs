use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use models::{seed, Service};

use super::{CollectionStore, Fetched, Source, StoreResult};

struct State {
    services: Vec<Service>,
    source: Source,
}

/// Process-local collection for hosts with an ephemeral filesystem.
///
/// Bootstrapped once from a JSON snapshot (typically an environment
/// variable) or the seed. Writes last only as long as the process; they are
/// not shared between instances and vanish on restart.
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self::with(Vec::new(), Source::Primary)
    }

    pub fn seeded() -> Self {
        Self::with(seed::default_services(), Source::Primary)
    }

    /// Bootstrap from a JSON array snapshot.
    ///
    /// No snapshot means the seed. An unparseable snapshot also means the
    /// seed, but reads report [`Source::Fallback`] until the first write.
    pub fn from_snapshot(snapshot: Option<&str>) -> Self {
        let Some(raw) = snapshot.map(str::trim).filter(|s| !s.is_empty()) else {
            info!("no catalog snapshot supplied; bootstrapping memory store from seed");
            return Self::seeded();
        };
        match serde_json::from_str::<Vec<Service>>(raw) {
            Ok(services) => {
                info!(count = services.len(), "memory store bootstrapped from snapshot");
                Self::with(services, Source::Primary)
            }
            Err(e) => {
                warn!(error = %e, "catalog snapshot unparseable; serving seed");
                Self::with(seed::default_services(), Source::Fallback)
            }
        }
    }

    fn with(services: Vec<Service>, source: Source) -> Self {
        Self { state: RwLock::new(State { services, source }) }
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn load(&self) -> StoreResult<Fetched<Vec<Service>>> {
        let state = self.state.read().await;
        Ok(Fetched { value: state.services.clone(), source: state.source })
    }

    async fn save(&self, services: &[Service]) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.services = services.to_vec();
        state.source = Source::Primary;
        Ok(())
    }

    fn name(&self) -> &'static str { "memory" }

    fn is_durable(&self) -> bool { false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CollectionBackend, ServiceBackend};
    use crate::storage::testing::new_service;
    use configs::DeletePolicy;

    #[tokio::test]
    async fn missing_snapshot_bootstraps_seed() -> anyhow::Result<()> {
        let store = MemoryStore::from_snapshot(None);
        let loaded = store.load().await?;
        assert_eq!(loaded.source, Source::Primary);
        assert_eq!(loaded.value, seed::default_services());
        Ok(())
    }

    #[tokio::test]
    async fn snapshot_is_used_verbatim() -> anyhow::Result<()> {
        let snapshot = serde_json::json!([{
            "slug": "only", "name": "Only", "shortDescription": "s", "description": "d",
            "order": 4, "active": false, "lastUpdated": "2024-02-01T00:00:00Z"
        }])
        .to_string();
        let loaded = MemoryStore::from_snapshot(Some(&snapshot)).load().await?;
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.value[0].slug, "only");
        assert!(!loaded.value[0].active);
        Ok(())
    }

    #[tokio::test]
    async fn bad_snapshot_is_marked_fallback_until_written() -> anyhow::Result<()> {
        let backend = CollectionBackend::new(MemoryStore::from_snapshot(Some("{not json")), DeletePolicy::Hard);
        let first = backend.list_all().await?;
        assert!(first.is_fallback());
        assert_eq!(first.value.len(), seed::default_services().len());

        backend.create(new_service("fresh", 4)).await?;
        let after = backend.list_all().await?;
        assert_eq!(after.source, Source::Primary);
        assert_eq!(after.value.len(), seed::default_services().len() + 1);
        Ok(())
    }

    #[test]
    fn is_not_durable() {
        assert!(!MemoryStore::empty().is_durable());
    }
}
