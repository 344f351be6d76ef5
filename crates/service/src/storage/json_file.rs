use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use models::{seed, Service};

use super::{CollectionStore, Fetched, StoreError, StoreResult};

enum Snapshot {
    Loaded(Vec<Service>),
    Missing,
    Unreadable(anyhow::Error),
}

/// Catalog persisted as a pretty-printed JSON array in one file.
///
/// A missing file is initialized with the seed on first access. A file that
/// cannot be read or parsed is never overwritten: reads fall back to the seed
/// and mutations fail until it is repaired.
///
/// Every write to the file, including seeding, happens under `io_lock`.
pub struct JsonFileStore {
    file_path: PathBuf,
    io_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), io_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.file_path }

    async fn read(&self) -> Snapshot {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Snapshot::Missing,
            Err(e) => return Snapshot::Unreadable(anyhow!(e).context(format!("reading {}", self.file_path.display()))),
        };
        match serde_json::from_slice::<Vec<Service>>(&bytes) {
            Ok(services) => Snapshot::Loaded(services),
            Err(e) => Snapshot::Unreadable(anyhow!(e).context(format!("parsing {}", self.file_path.display()))),
        }
    }

    /// Caller must hold `io_lock`.
    async fn write_locked(&self, services: &[Service]) -> anyhow::Result<()> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut data = serde_json::to_vec_pretty(services)?;
        data.push(b'\n');
        // Write beside the target and rename so a crash never leaves a torn file.
        let tmp = self.file_path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        let written = async {
            fs::write(&tmp, data).await.with_context(|| format!("writing {}", tmp.display()))?;
            fs::rename(&tmp, &self.file_path)
                .await
                .with_context(|| format!("replacing {}", self.file_path.display()))
        }
        .await;
        if written.is_err() {
            let _ = fs::remove_file(&tmp).await;
        }
        written
    }

    async fn write(&self, services: &[Service]) -> anyhow::Result<()> {
        let _guard = self.io_lock.lock().await;
        self.write_locked(services).await
    }

    /// Seed the file unless another task created it since `read` saw it missing.
    async fn initialize(&self) -> anyhow::Result<Vec<Service>> {
        let _guard = self.io_lock.lock().await;
        match self.read().await {
            Snapshot::Loaded(services) => return Ok(services),
            Snapshot::Unreadable(e) => return Err(e),
            Snapshot::Missing => {}
        }
        let services = seed::default_services();
        self.write_locked(&services).await?;
        info!(path = %self.file_path.display(), count = services.len(), "initialized catalog file from seed");
        Ok(services)
    }
}

#[async_trait]
impl CollectionStore for JsonFileStore {
    async fn load(&self) -> StoreResult<Fetched<Vec<Service>>> {
        match self.read().await {
            Snapshot::Loaded(services) => Ok(Fetched::primary(services)),
            Snapshot::Missing => match self.initialize().await {
                Ok(services) => Ok(Fetched::primary(services)),
                Err(e) => {
                    warn!(error = %e, "cannot initialize catalog file; serving seed");
                    Ok(Fetched::fallback(seed::default_services()))
                }
            },
            Snapshot::Unreadable(e) => {
                warn!(error = %format!("{e:#}"), "catalog file unreadable; serving seed");
                Ok(Fetched::fallback(seed::default_services()))
            }
        }
    }

    async fn load_for_write(&self) -> StoreResult<Vec<Service>> {
        match self.read().await {
            Snapshot::Loaded(services) => Ok(services),
            Snapshot::Missing => Ok(self.initialize().await?),
            Snapshot::Unreadable(e) => Err(StoreError::Unexpected(
                e.context("refusing to overwrite unreadable catalog file"),
            )),
        }
    }

    async fn save(&self, services: &[Service]) -> StoreResult<()> {
        self.write(services).await?;
        Ok(())
    }

    fn name(&self) -> &'static str { "file" }

    fn is_durable(&self) -> bool { true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{exercise_backend, new_service};
    use crate::storage::{CollectionBackend, ServiceBackend, Source};
    use configs::DeletePolicy;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("catalog_{}", uuid::Uuid::new_v4())).join("services.json")
    }

    async fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn missing_file_is_initialized_with_seed() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonFileStore::new(&path);
        let loaded = store.load().await?;
        assert_eq!(loaded.source, Source::Primary);
        assert_eq!(loaded.value, seed::default_services());

        let on_disk: Vec<Service> = serde_json::from_slice(&fs::read(&path).await?)?;
        assert_eq!(on_disk, seed::default_services());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn shared_semantics_against_a_file() -> anyhow::Result<()> {
        let path = tmp_path();
        let backend = CollectionBackend::new(JsonFileStore::new(&path), DeletePolicy::Hard);
        exercise_backend(&backend).await?;
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn writes_survive_a_new_store_instance() -> anyhow::Result<()> {
        let path = tmp_path();
        let backend = CollectionBackend::new(JsonFileStore::new(&path), DeletePolicy::Hard);
        backend.create(new_service("decking", 7)).await?;

        let reopened = CollectionBackend::new(JsonFileStore::new(&path), DeletePolicy::Hard);
        let found = reopened.get_by_slug("decking").await?.value;
        assert_eq!(found.map(|s| s.order), Some(7));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_for_reads_and_blocks_writes() -> anyhow::Result<()> {
        let path = tmp_path();
        fs::create_dir_all(path.parent().expect("parent")).await?;
        fs::write(&path, b"[{ truncated").await?;

        let backend = CollectionBackend::new(JsonFileStore::new(&path), DeletePolicy::Hard);
        let listed = backend.list_all().await?;
        assert!(listed.is_fallback());
        assert_eq!(listed.value, seed::default_services());

        let err = backend.create(new_service("x", 1)).await.expect_err("must not overwrite");
        assert!(matches!(err, StoreError::Unexpected(_)));
        assert_eq!(fs::read(&path).await?, b"[{ truncated");
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_is_pretty_printed_camel_case() -> anyhow::Result<()> {
        let path = tmp_path();
        let backend = CollectionBackend::new(JsonFileStore::new(&path), DeletePolicy::Hard);
        backend.list_all().await?;
        let text = fs::read_to_string(&path).await?;
        assert!(text.starts_with("[\n"));
        assert!(text.contains("\"shortDescription\""));
        assert!(text.contains("\"lastUpdated\""));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn first_read_racing_first_create_keeps_the_record() -> anyhow::Result<()> {
        for _ in 0..50 {
            let path = tmp_path();
            let backend = std::sync::Arc::new(CollectionBackend::new(JsonFileStore::new(&path), DeletePolicy::Hard));
            let writer = {
                let b = backend.clone();
                tokio::spawn(async move { b.create(new_service("gutters", 9)).await })
            };
            let reader = {
                let b = backend.clone();
                tokio::spawn(async move { b.list_all().await })
            };
            writer.await??;
            reader.await??;

            let reopened = CollectionBackend::new(JsonFileStore::new(&path), DeletePolicy::Hard);
            assert!(reopened.get_by_slug("gutters").await?.value.is_some());

            let mut leftovers = fs::read_dir(path.parent().expect("parent")).await?;
            while let Some(entry) = leftovers.next_entry().await? {
                assert!(!entry.file_name().to_string_lossy().ends_with(".tmp"));
            }
            cleanup(&path).await;
        }
        Ok(())
    }
}
