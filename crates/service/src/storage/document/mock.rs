use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{DocFields, DocValue, DocumentClient, RemoteDocument};

/// In-memory [`DocumentClient`] with Firestore's patch-mask semantics.
///
/// Used by tests and local runs without credentials. `set_unavailable`
/// makes every call fail as if the remote store were unreachable.
#[derive(Default)]
pub struct MockDocumentClient {
    docs: Mutex<Vec<RemoteDocument>>,
    next_id: AtomicU64,
    unavailable: AtomicBool,
}

impl MockDocumentClient {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("document store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentClient for MockDocumentClient {
    async fn list(&self) -> Result<Vec<RemoteDocument>> {
        self.check()?;
        Ok(self.docs.lock().await.clone())
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Option<RemoteDocument>> {
        self.check()?;
        let docs = self.docs.lock().await;
        Ok(docs
            .iter()
            .find(|d| matches!(d.fields.get(field), Some(DocValue::String(s)) if s == value))
            .cloned())
    }

    async fn create(&self, fields: DocFields) -> Result<RemoteDocument> {
        self.check()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let doc = RemoteDocument { id: format!("mock-{n:06}"), fields, create_time: Some(Utc::now()) };
        self.docs.lock().await.push(doc.clone());
        Ok(doc)
    }

    async fn patch(&self, id: &str, mut fields: DocFields, mask: &[String]) -> Result<RemoteDocument> {
        self.check()?;
        let mut docs = self.docs.lock().await;
        let doc = docs.iter_mut().find(|d| d.id == id).ok_or_else(|| anyhow!("document {id} not found"))?;
        for path in mask {
            match fields.remove(path) {
                Some(value) => { doc.fields.insert(path.clone(), value); }
                None => { doc.fields.remove(path); }
            }
        }
        Ok(doc.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check()?;
        let mut docs = self.docs.lock().await;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            bail!("document {id} not found");
        }
        Ok(())
    }
}
