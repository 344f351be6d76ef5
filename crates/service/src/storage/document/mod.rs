//! Remote document-store backend.
//!
//! Each service is one document with an opaque store-assigned id. The backend
//! is written against [`DocumentClient`]; [`firestore::FirestoreClient`] speaks
//! the Firestore REST API and [`mock::MockDocumentClient`] keeps documents in
//! memory for tests.
//!
//! Slug uniqueness is check-then-create. Two concurrent creates of the same
//! slug from different processes can both succeed.

use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use configs::DeletePolicy;
use models::{NewService, Service, ServicePatch};

use super::{Fetched, ServiceBackend, StoreError, StoreResult};

pub mod codec;
pub mod firestore;
pub mod mapping;
pub mod mock;

pub use firestore::FirestoreClient;
pub use mock::MockDocumentClient;

/// Typed field value, mirroring what the remote store can represent.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<DocValue>),
    Map(DocFields),
}

pub type DocFields = BTreeMap<String, DocValue>;

/// A stored document as returned by the remote store.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub id: String,
    pub fields: DocFields,
    pub create_time: Option<DateTime<Utc>>,
}

/// Minimal document API the backend needs from a remote store.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Every document in the collection.
    async fn list(&self) -> anyhow::Result<Vec<RemoteDocument>>;

    /// First document whose string field `field` equals `value`.
    async fn find_by_field(&self, field: &str, value: &str) -> anyhow::Result<Option<RemoteDocument>>;

    /// Insert a document under a store-assigned id.
    async fn create(&self, fields: DocFields) -> anyhow::Result<RemoteDocument>;

    /// Overwrite the fields named in `mask`. A masked field absent from
    /// `fields` is removed from the document.
    async fn patch(&self, id: &str, fields: DocFields, mask: &[String]) -> anyhow::Result<RemoteDocument>;

    async fn delete(&self, id: &str) -> anyhow::Result<()>;
}

/// [`ServiceBackend`] over a [`DocumentClient`].
pub struct DocumentBackend<C> {
    client: C,
    policy: DeletePolicy,
}

impl<C: DocumentClient> DocumentBackend<C> {
    pub fn new(client: C, policy: DeletePolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &C { &self.client }

    async fn find(&self, slug: &str) -> StoreResult<Option<RemoteDocument>> {
        Ok(self
            .client
            .find_by_field("slug", slug)
            .await
            .with_context(|| format!("looking up `{slug}`"))?)
    }

    async fn require(&self, slug: &str) -> StoreResult<(RemoteDocument, Service)> {
        let doc = self.find(slug).await?.ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        let service = mapping::service_from_document(&doc)?;
        Ok((doc, service))
    }

    async fn write_patch(&self, id: &str, fields: DocFields, mask: Vec<String>) -> StoreResult<Service> {
        let doc = self
            .client
            .patch(id, fields, &mask)
            .await
            .with_context(|| format!("patching document {id}"))?;
        Ok(mapping::service_from_document(&doc)?)
    }
}

#[async_trait]
impl<C: DocumentClient> ServiceBackend for DocumentBackend<C> {
    async fn list_all(&self) -> StoreResult<Fetched<Vec<Service>>> {
        let mut docs = self.client.list().await.context("listing documents")?;
        // Stable order across calls: creation time, then id.
        docs.sort_by(|a, b| a.create_time.cmp(&b.create_time).then_with(|| a.id.cmp(&b.id)));
        let mut services = Vec::with_capacity(docs.len());
        for doc in &docs {
            match mapping::service_from_document(doc) {
                Ok(svc) => services.push(svc),
                Err(e) => warn!(id = %doc.id, error = %e, "skipping undecodable document"),
            }
        }
        Ok(Fetched::primary(services))
    }

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Fetched<Option<Service>>> {
        let found = match self.find(slug).await? {
            Some(doc) => Some(mapping::service_from_document(&doc)?),
            None => None,
        };
        Ok(Fetched::primary(found))
    }

    async fn create(&self, new: NewService) -> StoreResult<Service> {
        if self.find(&new.slug).await?.is_some() {
            return Err(StoreError::Conflict(new.slug));
        }
        let fields = mapping::fields_for_new(&new, Utc::now());
        let doc = self.client.create(fields).await.context("creating document")?;
        debug!(id = %doc.id, slug = %new.slug, "document created");
        Ok(mapping::service_from_document(&doc)?)
    }

    async fn update(&self, slug: &str, patch: &ServicePatch) -> StoreResult<Service> {
        let (doc, current) = self.require(slug).await?;
        let now = current.last_updated.max(Utc::now());
        let (fields, mask) = mapping::fields_for_patch(patch, now);
        self.write_patch(&doc.id, fields, mask).await
    }

    async fn rename(&self, slug: &str, new_slug: &str) -> StoreResult<Service> {
        let (doc, current) = self.require(slug).await?;
        if slug != new_slug && self.find(new_slug).await?.is_some() {
            return Err(StoreError::Conflict(new_slug.to_string()));
        }
        let now = current.last_updated.max(Utc::now());
        let mut fields = DocFields::new();
        fields.insert("slug".into(), DocValue::String(new_slug.to_string()));
        fields.insert(mapping::LAST_UPDATED.into(), DocValue::Timestamp(now));
        self.write_patch(&doc.id, fields, vec!["slug".into(), mapping::LAST_UPDATED.into()]).await
    }

    async fn delete(&self, slug: &str) -> StoreResult<()> {
        let (doc, current) = self.require(slug).await?;
        match self.policy {
            DeletePolicy::Hard => {
                self.client
                    .delete(&doc.id)
                    .await
                    .with_context(|| format!("deleting document {}", doc.id))?;
            }
            DeletePolicy::Soft => {
                let now = current.last_updated.max(Utc::now());
                let (fields, mask) = mapping::fields_for_patch(&ServicePatch::active(false), now);
                self.write_patch(&doc.id, fields, mask).await?;
            }
        }
        debug!(id = %doc.id, slug, policy = ?self.policy, "document deleted");
        Ok(())
    }

    fn delete_policy(&self) -> DeletePolicy { self.policy }

    fn backend_name(&self) -> &'static str { "firestore" }

    fn is_durable(&self) -> bool { true }
}
