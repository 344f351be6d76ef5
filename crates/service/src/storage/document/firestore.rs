use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::debug;

use configs::FirestoreConfig;

use super::codec::{decode_document, decode_page, encode_fields};
use super::{DocFields, DocumentClient, RemoteDocument};

const PAGE_SIZE: u32 = 300;

/// Firestore REST (v1) client for a single collection.
pub struct FirestoreClient {
    http: reqwest::Client,
    documents_url: String,
    collection: String,
    api_key: Option<String>,
}

impl FirestoreClient {
    pub fn new(cfg: &FirestoreConfig) -> Result<Self> {
        if cfg.project_id.trim().is_empty() {
            bail!("firestore.project_id is required for the firestore backend");
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            documents_url: format!(
                "{}/projects/{}/databases/{}/documents",
                cfg.base_url.trim_end_matches('/'),
                cfg.project_id,
                cfg.database
            ),
            collection: cfg.collection.clone(),
            api_key: Some(cfg.api_key.clone()).filter(|k| !k.trim().is_empty()),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, self.collection)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, self.collection, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.http.request(method, url);
        match &self.api_key {
            Some(key) => req.query(&[("key", key.as_str())]),
            None => req,
        }
    }

    async fn send(req: RequestBuilder, what: &str) -> Result<Response> {
        let resp = req.send().await.with_context(|| format!("{what}: request failed"))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        Err(anyhow!("{what}: firestore returned {status}: {snippet}"))
    }
}

#[async_trait]
impl DocumentClient for FirestoreClient {
    async fn list(&self) -> Result<Vec<RemoteDocument>> {
        let url = self.collection_url();
        let mut docs = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut req = self.request(Method::GET, &url).query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }
            let body: Value = Self::send(req, "list documents").await?.json().await?;
            if let Some(items) = body.get("documents").and_then(Value::as_array) {
                docs.extend(decode_page(items));
            }
            page_token = body
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(String::from);
            if page_token.is_none() {
                break;
            }
        }
        debug!(count = docs.len(), collection = %self.collection, "listed documents");
        Ok(docs)
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Option<RemoteDocument>> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": { "stringValue": value }
                    }
                },
                "limit": 1
            }
        });
        let url = format!("{}:runQuery", self.documents_url);
        let rows: Value = Self::send(self.request(Method::POST, &url).json(&query), "run query")
            .await?
            .json()
            .await?;
        // One row per result; rows without `document` only carry read metadata.
        let first = rows
            .as_array()
            .into_iter()
            .flatten()
            .find_map(|row| row.get("document"));
        first.map(decode_document).transpose()
    }

    async fn create(&self, fields: DocFields) -> Result<RemoteDocument> {
        let body = json!({ "fields": encode_fields(&fields) });
        let created: Value = Self::send(self.request(Method::POST, &self.collection_url()).json(&body), "create document")
            .await?
            .json()
            .await?;
        decode_document(&created)
    }

    async fn patch(&self, id: &str, fields: DocFields, mask: &[String]) -> Result<RemoteDocument> {
        let body = json!({ "fields": encode_fields(&fields) });
        let mut params: Vec<(&str, &str)> = mask.iter().map(|f| ("updateMask.fieldPaths", f.as_str())).collect();
        params.push(("currentDocument.exists", "true"));
        let req = self.request(Method::PATCH, &self.document_url(id)).query(&params).json(&body);
        let updated: Value = Self::send(req, "patch document").await?.json().await?;
        decode_document(&updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        Self::send(self.request(Method::DELETE, &self.document_url(id)), "delete document").await?;
        Ok(())
    }
}
