//! HTTP/JSON client for the hosted document store.
//!
//! Documents travel as flat JSON objects carrying their id alongside the
//! fields. Partial updates are a `PATCH` with a dotted-path map, the wire
//! analog of the per-field updates the store applies server-side. No
//! timeouts or retries beyond the HTTP client's defaults.

use crate::errors::Result;
use crate::store::{Document, DocumentStore, FieldPatch};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// REST-backed [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    id: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    id: String,
}

impl RestStore {
    /// Creates a client for the store rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.base_url)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl DocumentStore for RestStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        let url = self.collection_url(collection);
        debug!(%url, "fetching collection");
        let wire: Vec<WireDocument> = self
            .authorize(self.client.get(&url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(wire
            .into_iter()
            .map(|doc| Document::new(doc.id, doc.fields))
            .collect())
    }

    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        let url = self.collection_url(collection);
        debug!(%url, "creating document");
        let created: CreatedDocument = self
            .authorize(self.client.post(&url))
            .json(&Value::Object(fields))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(created.id)
    }

    async fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<()> {
        let url = self.document_url(collection, id);
        debug!(%url, "writing document");
        self.authorize(self.client.put(&url))
            .json(&Value::Object(fields))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn update_fields(&self, collection: &str, id: &str, patch: FieldPatch) -> Result<()> {
        let url = self.document_url(collection, id);
        let body: Map<String, Value> = patch.into_iter().collect();
        debug!(%url, paths = body.len(), "patching document");
        self.authorize(self.client.patch(&url))
            .json(&Value::Object(body))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.document_url(collection, id);
        debug!(%url, "deleting document");
        self.authorize(self.client.delete(&url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
