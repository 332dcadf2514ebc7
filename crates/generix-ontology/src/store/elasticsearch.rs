//! Elasticsearch REST adapter
//!
//! Only the handful of endpoints the ontology layer needs are wrapped:
//! index delete/create, single and bulk document writes, refresh and
//! `_search`. Responses are decoded into the minimal serde structs below.

use crate::config::StoreConfig;
use crate::store::{FieldKind, IndexSchema, SearchHit, SearchQuery, SearchStore};
use crate::{OntologyError, Result};
use async_trait::async_trait;
use generix_common::GenerixError;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Client Constants
// ============================================================================

/// Cluster address used when ELASTICSEARCH_URL is not set
pub const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";
const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_index")]
    index: String,
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

// ============================================================================
// Store
// ============================================================================

/// [`SearchStore`] backed by an Elasticsearch cluster
#[derive(Debug, Clone)]
pub struct ElasticsearchStore {
    client: Client,
    base_url: Url,
}

impl ElasticsearchStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            GenerixError::config(format!("Invalid Elasticsearch URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(
                GenerixError::config(format!("Elasticsearch URL '{}' cannot be a base", base_url))
                    .into(),
            );
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn store_error(response: Response) -> OntologyError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        OntologyError::Store { status, message }
    }

    fn mappings(schema: &IndexSchema) -> Value {
        let properties: Map<String, Value> = schema
            .fields()
            .iter()
            .map(|field| {
                let mapping = match field.kind {
                    FieldKind::Keyword => json!({ "type": "keyword" }),
                    FieldKind::Text => json!({ "type": "text", "analyzer": "standard" }),
                };
                (field.name.clone(), mapping)
            })
            .collect();

        json!({ "mappings": { "properties": properties } })
    }

    fn bulk_body(index: &str, documents: &[(String, Value)]) -> Result<String> {
        let mut body = String::new();
        for (id, document) in documents {
            let action = json!({ "index": { "_index": index, "_id": id } });
            body.push_str(&serde_json::to_string(&action)?);
            body.push('\n');
            body.push_str(&serde_json::to_string(document)?);
            body.push('\n');
        }
        Ok(body)
    }
}

#[async_trait]
impl SearchStore for ElasticsearchStore {
    fn backend(&self) -> &'static str {
        "elasticsearch"
    }

    async fn delete_index(&self, index: &str) -> Result<bool> {
        let response = self.client.delete(self.url(&[index])).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(Self::store_error(response).await),
        }
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()> {
        let response = self
            .client
            .put(self.url(&[index]))
            .json(&Self::mappings(schema))
            .send()
            .await?;

        if response.status().is_success() {
            debug!(index, "Created Elasticsearch index");
            return Ok(());
        }

        match Self::store_error(response).await {
            OntologyError::Store { message, .. } if message.contains(ALREADY_EXISTS_ERROR) => {
                Err(OntologyError::IndexAlreadyExists(index.to_string()))
            },
            other => Err(other),
        }
    }

    async fn index_document(&self, index: &str, id: &str, document: &Value) -> Result<()> {
        let response = self
            .client
            .put(self.url(&[index, "_doc", id]))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }
        Ok(())
    }

    async fn index_documents(&self, index: &str, documents: &[(String, Value)]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let response = self
            .client
            .post(self.url(&["_bulk"]))
            .header(reqwest::header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .body(Self::bulk_body(index, documents)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }

        let bulk: BulkResponse = response.json().await?;
        if bulk.errors {
            let failed = bulk
                .items
                .into_iter()
                .flat_map(HashMap::into_values)
                .find(|item| item.error.is_some());

            let (status, message) = match failed {
                Some(item) => (
                    item.status,
                    format!(
                        "Bulk write to '{}' failed for document '{}': {}",
                        index,
                        item.id.unwrap_or_default(),
                        item.error.unwrap_or_default()
                    ),
                ),
                None => (500, format!("Bulk write to '{}' reported errors", index)),
            };
            warn!(index, status, "Bulk write rejected");
            return Err(OntologyError::Store { status, message });
        }

        Ok(documents.len())
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        let response = self.client.post(self.url(&[index, "_refresh"])).send().await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        query: &SearchQuery,
        size: usize,
    ) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(self.url(&[index, "_search"]))
            .json(&json!({ "query": query.to_dsl(), "size": size }))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(index, "Search against missing index");
                return Ok(Vec::new());
            },
            status if !status.is_success() => return Err(Self::store_error(response).await),
            _ => {},
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .hits
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                index: hit.index,
                id: hit.id,
                source: hit.source,
            })
            .collect())
    }
}
