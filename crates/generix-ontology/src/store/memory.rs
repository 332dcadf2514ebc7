// In-process inverted index
//
// Postings are kept per field as token -> document ids in BTreeMaps, so a
// prefix query is a range scan starting at the prefix. Results come back in
// (index name, document id) order.

use crate::store::{matches_pattern, IndexSchema, SearchHit, SearchQuery, SearchStore};
use crate::{OntologyError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use tracing::debug;

type Postings = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Default)]
struct MemoryIndex {
    schema: IndexSchema,
    documents: BTreeMap<String, Value>,
    postings: BTreeMap<String, Postings>,
}

impl MemoryIndex {
    fn new(schema: IndexSchema) -> Self {
        MemoryIndex {
            schema,
            ..Default::default()
        }
    }

    /// (field, token) pairs a document contributes to the postings
    fn tokens(&self, document: &Value) -> Vec<(String, String)> {
        let Some(fields) = document.as_object() else {
            return Vec::new();
        };

        let mut tokens = Vec::new();
        for (field, value) in fields {
            let kind = self.schema.kind_of(field);
            let strings: Vec<&str> = match value {
                Value::String(s) => vec![s.as_str()],
                Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            for s in strings {
                for token in kind.analyze(s) {
                    tokens.push((field.clone(), token));
                }
            }
        }
        tokens
    }

    fn remove(&mut self, id: &str) {
        let Some(previous) = self.documents.remove(id) else {
            return;
        };
        for (field, token) in self.tokens(&previous) {
            if let Some(postings) = self.postings.get_mut(&field) {
                if let Some(ids) = postings.get_mut(&token) {
                    ids.remove(id);
                    if ids.is_empty() {
                        postings.remove(&token);
                    }
                }
            }
        }
    }

    fn insert(&mut self, id: &str, document: Value) {
        self.remove(id);
        for (field, token) in self.tokens(&document) {
            self.postings
                .entry(field)
                .or_default()
                .entry(token)
                .or_default()
                .insert(id.to_string());
        }
        self.documents.insert(id.to_string(), document);
    }

    fn matching_ids(&self, query: &SearchQuery) -> BTreeSet<String> {
        match query {
            SearchQuery::Terms { field, values } => {
                let Some(postings) = self.postings.get(field) else {
                    return BTreeSet::new();
                };
                values
                    .iter()
                    .filter_map(|value| postings.get(value))
                    .flatten()
                    .cloned()
                    .collect()
            },
            SearchQuery::Prefix { field, prefix } => {
                let Some(postings) = self.postings.get(field) else {
                    return BTreeSet::new();
                };
                postings
                    .range(prefix.clone()..)
                    .take_while(|(token, _)| token.starts_with(prefix.as_str()))
                    .flat_map(|(_, ids)| ids.iter().cloned())
                    .collect()
            },
        }
    }
}

/// Search store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    indices: RwLock<BTreeMap<String, MemoryIndex>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn index_names(&self) -> Vec<String> {
        self.indices.read().await.keys().cloned().collect()
    }

    pub async fn document_count(&self, index: &str) -> Option<usize> {
        self.indices
            .read()
            .await
            .get(index)
            .map(|idx| idx.documents.len())
    }
}

#[async_trait]
impl SearchStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn delete_index(&self, index: &str) -> Result<bool> {
        Ok(self.indices.write().await.remove(index).is_some())
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()> {
        let mut indices = self.indices.write().await;
        if indices.contains_key(index) {
            return Err(OntologyError::IndexAlreadyExists(index.to_string()));
        }
        indices.insert(index.to_string(), MemoryIndex::new(schema.clone()));
        debug!(index, "Created in-memory index");
        Ok(())
    }

    async fn index_document(&self, index: &str, id: &str, document: &Value) -> Result<()> {
        let mut indices = self.indices.write().await;
        let target = indices
            .get_mut(index)
            .ok_or_else(|| OntologyError::IndexNotFound(index.to_string()))?;
        target.insert(id, document.clone());
        Ok(())
    }

    async fn index_documents(&self, index: &str, documents: &[(String, Value)]) -> Result<usize> {
        let mut indices = self.indices.write().await;
        let target = indices
            .get_mut(index)
            .ok_or_else(|| OntologyError::IndexNotFound(index.to_string()))?;
        for (id, document) in documents {
            target.insert(id, document.clone());
        }
        Ok(documents.len())
    }

    async fn search(
        &self,
        index: &str,
        query: &SearchQuery,
        size: usize,
    ) -> Result<Vec<SearchHit>> {
        let indices = self.indices.read().await;
        let mut hits = Vec::new();

        for (name, target) in indices.iter().filter(|(name, _)| matches_pattern(index, name)) {
            for id in target.matching_ids(query) {
                if hits.len() >= size {
                    return Ok(hits);
                }
                if let Some(source) = target.documents.get(&id) {
                    hits.push(SearchHit {
                        index: name.clone(),
                        id,
                        source: source.clone(),
                    });
                }
            }
        }

        Ok(hits)
    }
}
