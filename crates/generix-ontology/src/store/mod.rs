//! Search store adapters
//!
//! The ontology layer needs only a small slice of a search engine:
//!
//! - drop / create an index with a fixed field schema
//! - write JSON documents under a caller-chosen id
//! - term-set and prefix queries over one index or a wildcard pattern
//!
//! [`SearchStore`] captures that contract. [`MemoryStore`] is an in-process
//! inverted index used by tests and single-process tooling;
//! [`ElasticsearchStore`] talks to an Elasticsearch cluster over REST.

pub mod elasticsearch;
pub mod memory;

pub use elasticsearch::ElasticsearchStore;
pub use memory::MemoryStore;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// How a field is indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Whole value is one exact-match token
    Keyword,
    /// Lower-cased and split into word tokens. Apostrophes between word
    /// characters stay in the token, as with the standard analyzer.
    Text,
}

impl FieldKind {
    /// Tokens produced for `value` when it is indexed under this kind
    pub fn analyze(self, value: &str) -> Vec<String> {
        match self {
            FieldKind::Keyword => vec![value.to_string()],
            FieldKind::Text => word_tokens(value),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_tokens(value: &str) -> Vec<String> {
    let chars: Vec<char> = value.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let joins_word = (c == '\'' || c == '\u{2019}')
            && i > 0
            && is_word_char(chars[i - 1])
            && chars.get(i + 1).is_some_and(|&next| is_word_char(next));

        if is_word_char(c) || joins_word {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub name: String,
    pub kind: FieldKind,
}

/// Field layout for a new index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSchema {
    fields: Vec<FieldMapping>,
}

impl IndexSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldMapping {
            name: name.into(),
            kind: FieldKind::Keyword,
        });
        self
    }

    pub fn text(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldMapping {
            name: name.into(),
            kind: FieldKind::Text,
        });
        self
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Mapping for `name`. Fields outside the schema are treated as keywords.
    pub fn kind_of(&self, name: &str) -> FieldKind {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.kind)
            .unwrap_or(FieldKind::Keyword)
    }
}

/// The two query shapes the ontology facade issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Field holds at least one of `values` (exact token match)
    Terms { field: String, values: Vec<String> },
    /// Field holds a token starting with `prefix`. The prefix is not analyzed.
    Prefix { field: String, prefix: String },
}

impl SearchQuery {
    pub fn terms<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchQuery::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefix(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        SearchQuery::Prefix {
            field: field.into(),
            prefix: prefix.into(),
        }
    }

    /// Elasticsearch query DSL for this query
    pub fn to_dsl(&self) -> Value {
        match self {
            SearchQuery::Terms { field, values } => {
                json!({ "terms": { field.as_str(): values } })
            },
            SearchQuery::Prefix { field, prefix } => {
                json!({ "prefix": { field.as_str(): prefix } })
            },
        }
    }
}

/// One matching document
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub index: String,
    pub id: String,
    pub source: Value,
}

/// Minimal document-store contract used by ingestion and lookup
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Drop an index. Returns `false` when there was nothing to drop.
    async fn delete_index(&self, index: &str) -> Result<bool>;

    /// Create an index. Fails with `IndexAlreadyExists` on a name clash.
    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()>;

    /// Write one document, replacing any document with the same id
    async fn index_document(&self, index: &str, id: &str, document: &Value) -> Result<()>;

    /// Write a batch of documents and return how many were written
    async fn index_documents(&self, index: &str, documents: &[(String, Value)]) -> Result<usize> {
        for (id, document) in documents {
            self.index_document(index, id, document).await?;
        }
        Ok(documents.len())
    }

    /// Make previous writes visible to search
    async fn refresh(&self, _index: &str) -> Result<()> {
        Ok(())
    }

    /// Run `query` against an index name or a `*` pattern.
    ///
    /// Missing indices yield an empty result rather than an error.
    async fn search(&self, index: &str, query: &SearchQuery, size: usize) -> Result<Vec<SearchHit>>;
}

/// Glob match supporting `*` only, as used for index patterns
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return name.is_empty();
    };
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };

    let remaining: Vec<&str> = parts.collect();
    let Some((last, middle)) = remaining.split_last() else {
        // No '*' at all: exact match
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
