// Query facade over one ontology index (or every index via the `all` pattern)

use crate::models::{
    Term, TermCollection, TermDocument, FIELD_PARENT_PATH_TERM_IDS, FIELD_PARENT_TERM_IDS,
    FIELD_TERM_ID, FIELD_TERM_NAME, FIELD_TERM_NAME_PREFIX,
};
use crate::store::{SearchQuery, SearchStore};
use crate::{OntologyError, Result, DEFAULT_PAGE_SIZE};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Handle for querying one ontology.
///
/// Cheap to clone. Every handle created by the same service shares one store.
#[derive(Clone)]
pub struct Ontology {
    ontology_id: String,
    index: String,
    store: Arc<dyn SearchStore>,
}

impl Ontology {
    pub fn new(
        ontology_id: impl Into<String>,
        index: impl Into<String>,
        store: Arc<dyn SearchStore>,
    ) -> Self {
        Ontology {
            ontology_id: ontology_id.into(),
            index: index.into(),
            store,
        }
    }

    pub fn ontology_id(&self) -> &str {
        &self.ontology_id
    }

    /// Index name or pattern this handle searches
    pub fn index(&self) -> &str {
        &self.index
    }

    async fn find_terms(&self, query: SearchQuery, size: usize) -> Result<Vec<Term>> {
        let hits = self.store.search(&self.index, &query, size).await?;
        debug!(index = %self.index, hits = hits.len(), "Ontology query");

        hits.into_iter()
            .map(|hit| -> Result<Term> {
                let document: TermDocument = serde_json::from_value(hit.source)?;
                Ok(Term::from(document))
            })
            .collect()
    }

    async fn find_unique(&self, field: &'static str, value: &str) -> Result<Option<Term>> {
        let mut terms = self.find_terms(SearchQuery::terms(field, [value]), 2).await?;
        if terms.len() > 1 {
            return Err(OntologyError::AmbiguousMatch {
                field,
                value: value.to_string(),
            });
        }
        Ok(terms.pop())
    }

    async fn find_any_of<S: AsRef<str>>(
        &self,
        field: &'static str,
        values: &[S],
        limit: usize,
    ) -> Result<TermCollection> {
        if values.is_empty() {
            return Ok(TermCollection::default());
        }
        let query = SearchQuery::terms(field, values.iter().map(|v| v.as_ref().to_string()));
        Ok(TermCollection::new(self.find_terms(query, limit).await?))
    }

    pub async fn find_by_id(&self, term_id: &str) -> Result<Option<Term>> {
        self.find_unique(FIELD_TERM_ID, term_id).await
    }

    /// Exact, case-sensitive name match
    pub async fn find_by_name(&self, term_name: &str) -> Result<Option<Term>> {
        self.find_unique(FIELD_TERM_NAME, term_name).await
    }

    /// Terms with a name word starting with `prefix`, case-insensitively
    pub async fn find_by_name_prefix(&self, prefix: &str) -> Result<TermCollection> {
        let query = SearchQuery::prefix(FIELD_TERM_NAME_PREFIX, prefix.to_lowercase());
        Ok(TermCollection::new(self.find_terms(query, DEFAULT_PAGE_SIZE).await?))
    }

    pub async fn find_by_ids<S: AsRef<str>>(
        &self,
        term_ids: &[S],
        limit: usize,
    ) -> Result<TermCollection> {
        self.find_any_of(FIELD_TERM_ID, term_ids, limit).await
    }

    /// Terms whose direct parents include any of `parent_ids`
    pub async fn find_by_direct_parent_ids<S: AsRef<str>>(
        &self,
        parent_ids: &[S],
        limit: usize,
    ) -> Result<TermCollection> {
        self.find_any_of(FIELD_PARENT_TERM_IDS, parent_ids, limit).await
    }

    /// Terms that descend (at any depth) from any of `ancestor_ids`
    pub async fn find_by_ancestor_ids<S: AsRef<str>>(
        &self,
        ancestor_ids: &[S],
        limit: usize,
    ) -> Result<TermCollection> {
        self.find_any_of(FIELD_PARENT_PATH_TERM_IDS, ancestor_ids, limit).await
    }

    /// Terms for `term_ids`, keyed by term name
    pub async fn find_ids_as_map<S: AsRef<str>>(
        &self,
        term_ids: &[S],
    ) -> Result<HashMap<String, Term>> {
        let terms = self.find_by_ids(term_ids, DEFAULT_PAGE_SIZE).await?;
        Ok(by_name(terms))
    }

    /// Terms for exact `term_names`, keyed by term name
    pub async fn find_names_as_map<S: AsRef<str>>(
        &self,
        term_names: &[S],
    ) -> Result<HashMap<String, Term>> {
        let terms = self
            .find_any_of(FIELD_TERM_NAME, term_names, DEFAULT_PAGE_SIZE)
            .await?;
        Ok(by_name(terms))
    }
}

fn by_name(terms: TermCollection) -> HashMap<String, Term> {
    terms
        .into_iter()
        .map(|term| (term.term_name().to_string(), term))
        .collect()
}

impl fmt::Debug for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ontology")
            .field("ontology_id", &self.ontology_id)
            .field("index", &self.index)
            .field("backend", &self.store.backend())
            .finish()
    }
}
