// Ontology index manager
//
// Full-replace ingestion: parse the OBO file, build ancestor closures, then
// drop and recreate the ontology index and write one document per term.
// Parsing runs before the drop so a malformed file leaves the live index alone.

use crate::closure::materialize;
use crate::config::{GenerixConfig, OntologyEntry};
use crate::models::{
    Term, TermDocument, FIELD_ONTOLOGY_ID, FIELD_PARENT_PATH_TERM_IDS, FIELD_PARENT_TERM_IDS,
    FIELD_TERM_ID, FIELD_TERM_NAME, FIELD_TERM_NAME_PREFIX,
};
use crate::parser::OboParser;
use crate::store::{IndexSchema, SearchStore};
use crate::{OntologyError, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Outcome of uploading one ontology
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub ontology_id: String,
    pub index_name: String,
    pub terms_indexed: usize,
    pub root_terms: usize,
    /// Whether an earlier version of the index was dropped
    pub dropped_existing: bool,
}

pub struct OntologyIndexer {
    config: Arc<GenerixConfig>,
    store: Arc<dyn SearchStore>,
}

impl OntologyIndexer {
    pub fn new(config: Arc<GenerixConfig>, store: Arc<dyn SearchStore>) -> Self {
        Self { config, store }
    }

    /// Field layout shared by every ontology index
    pub fn term_schema() -> IndexSchema {
        IndexSchema::new()
            .keyword(FIELD_ONTOLOGY_ID)
            .keyword(FIELD_TERM_ID)
            .keyword(FIELD_TERM_NAME)
            .text(FIELD_TERM_NAME_PREFIX)
            .keyword(FIELD_PARENT_TERM_IDS)
            .keyword(FIELD_PARENT_PATH_TERM_IDS)
    }

    fn entry(&self, ontology_id: &str) -> Result<&OntologyEntry> {
        self.config
            .registry
            .get(ontology_id)
            .ok_or_else(|| OntologyError::UnknownOntology(ontology_id.to_string()))
    }

    fn parser_for(ontology_id: &str, entry: &OntologyEntry) -> OboParser {
        OboParser::new(ontology_id).with_validator(entry.validator.clone())
    }

    /// Re-index one registered ontology from its OBO file
    #[instrument(skip(self), fields(backend = self.store.backend()))]
    pub async fn upload(&self, ontology_id: &str) -> Result<IndexStats> {
        let entry = self.entry(ontology_id)?;
        let parser = Self::parser_for(ontology_id, entry);

        let path = self.config.source_path(entry);
        info!(path = %path.display(), "Reading ontology file");
        let content = tokio::fs::read_to_string(&path).await?;

        self.index_parsed(ontology_id, parser, &content).await
    }

    /// Re-index one registered ontology from OBO text already in memory
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn upload_content(&self, ontology_id: &str, content: &str) -> Result<IndexStats> {
        let parser = Self::parser_for(ontology_id, self.entry(ontology_id)?);
        self.index_parsed(ontology_id, parser, content).await
    }

    /// Re-index every registered ontology in turn, stopping at the first failure
    pub async fn upload_all(&self) -> Result<Vec<IndexStats>> {
        let ids: Vec<String> = self.config.registry.ids().map(str::to_string).collect();
        let mut results = Vec::with_capacity(ids.len());

        for ontology_id in ids {
            results.push(self.upload(&ontology_id).await?);
        }

        info!(ontologies = results.len(), "Uploaded all ontologies");
        Ok(results)
    }

    async fn index_parsed(
        &self,
        ontology_id: &str,
        parser: OboParser,
        content: &str,
    ) -> Result<IndexStats> {
        let start = Instant::now();

        let parsed = parser.parse(content)?;
        let root_terms = parsed.root_count();
        let terms = materialize(parsed)?;

        let index_name = self.config.index_name(ontology_id);
        let dropped_existing = self.replace_index(&index_name, &terms).await?;

        let stats = IndexStats {
            ontology_id: ontology_id.to_string(),
            index_name,
            terms_indexed: terms.len(),
            root_terms,
            dropped_existing,
        };

        info!(
            index = %stats.index_name,
            terms = stats.terms_indexed,
            roots = stats.root_terms,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Ontology indexed"
        );

        Ok(stats)
    }

    /// Drop, recreate and fill `index_name`. Returns whether an old index was dropped.
    pub async fn replace_index(&self, index_name: &str, terms: &[Term]) -> Result<bool> {
        let dropped_existing = self.store.delete_index(index_name).await?;
        if dropped_existing {
            debug!(index = index_name, "Dropped existing index");
        }

        self.store
            .create_index(index_name, &Self::term_schema())
            .await?;

        let documents = terms
            .iter()
            .map(|term| -> Result<(String, Value)> {
                let document = serde_json::to_value(TermDocument::from(term))?;
                Ok((term.term_id().to_string(), document))
            })
            .collect::<Result<Vec<(String, Value)>>>()?;

        let chunk_size = self.config.upload_chunk_size.max(1);
        let mut written = 0;
        for (chunk_idx, chunk) in documents.chunks(chunk_size).enumerate() {
            written += self.store.index_documents(index_name, chunk).await?;
            debug!(
                index = index_name,
                chunk = chunk_idx + 1,
                written,
                total = documents.len(),
                "Wrote document chunk"
            );
        }

        self.store.refresh(index_name).await?;

        Ok(dropped_existing)
    }
}
