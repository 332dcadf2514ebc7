//! Entry point tying configuration, store and validators together
//!
//! ```no_run
//! # async fn demo() -> generix_ontology::Result<()> {
//! use generix_ontology::{GenerixConfig, OntologyService, ValidatorRegistry};
//!
//! let config = GenerixConfig::load()?;
//! let service = OntologyService::from_config(config, ValidatorRegistry::with_builtins())?;
//!
//! let units = service.ontology("units")?;
//! if let Some(term) = units.find_by_name("meter").await? {
//!     println!("{}", term);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::{GenerixConfig, OntologyRegistry, StoreBackend, ALL_ONTOLOGIES};
use crate::indexer::OntologyIndexer;
use crate::query::Ontology;
use crate::store::{ElasticsearchStore, MemoryStore, SearchStore};
use crate::validator::ValidatorRegistry;
use crate::{OntologyError, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct OntologyService {
    config: Arc<GenerixConfig>,
    store: Arc<dyn SearchStore>,
    validators: Arc<ValidatorRegistry>,
}

impl OntologyService {
    pub fn new(
        config: GenerixConfig,
        store: Arc<dyn SearchStore>,
        validators: ValidatorRegistry,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            validators: Arc::new(validators),
        }
    }

    /// Build the service with the store backend named in `config`
    pub fn from_config(config: GenerixConfig, validators: ValidatorRegistry) -> Result<Self> {
        let store: Arc<dyn SearchStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Elasticsearch => {
                Arc::new(ElasticsearchStore::from_config(&config.store)?)
            },
        };

        info!(
            backend = store.backend(),
            ontologies = config.registry.len(),
            index_prefix = %config.index_prefix,
            "Ontology service ready"
        );

        Ok(Self::new(config, store, validators))
    }

    /// Query handle for a registered ontology, or for every ontology via `all`
    pub fn ontology(&self, ontology_id: &str) -> Result<Ontology> {
        if ontology_id == ALL_ONTOLOGIES {
            return Ok(self.all());
        }
        if !self.config.registry.contains(ontology_id) {
            return Err(OntologyError::UnknownOntology(ontology_id.to_string()));
        }

        Ok(Ontology::new(
            ontology_id,
            self.config.index_name(ontology_id),
            self.store.clone(),
        ))
    }

    /// Query handle spanning every ontology index
    pub fn all(&self) -> Ontology {
        Ontology::new(ALL_ONTOLOGIES, self.config.all_index_pattern(), self.store.clone())
    }

    pub fn units(&self) -> Result<Ontology> {
        self.ontology("units")
    }

    pub fn data_types(&self) -> Result<Ontology> {
        self.ontology("dtype")
    }

    pub fn enigma(&self) -> Result<Ontology> {
        self.ontology("enigma")
    }

    pub fn env(&self) -> Result<Ontology> {
        self.ontology("env")
    }

    pub fn indexer(&self) -> OntologyIndexer {
        OntologyIndexer::new(self.config.clone(), self.store.clone())
    }

    pub fn config(&self) -> &GenerixConfig {
        &self.config
    }

    pub fn registry(&self) -> &OntologyRegistry {
        &self.config.registry
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    pub fn store(&self) -> Arc<dyn SearchStore> {
        self.store.clone()
    }

    /// Look up a term and check `value` against its validator.
    ///
    /// Returns `None` when the term does not exist.
    pub async fn validate_term_value(
        &self,
        ontology_id: &str,
        term_id: &str,
        value: &str,
    ) -> Result<Option<bool>> {
        let term = self.ontology(ontology_id)?.find_by_id(term_id).await?;
        Ok(term.map(|term| term.validate(value, &self.validators)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn memory_config() -> GenerixConfig {
        GenerixConfig::default().with_store(StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        })
    }

    #[test]
    fn test_ontology_handles() {
        let service =
            OntologyService::from_config(memory_config(), ValidatorRegistry::new()).unwrap();

        assert_eq!(service.units().unwrap().index(), "generix-ont-units");
        assert_eq!(service.data_types().unwrap().index(), "generix-ont-dtype");
        assert_eq!(service.ontology("all").unwrap().index(), "generix-ont-*");
        assert_eq!(service.store().backend(), "memory");

        let err = service.ontology("nope").unwrap_err();
        assert!(matches!(err, OntologyError::UnknownOntology(id) if id == "nope"));
    }

    #[test]
    fn test_elasticsearch_backend_is_built() {
        let config = GenerixConfig::default();
        let service = OntologyService::from_config(config, ValidatorRegistry::new()).unwrap();
        assert_eq!(service.store().backend(), "elasticsearch");
    }
}
