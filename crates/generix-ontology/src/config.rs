//! Configuration management
//!
//! Settings come from the environment (after loading a `.env` file if one is
//! present). The ontology registry is built in, or read from a TOML file named
//! by `GENERIX_ONTOLOGY_CONFIG`.

use crate::store::elasticsearch::DEFAULT_ELASTICSEARCH_URL;
use generix_common::{GenerixError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Directory holding the OBO files, relative to the working directory.
pub const DEFAULT_IMPORT_DIR: &str = "data/import/";

/// Prefix shared by every ontology index.
pub const DEFAULT_INDEX_PREFIX: &str = "generix-ont-";

/// Reserved ontology id addressing every ontology index at once.
pub const ALL_ONTOLOGIES: &str = "all";

/// Documents sent per bulk request during upload.
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 500;

/// Default timeout for search store requests in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;

/// Registry format version understood by this build.
pub const REGISTRY_VERSION: u32 = 1;

// ============================================================================
// Ontology registry
// ============================================================================

/// One registered ontology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyEntry {
    /// Display name
    pub name: String,
    /// OBO file, relative to the import directory
    pub file_name: String,
    /// Validator key stamped onto every term of this ontology
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

impl OntologyEntry {
    pub fn new(name: impl Into<String>, file_name: impl Into<String>) -> Self {
        OntologyEntry {
            name: name.into(),
            file_name: file_name.into(),
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: impl Into<String>) -> Self {
        self.validator = Some(validator.into());
        self
    }
}

/// Immutable mapping of ontology id to its source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyRegistry {
    pub version: u32,
    pub ontologies: BTreeMap<String, OntologyEntry>,
}

impl OntologyRegistry {
    /// The ontologies shipped with Generix
    pub fn builtin() -> Self {
        let ontologies = [
            ("units", "Units", "unit_standalone.obo"),
            ("dtype", "Data types", "data_type_ontology.obo"),
            ("enigma", "ENIGMA metadata", "enigma_specific_ontology.obo"),
            ("env", "ENV", "env.obo"),
            ("context_measurement", "context_measurement", "context_measurement_ontology.obo"),
            ("continent", "continent", "continent.obo"),
            ("country", "country", "country.obo"),
            ("mixs", "mixs", "mixs.obo"),
            ("process_ontology", "process_ontology", "process_ontology.obo"),
        ]
        .into_iter()
        .map(|(id, name, file_name)| (id.to_string(), OntologyEntry::new(name, file_name)))
        .collect();

        OntologyRegistry {
            version: REGISTRY_VERSION,
            ontologies,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let registry: OntologyRegistry = toml::from_str(content)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self)
            .map_err(|e| GenerixError::config(format!("Cannot encode registry: {}", e)))
    }

    pub fn get(&self, ontology_id: &str) -> Option<&OntologyEntry> {
        self.ontologies.get(ontology_id)
    }

    pub fn contains(&self, ontology_id: &str) -> bool {
        self.ontologies.contains_key(ontology_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ontologies.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OntologyEntry)> {
        self.ontologies.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.ontologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ontologies.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != REGISTRY_VERSION {
            return Err(GenerixError::config(format!(
                "Unsupported ontology registry version {} (expected {})",
                self.version, REGISTRY_VERSION
            )));
        }

        for (id, entry) in &self.ontologies {
            if id.is_empty() || id == ALL_ONTOLOGIES || id.contains('*') {
                return Err(GenerixError::config(format!(
                    "Invalid ontology id '{}': ids must be non-empty, must not be '{}' \
                     and must not contain '*'",
                    id, ALL_ONTOLOGIES
                )));
            }
            if entry.file_name.trim().is_empty() {
                return Err(GenerixError::config(format!(
                    "Ontology '{}' has an empty file_name",
                    id
                )));
            }
        }

        Ok(())
    }
}

impl Default for OntologyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Search store selection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    Elasticsearch,
}

impl FromStr for StoreBackend {
    type Err = GenerixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "elasticsearch" | "es" => Ok(StoreBackend::Elasticsearch),
            other => Err(GenerixError::config(format!(
                "Unknown store backend '{}' (expected 'memory' or 'elasticsearch')",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Elasticsearch => write!(f, "elasticsearch"),
        }
    }
}

/// Search store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: DEFAULT_ELASTICSEARCH_URL.to_string(),
            timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// Top-level configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerixConfig {
    pub import_dir: PathBuf,
    pub index_prefix: String,
    pub upload_chunk_size: usize,
    pub store: StoreConfig,
    pub registry: OntologyRegistry,
}

impl GenerixConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let registry = match lookup("GENERIX_ONTOLOGY_CONFIG") {
            Some(path) => OntologyRegistry::from_file(Path::new(&path))?,
            None => OntologyRegistry::builtin(),
        };

        let backend = match lookup("GENERIX_STORE") {
            Some(value) => value.parse()?,
            None => StoreBackend::default(),
        };

        let config = GenerixConfig {
            import_dir: lookup("GENERIX_IMPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMPORT_DIR)),
            index_prefix: lookup("GENERIX_INDEX_PREFIX")
                .unwrap_or_else(|| DEFAULT_INDEX_PREFIX.to_string()),
            upload_chunk_size: lookup("GENERIX_UPLOAD_CHUNK_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_CHUNK_SIZE),
            store: StoreConfig {
                backend,
                url: lookup("ELASTICSEARCH_URL")
                    .unwrap_or_else(|| DEFAULT_ELASTICSEARCH_URL.to_string()),
                timeout_secs: lookup("GENERIX_STORE_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
            },
            registry,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.index_prefix.is_empty() {
            return Err(GenerixError::config("Index prefix cannot be empty"));
        }

        if self.index_prefix.contains('*') {
            return Err(GenerixError::config("Index prefix cannot contain '*'"));
        }

        if self.upload_chunk_size == 0 {
            return Err(GenerixError::config("Upload chunk size must be greater than 0"));
        }

        if self.store.timeout_secs == 0 {
            return Err(GenerixError::config("Store timeout must be greater than 0"));
        }

        if self.store.backend == StoreBackend::Elasticsearch && self.store.url.is_empty() {
            return Err(GenerixError::config("Elasticsearch URL cannot be empty"));
        }

        if self.registry.is_empty() {
            tracing::warn!("Ontology registry is empty - nothing will be uploaded");
        }

        self.registry.validate()
    }

    pub fn with_import_dir(mut self, import_dir: impl Into<PathBuf>) -> Self {
        self.import_dir = import_dir.into();
        self
    }

    pub fn with_registry(mut self, registry: OntologyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Index holding the terms of one ontology
    pub fn index_name(&self, ontology_id: &str) -> String {
        format!("{}{}", self.index_prefix, ontology_id)
    }

    /// Pattern matching every ontology index
    pub fn all_index_pattern(&self) -> String {
        format!("{}*", self.index_prefix)
    }

    /// OBO file for a registered ontology
    pub fn source_path(&self, entry: &OntologyEntry) -> PathBuf {
        self.import_dir.join(&entry.file_name)
    }
}

impl Default for GenerixConfig {
    fn default() -> Self {
        Self {
            import_dir: PathBuf::from(DEFAULT_IMPORT_DIR),
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
            store: StoreConfig::default(),
            registry: OntologyRegistry::builtin(),
        }
    }
}
