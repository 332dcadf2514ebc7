//! Generix Ontology Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads OBO ontologies into a search index and answers hierarchical lookups
//! over them.
//!
//! - **Parsing**: [`parser::OboParser`] reads `[Term]` stanzas into a term
//!   arena with resolved `is_a` links
//! - **Closure**: [`closure::materialize`] precomputes every term's ancestors
//! - **Indexing**: [`OntologyIndexer`] replaces an ontology's index wholesale
//! - **Lookup**: [`Ontology`] finds terms by id, name, name prefix, direct
//!   parent or any ancestor
//! - **Stores**: [`store::SearchStore`] with in-memory and Elasticsearch backends

pub mod closure;
pub mod config;
pub mod error;
pub mod indexer;
pub mod models;
pub mod parser;
pub mod query;
pub mod service;
pub mod store;
pub mod validator;

pub use config::{GenerixConfig, OntologyEntry, OntologyRegistry, StoreBackend, StoreConfig};
pub use error::{OntologyError, Result};
pub use indexer::{IndexStats, OntologyIndexer};
pub use models::{Term, TermCollection, TermDocument};
pub use parser::{OboParser, ParsedOntology};
pub use query::Ontology;
pub use service::OntologyService;
pub use store::{ElasticsearchStore, MemoryStore, SearchStore};
pub use validator::{RegexValidator, Validator, ValidatorRegistry};

/// Result size used when a query does not name its own limit
pub const DEFAULT_PAGE_SIZE: usize = 100;
