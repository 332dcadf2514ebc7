//! Error types for ontology ingestion and lookup

use generix_common::GenerixError;

/// Result type for ontology operations
pub type Result<T> = std::result::Result<T, OntologyError>;

#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Term '{term_id}' declares parent '{parent_id}' which is not defined in the file")]
    UnknownParent { term_id: String, parent_id: String },

    #[error("Cycle in is_a hierarchy: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Unknown ontology: {0}")]
    UnknownOntology(String),

    #[error("More than one term matches {field} = '{value}'")]
    AmbiguousMatch { field: &'static str, value: String },

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    #[error("Search store returned {status}: {message}")]
    Store { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Common(#[from] GenerixError),
}

impl OntologyError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        OntologyError::Parse {
            line,
            message: message.into(),
        }
    }
}
