//! Generix Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Command-line front end for the ontology index:
//!
//! - **Upload**: re-index one, several or all registered ontologies
//! - **Ontologies**: list the registry
//! - **Find**: run id, name, prefix, children and descendant lookups
//! - **Validate**: check a value against a term's validator

pub mod commands;
pub mod progress;

use anyhow::bail;
use clap::{Parser, Subcommand};
use generix_ontology::{StoreBackend, DEFAULT_PAGE_SIZE};
use std::path::PathBuf;

/// Generix ontology ingestion and lookup tool
#[derive(Parser, Debug)]
#[command(name = "generix-ingest")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the OBO files
    #[arg(long, env = "GENERIX_IMPORT_DIR", global = true)]
    pub import_dir: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild ontology indices from their OBO files
    Upload {
        /// Ontology to upload (repeatable, defaults to every registered ontology)
        #[arg(short, long = "ontology")]
        ontologies: Vec<String>,
    },

    /// List registered ontologies
    Ontologies,

    /// Look up terms
    Find {
        /// Ontology id, or "all" for every ontology
        #[arg(short, long, default_value = "all")]
        ontology: String,

        /// Maximum number of terms returned
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,

        /// Print JSON instead of the text listing
        #[arg(long)]
        json: bool,

        #[command(subcommand)]
        query: FindQuery,
    },

    /// Check a value against a term's validator
    Validate {
        /// Ontology the term belongs to
        #[arg(short, long)]
        ontology: String,

        /// Term id
        term_id: String,

        /// Value to check
        value: String,
    },
}

impl Commands {
    /// True for commands that read ontologies back from the store
    pub fn reads_store(&self) -> bool {
        matches!(self, Commands::Find { .. } | Commands::Validate { .. })
    }
}

/// Check that `command` can do useful work against `backend`.
///
/// The memory backend starts empty on every run and is dropped on exit.
/// Lookups against it are refused. Uploads still run, as a check of the OBO
/// files, and get a warning to show the user.
pub fn check_store_backend(
    backend: StoreBackend,
    command: &Commands,
) -> anyhow::Result<Option<&'static str>> {
    if backend != StoreBackend::Memory {
        return Ok(None);
    }
    if command.reads_store() {
        bail!(
            "The memory store starts empty on every run; \
             set GENERIX_STORE=elasticsearch to query uploaded ontologies"
        );
    }
    match command {
        Commands::Upload { .. } => Ok(Some(
            "the memory store is discarded on exit; this upload only checks the ontology files",
        )),
        _ => Ok(None),
    }
}

/// Lookup kinds for `find`
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FindQuery {
    /// Term with this id
    Id { term_id: String },

    /// Terms with any of these ids
    Ids {
        #[arg(required = true)]
        term_ids: Vec<String>,
    },

    /// Term with exactly this name
    Name { name: String },

    /// Terms with a name word starting with this prefix
    Prefix { prefix: String },

    /// Terms whose direct parents include any of these ids
    Children {
        #[arg(required = true)]
        parent_ids: Vec<String>,
    },

    /// Terms descending from any of these ids
    Descendants {
        #[arg(required = true)]
        ancestor_ids: Vec<String>,
    },
}
