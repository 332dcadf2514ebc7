//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod find;
pub mod ontologies;
pub mod upload;
pub mod validate;
