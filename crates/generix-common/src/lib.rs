//! Generix Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the Generix ontology workspace.
//!
//! - **Error Handling**: [`GenerixError`] and the [`Result`] alias used by
//!   configuration loading and other cross-crate plumbing
//! - **Logging**: [`logging::init_logging`] wires up `tracing` for binaries
//!
//! # Example
//!
//! ```no_run
//! use generix_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{GenerixError, Result};
