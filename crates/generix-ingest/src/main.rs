//! Generix Ingest - ontology indexing and lookup tool

use anyhow::Result;
use clap::Parser;
use generix_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use generix_ingest::{check_store_backend, commands, Cli, Commands};
use generix_ontology::{GenerixConfig, OntologyService, ValidatorRegistry};
use std::process;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .output(LogOutput::Console)
        .log_file_prefix("generix-ingest")
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // Keep the file writer alive for the whole run
    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        },
    };

    match execute_command(cli).await {
        Ok(true) => {},
        Ok(false) => process::exit(1),
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            process::exit(1);
        },
    }
}

/// Execute the CLI command. `Ok(false)` means the command ran but reported a negative outcome.
async fn execute_command(cli: Cli) -> Result<bool> {
    let mut config = GenerixConfig::load()?;
    if let Some(import_dir) = cli.import_dir {
        config = config.with_import_dir(import_dir);
    }

    if let Commands::Ontologies = cli.command {
        commands::ontologies::run(&config);
        return Ok(true);
    }

    if let Some(warning) = check_store_backend(config.store.backend, &cli.command)? {
        warn!(backend = %config.store.backend, "{}", warning);
        eprintln!("Warning: {}", warning);
    }

    let service = OntologyService::from_config(config, ValidatorRegistry::with_builtins())?;

    match cli.command {
        Commands::Upload { ontologies } => {
            info!("Uploading ontologies");
            commands::upload::run(&service, &ontologies).await?;
            Ok(true)
        },
        Commands::Find {
            ontology,
            limit,
            json,
            query,
        } => {
            let ontology = service.ontology(&ontology)?;
            commands::find::run(&ontology, &query, limit, json).await?;
            Ok(true)
        },
        Commands::Validate {
            ontology,
            term_id,
            value,
        } => commands::validate::run(&service, &ontology, &term_id, &value).await,
        Commands::Ontologies => Ok(true),
    }
}
