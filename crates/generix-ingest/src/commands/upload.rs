//! Upload command implementation

use crate::progress::{create_progress_bar, format_terms};
use anyhow::{Context, Result};
use generix_ontology::{IndexStats, OntologyService};
use tracing::info;

/// Re-index the given ontologies, or every registered ontology when `ontologies` is empty.
///
/// Stops at the first failure. Ontologies uploaded before it stay uploaded.
pub async fn run(service: &OntologyService, ontologies: &[String]) -> Result<Vec<IndexStats>> {
    let ids: Vec<String> = if ontologies.is_empty() {
        service.registry().ids().map(str::to_string).collect()
    } else {
        ontologies.to_vec()
    };

    let indexer = service.indexer();
    let pb = create_progress_bar(ids.len() as u64, "Uploading ontologies");
    let mut results = Vec::with_capacity(ids.len());

    for ontology_id in &ids {
        pb.set_message(format!("Uploading {}", ontology_id));
        let stats = indexer
            .upload(ontology_id)
            .await
            .with_context(|| format!("Failed to upload ontology '{}'", ontology_id))?;

        pb.suspend(|| {
            println!(
                "{}: {} into {}",
                stats.ontology_id,
                format_terms(stats.terms_indexed),
                stats.index_name
            )
        });
        pb.inc(1);
        results.push(stats);
    }

    pb.finish_with_message(format!("Uploaded {} ontologies", results.len()));
    info!(ontologies = results.len(), "Upload complete");

    Ok(results)
}
