//! Validate command implementation

use anyhow::{bail, Result};
use generix_ontology::OntologyService;
use tracing::info;

/// Check `value` against the validator of `term_id`. Unknown terms are an error.
pub async fn run(
    service: &OntologyService,
    ontology_id: &str,
    term_id: &str,
    value: &str,
) -> Result<bool> {
    let Some(valid) = service.validate_term_value(ontology_id, term_id, value).await? else {
        bail!("Term '{}' not found in ontology '{}'", term_id, ontology_id);
    };

    info!(ontology_id, term_id, valid, "Validated value");
    if valid {
        println!("valid: '{}' is accepted by {}", value, term_id);
    } else {
        println!("invalid: '{}' is rejected by {}", value, term_id);
    }

    Ok(valid)
}
