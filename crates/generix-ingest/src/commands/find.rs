//! Find command implementation

use crate::FindQuery;
use anyhow::Result;
use generix_ontology::{Ontology, Term, TermCollection, TermDocument};
use tracing::debug;

/// Run `query` against `ontology`
pub async fn execute(
    ontology: &Ontology,
    query: &FindQuery,
    limit: usize,
) -> Result<TermCollection> {
    debug!(ontology = ontology.ontology_id(), ?query, limit, "Running lookup");

    let terms = match query {
        FindQuery::Id { term_id } => single(ontology.find_by_id(term_id).await?),
        FindQuery::Name { name } => single(ontology.find_by_name(name).await?),
        FindQuery::Prefix { prefix } => ontology.find_by_name_prefix(prefix).await?,
        FindQuery::Ids { term_ids } => ontology.find_by_ids(term_ids.as_slice(), limit).await?,
        FindQuery::Children { parent_ids } => {
            ontology.find_by_direct_parent_ids(parent_ids.as_slice(), limit).await?
        },
        FindQuery::Descendants { ancestor_ids } => {
            ontology.find_by_ancestor_ids(ancestor_ids.as_slice(), limit).await?
        },
    };

    Ok(terms)
}

fn single(term: Option<Term>) -> TermCollection {
    TermCollection::new(term.into_iter().collect())
}

/// Text listing, or a JSON array of stored documents
pub fn render(terms: &TermCollection, json: bool) -> Result<String> {
    if json {
        let documents: Vec<TermDocument> = terms.iter().map(TermDocument::from).collect();
        Ok(serde_json::to_string_pretty(&documents)?)
    } else {
        Ok(terms.to_string())
    }
}

pub async fn run(ontology: &Ontology, query: &FindQuery, limit: usize, json: bool) -> Result<()> {
    let terms = execute(ontology, query, limit).await?;
    print!("{}", render(&terms, json)?);
    if json {
        println!();
    }
    Ok(())
}
