// Ontology term entities

use crate::service::OntologyService;
use crate::validator::ValidatorRegistry;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Indexed field names
// ============================================================================

pub const FIELD_ONTOLOGY_ID: &str = "ontology_id";
pub const FIELD_TERM_ID: &str = "term_id";
pub const FIELD_TERM_NAME: &str = "term_name";
pub const FIELD_TERM_NAME_PREFIX: &str = "term_name_prefix";
pub const FIELD_PARENT_TERM_IDS: &str = "parent_term_ids";
pub const FIELD_PARENT_PATH_TERM_IDS: &str = "parent_path_term_ids";

// ============================================================================
// Term
// ============================================================================

/// A single ontology concept.
///
/// Terms are read-only values. They are produced by the OBO parser during
/// ingestion and again by the query facade when documents come back from the
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    ontology_id: String,
    term_id: String,
    term_name: String,
    parent_ids: Vec<String>,
    parent_path_ids: Vec<String>,
    validator: Option<String>,
}

impl Term {
    pub fn new(
        ontology_id: impl Into<String>,
        term_id: impl Into<String>,
        term_name: impl Into<String>,
        parent_ids: Vec<String>,
    ) -> Self {
        Term {
            ontology_id: ontology_id.into(),
            term_id: term_id.into(),
            term_name: term_name.into(),
            parent_ids,
            parent_path_ids: Vec::new(),
            validator: None,
        }
    }

    pub fn with_parent_path_ids(mut self, parent_path_ids: Vec<String>) -> Self {
        self.parent_path_ids = parent_path_ids;
        self
    }

    pub fn with_validator(mut self, validator: Option<String>) -> Self {
        self.validator = validator;
        self
    }

    pub fn ontology_id(&self) -> &str {
        &self.ontology_id
    }

    pub fn term_id(&self) -> &str {
        &self.term_id
    }

    pub fn term_name(&self) -> &str {
        &self.term_name
    }

    /// Direct is_a parents, in file order
    pub fn parent_ids(&self) -> &[String] {
        &self.parent_ids
    }

    /// Every transitive ancestor. Order carries no meaning.
    pub fn parent_path_ids(&self) -> &[String] {
        &self.parent_path_ids
    }

    pub fn validator(&self) -> Option<&str> {
        self.validator.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// True when `ancestor_id` appears anywhere above this term
    pub fn descends_from(&self, ancestor_id: &str) -> bool {
        self.parent_path_ids.iter().any(|id| id == ancestor_id)
    }

    /// Check a value against the validator named by this term.
    ///
    /// A term without a validator key, or with a key the registry does not
    /// know, accepts every value.
    pub fn validate(&self, value: &str, validators: &ValidatorRegistry) -> bool {
        validators.validate(self.validator(), value)
    }

    /// Fetch the direct parents from the store, keyed by term name
    pub async fn load_parents(&self, service: &OntologyService) -> Result<HashMap<String, Term>> {
        service
            .ontology(&self.ontology_id)?
            .find_ids_as_map(self.parent_ids.as_slice())
            .await
    }

    /// Fetch the terms that list this term as a direct parent
    pub async fn load_children(&self, service: &OntologyService) -> Result<TermCollection> {
        service
            .ontology(&self.ontology_id)?
            .find_by_direct_parent_ids(&[self.term_id.as_str()], crate::DEFAULT_PAGE_SIZE)
            .await
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] = {}  parents:{:?}",
            self.ontology_id, self.term_id, self.term_name, self.parent_ids
        )
    }
}

// ============================================================================
// Stored document
// ============================================================================

/// Shape of a term as written to the search store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermDocument {
    pub ontology_id: String,
    pub term_id: String,
    pub term_name: String,
    /// Same text as `term_name`, indexed through the tokenizing analyzer
    pub term_name_prefix: String,
    #[serde(default)]
    pub parent_term_ids: Vec<String>,
    #[serde(default)]
    pub parent_path_term_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

impl From<&Term> for TermDocument {
    fn from(term: &Term) -> Self {
        TermDocument {
            ontology_id: term.ontology_id.clone(),
            term_id: term.term_id.clone(),
            term_name: term.term_name.clone(),
            term_name_prefix: term.term_name.clone(),
            parent_term_ids: term.parent_ids.clone(),
            parent_path_term_ids: term.parent_path_ids.clone(),
            validator: term.validator.clone(),
        }
    }
}

impl From<TermDocument> for Term {
    fn from(doc: TermDocument) -> Self {
        Term {
            ontology_id: doc.ontology_id,
            term_id: doc.term_id,
            term_name: doc.term_name,
            parent_ids: doc.parent_term_ids,
            parent_path_ids: doc.parent_path_term_ids,
            validator: doc.validator,
        }
    }
}

// ============================================================================
// Term Collection
// ============================================================================

/// Ordered query result with lookup by normalized term name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermCollection {
    terms: Vec<Term>,
    by_key: HashMap<String, usize>,
}

impl TermCollection {
    pub fn new(terms: Vec<Term>) -> Self {
        let by_key = terms
            .iter()
            .enumerate()
            .map(|(position, term)| (Self::key_for(term.term_name()), position))
            .collect();

        TermCollection { terms, by_key }
    }

    /// Lookup key for a term name: whitespace runs become `_`.
    /// Example: "degree Celsius" -> "degree_Celsius"
    pub fn key_for(term_name: &str) -> String {
        term_name.split_whitespace().collect::<Vec<_>>().join("_")
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn first(&self) -> Option<&Term> {
        self.terms.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.terms.iter()
    }

    /// Find by derived key. When several terms share a key the last one wins.
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.by_key.get(key).map(|&position| &self.terms[position])
    }

    /// Find by term name as written, e.g. "degree Celsius"
    pub fn by_name(&self, term_name: &str) -> Option<&Term> {
        self.get(&Self::key_for(term_name))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.terms.iter().map(Term::term_id).collect()
    }

    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }
}

impl IntoIterator for TermCollection {
    type Item = Term;
    type IntoIter = std::vec::IntoIter<Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

impl<'a> IntoIterator for &'a TermCollection {
    type Item = &'a Term;
    type IntoIter = std::slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

impl fmt::Display for TermCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---------- ")?;
        writeln!(f, " {} terms", self.terms.len())?;
        writeln!(f, "---------- ")?;
        for term in &self.terms {
            writeln!(f, "{}", term)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn term(id: &str, name: &str, parents: &[&str]) -> Term {
        Term::new("units", id, name, parents.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_collection_key_lookup() {
        let collection = TermCollection::new(vec![
            term("UO:0000027", "degree Celsius", &["UO:0000005"]),
            term("UO:0000008", "meter", &["UO:0000001"]),
        ]);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get("degree_Celsius").unwrap().term_id(), "UO:0000027");
        assert_eq!(collection.by_name("degree  Celsius").unwrap().term_id(), "UO:0000027");
        assert!(collection.get("degree Celsius").is_none());
        assert_eq!(collection.ids(), vec!["UO:0000027", "UO:0000008"]);
    }

    #[test]
    fn test_collection_name_collision_last_wins() {
        let collection = TermCollection::new(vec![
            term("A", "unit", &[]),
            term("B", "unit", &[]),
        ]);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get("unit").unwrap().term_id(), "B");
    }

    #[test]
    fn test_document_conversion_keeps_fields() {
        let original = term("C", "Puppy", &["B"])
            .with_parent_path_ids(vec!["B".to_string(), "A".to_string()])
            .with_validator(Some("protein_sequence".to_string()));

        let doc = TermDocument::from(&original);
        assert_eq!(doc.term_name_prefix, "Puppy");
        assert_eq!(doc.parent_path_term_ids, vec!["B", "A"]);

        let json = serde_json::to_value(&doc).unwrap();
        let back: TermDocument = serde_json::from_value(json).unwrap();
        assert_eq!(Term::from(back), original);
    }

    #[test]
    fn test_document_without_validator_omits_field() {
        let doc = TermDocument::from(&term("A", "Animal", &[]));
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("validator").is_none());
        assert_eq!(json["parent_term_ids"], serde_json::json!([]));
    }

    #[test]
    fn test_term_display() {
        let t = term("B", "Dog", &["A"]);
        assert_eq!(t.to_string(), "units[B] = Dog  parents:[\"A\"]");
        assert!(!t.is_root());
        assert!(term("A", "Animal", &[]).is_root());
    }

    #[test]
    fn test_descends_from_follows_ancestor_path() {
        let puppy = term("C", "Puppy", &["B"])
            .with_parent_path_ids(vec!["B".to_string(), "A".to_string()]);

        assert!(puppy.descends_from("B"));
        assert!(puppy.descends_from("A"));
        assert!(!puppy.descends_from("C"));
        assert!(!term("C", "Puppy", &["B"]).descends_from("B"));
    }
}
