//! End-to-end ingestion and lookup against the in-memory store
//!
//! These tests validate the full workflow:
//! - Uploading OBO files from an import directory
//! - Id, name, prefix, parent and ancestor lookups
//! - The `all` pseudo-ontology spanning every index
//! - Term navigation and validation through the service

use generix_ontology::config::{
    OntologyEntry, OntologyRegistry, StoreBackend, StoreConfig, REGISTRY_VERSION,
};
use generix_ontology::{GenerixConfig, OntologyError, OntologyService, ValidatorRegistry};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tempfile::TempDir;

const ZOO: &str = "\
format-version: 1.2
ontology: zoo

[Term]
id: A
name: Animal

[Term]
id: B
name: Dog
is_a: A ! Animal

[Term]
id: C
name: Puppy
is_a: B ! Dog
";

const ANATOMY: &str = "\
[Term]
id: AN:1
name: Organ

[Term]
id: AN:2
name: Heart
is_a: AN:1

[Term]
id: AN:3
name: heat shield
is_a: AN:1

[Term]
id: AN:4
name: Resting heart rate
is_a: AN:2
";

const PROTEINS: &str = "\
[Term]
id: PR:1
name: protein

[Term]
id: PR:2
name: insulin
is_a: PR:1
";

fn write_file(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn registry() -> OntologyRegistry {
    OntologyRegistry {
        version: REGISTRY_VERSION,
        ontologies: BTreeMap::from([
            ("zoo".to_string(), OntologyEntry::new("Zoo", "zoo.obo")),
            ("anatomy".to_string(), OntologyEntry::new("Anatomy", "anatomy.obo")),
            (
                "proteins".to_string(),
                OntologyEntry::new("Proteins", "proteins.obo").with_validator("protein_sequence"),
            ),
        ]),
    }
}

/// Service over a memory store with every test ontology uploaded
async fn uploaded_service() -> (TempDir, OntologyService) {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "zoo.obo", ZOO);
    write_file(dir.path(), "anatomy.obo", ANATOMY);
    write_file(dir.path(), "proteins.obo", PROTEINS);

    let config = GenerixConfig::default()
        .with_import_dir(dir.path())
        .with_registry(registry())
        .with_store(StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        });

    let service = OntologyService::from_config(config, ValidatorRegistry::with_builtins()).unwrap();
    let stats = service.indexer().upload_all().await.unwrap();
    assert_eq!(stats.len(), 3);

    (dir, service)
}

fn ids(collection: &generix_ontology::TermCollection) -> BTreeSet<String> {
    collection.iter().map(|t| t.term_id().to_string()).collect()
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// Lookup Tests
// ============================================================================

#[tokio::test]
async fn test_find_by_id_round_trips_term() {
    let (_dir, service) = uploaded_service().await;
    let zoo = service.ontology("zoo").unwrap();

    let puppy = zoo.find_by_id("C").await.unwrap().unwrap();
    assert_eq!(puppy.ontology_id(), "zoo");
    assert_eq!(puppy.term_name(), "Puppy");
    assert_eq!(puppy.parent_ids(), ["B"]);
    let ancestors: BTreeSet<String> = puppy.parent_path_ids().iter().cloned().collect();
    assert_eq!(ancestors, set(&["A", "B"]));
    assert!(puppy.descends_from("A"));
    assert!(!puppy.descends_from("C"));

    assert!(zoo.find_by_id("Z").await.unwrap().is_none());
}

#[tokio::test]
async fn test_ancestor_and_parent_queries() {
    let (_dir, service) = uploaded_service().await;
    let zoo = service.ontology("zoo").unwrap();

    let descendants = zoo.find_by_ancestor_ids(&["A"], 100).await.unwrap();
    assert_eq!(ids(&descendants), set(&["B", "C"]));

    let children = zoo.find_by_direct_parent_ids(&["A"], 100).await.unwrap();
    assert_eq!(ids(&children), set(&["B"]));

    let leaves = zoo.find_by_ancestor_ids(&["C"], 100).await.unwrap();
    assert!(leaves.is_empty());
}

#[tokio::test]
async fn test_find_by_name_is_exact() {
    let (_dir, service) = uploaded_service().await;
    let zoo = service.ontology("zoo").unwrap();

    assert_eq!(zoo.find_by_name("Dog").await.unwrap().unwrap().term_id(), "B");
    assert!(zoo.find_by_name("dog").await.unwrap().is_none());
    assert!(zoo.find_by_name("Do").await.unwrap().is_none());
}

#[tokio::test]
async fn test_name_prefix_is_case_insensitive() {
    let (_dir, service) = uploaded_service().await;
    let anatomy = service.ontology("anatomy").unwrap();

    let upper = anatomy.find_by_name_prefix("Hea").await.unwrap();
    let lower = anatomy.find_by_name_prefix("hea").await.unwrap();
    assert_eq!(ids(&upper), ids(&lower));
    assert_eq!(ids(&upper), set(&["AN:2", "AN:3", "AN:4"]));

    // Later words of a name match too
    let rate = anatomy.find_by_name_prefix("rat").await.unwrap();
    assert_eq!(ids(&rate), set(&["AN:4"]));
}

#[tokio::test]
async fn test_find_by_ids_and_maps() {
    let (_dir, service) = uploaded_service().await;
    let anatomy = service.ontology("anatomy").unwrap();

    let found = anatomy.find_by_ids(&["AN:1", "AN:4", "AN:99"], 100).await.unwrap();
    assert_eq!(ids(&found), set(&["AN:1", "AN:4"]));
    assert_eq!(found.by_name("Resting heart rate").unwrap().term_id(), "AN:4");
    assert_eq!(found.get("Resting_heart_rate").unwrap().term_id(), "AN:4");

    let by_id = anatomy.find_ids_as_map(&["AN:2"]).await.unwrap();
    assert_eq!(by_id["Heart"].term_id(), "AN:2");

    let by_name = anatomy.find_names_as_map(&["Organ", "heat shield"]).await.unwrap();
    assert_eq!(by_name.len(), 2);
}

#[tokio::test]
async fn test_all_spans_ontologies() {
    let (_dir, service) = uploaded_service().await;
    let all = service.ontology("all").unwrap();

    let roots = all.find_by_ids(&["A", "AN:1", "PR:1"], 100).await.unwrap();
    assert_eq!(roots.len(), 3);
    let ontologies: BTreeSet<&str> = roots.iter().map(|t| t.ontology_id()).collect();
    assert_eq!(ontologies, BTreeSet::from(["anatomy", "proteins", "zoo"]));

    // A name unique across every index still resolves through the aggregate view
    assert!(all.find_by_name("Heart").await.unwrap().is_some());
}

#[tokio::test]
async fn test_ambiguous_id_across_ontologies() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "one.obo", "[Term]\nid: X:1\nname: shared\n");
    write_file(dir.path(), "two.obo", "[Term]\nid: X:1\nname: shared\n");

    let registry = OntologyRegistry {
        version: REGISTRY_VERSION,
        ontologies: BTreeMap::from([
            ("one".to_string(), OntologyEntry::new("One", "one.obo")),
            ("two".to_string(), OntologyEntry::new("Two", "two.obo")),
        ]),
    };
    let config = GenerixConfig::default()
        .with_import_dir(dir.path())
        .with_registry(registry)
        .with_store(StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        });
    let service = OntologyService::from_config(config, ValidatorRegistry::new()).unwrap();
    service.indexer().upload_all().await.unwrap();

    assert!(service.ontology("one").unwrap().find_by_id("X:1").await.unwrap().is_some());
    let err = service.all().find_by_id("X:1").await.unwrap_err();
    assert!(matches!(err, OntologyError::AmbiguousMatch { field: "term_id", .. }));
}

// ============================================================================
// Navigation and Validation Tests
// ============================================================================

#[tokio::test]
async fn test_load_parents_and_children() {
    let (_dir, service) = uploaded_service().await;
    let zoo = service.ontology("zoo").unwrap();

    let dog = zoo.find_by_id("B").await.unwrap().unwrap();
    let parents = dog.load_parents(&service).await.unwrap();
    assert_eq!(parents.len(), 1);
    assert_eq!(parents["Animal"].term_id(), "A");

    let children = dog.load_children(&service).await.unwrap();
    assert_eq!(children.ids(), vec!["C"]);

    let puppy = zoo.find_by_id("C").await.unwrap().unwrap();
    assert!(puppy.load_children(&service).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validator_keys_are_resolved() {
    let (_dir, service) = uploaded_service().await;

    let insulin = service.ontology("proteins").unwrap().find_by_id("PR:2").await.unwrap().unwrap();
    assert_eq!(insulin.validator(), Some("protein_sequence"));
    assert!(insulin.validate("GIVEQCCTSICSLYQLENYCN", service.validators()));
    assert!(!insulin.validate("not a sequence", service.validators()));

    // Terms without a validator accept anything
    assert_eq!(service.validate_term_value("zoo", "A", "###").await.unwrap(), Some(true));
    assert_eq!(service.validate_term_value("proteins", "PR:1", "MKT").await.unwrap(), Some(true));
    assert_eq!(service.validate_term_value("proteins", "PR:1", "12").await.unwrap(), Some(false));
    assert_eq!(service.validate_term_value("zoo", "Z", "x").await.unwrap(), None);
}

#[tokio::test]
async fn test_reupload_replaces_documents() {
    let (dir, service) = uploaded_service().await;
    write_file(
        dir.path(),
        "zoo.obo",
        "[Term]\nid: A\nname: Animal\n\n[Term]\nid: D\nname: Cat\nis_a: A\n",
    );

    let stats = service.indexer().upload("zoo").await.unwrap();
    assert!(stats.dropped_existing);
    assert_eq!(stats.terms_indexed, 2);

    let zoo = service.ontology("zoo").unwrap();
    assert!(zoo.find_by_id("C").await.unwrap().is_none());
    let descendants = zoo.find_by_ancestor_ids(&["A"], 100).await.unwrap();
    assert_eq!(ids(&descendants), set(&["D"]));
}
