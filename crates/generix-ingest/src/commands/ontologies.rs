//! Ontologies command implementation

use generix_ontology::{GenerixConfig, OntologyRegistry};

/// Text listing of the registry, one ontology per line
pub fn render(registry: &OntologyRegistry, config: &GenerixConfig) -> String {
    let width = registry.ids().map(str::len).max().unwrap_or(0);

    let mut out = String::new();
    for (id, entry) in registry.iter() {
        out.push_str(&format!(
            "{:width$}  {}  ({}){}\n",
            id,
            entry.name,
            config.source_path(entry).display(),
            entry
                .validator
                .as_deref()
                .map(|key| format!("  validator={}", key))
                .unwrap_or_default(),
            width = width
        ));
    }
    out
}

pub fn run(config: &GenerixConfig) {
    print!("{}", render(&config.registry, config));
}
