// OBO stanza parser
//
// Only the fields needed for hierarchical lookup are read: `id:`, `name:` and
// `is_a:` inside `[Term]` stanzas. Everything else (headers, synonyms, xrefs,
// `[Typedef]` stanzas, comments) is skipped.

use crate::models::Term;
use crate::{OntologyError, Result};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

/// Line that opens a term stanza
pub const TERM_STANZA: &str = "[Term]";

const ID_PREFIX: &str = "id:";
const NAME_PREFIX: &str = "name:";
const IS_A_PREFIX: &str = "is_a:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Seeking,
    InTerm,
}

/// Fields accumulated for the stanza currently being read
#[derive(Debug, Default)]
struct StanzaBuilder {
    opened_at: usize,
    id: Option<String>,
    name: Option<String>,
    parent_ids: Vec<String>,
}

impl StanzaBuilder {
    fn opened_at(line: usize) -> Self {
        StanzaBuilder {
            opened_at: line,
            ..Default::default()
        }
    }
}

// ============================================================================
// Parsed ontology (term arena)
// ============================================================================

/// A parsed term together with its resolved parent links.
///
/// Parent links are positions in the owning [`ParsedOntology`], never owning
/// references, so terms that share ancestors do not duplicate them.
#[derive(Debug, Clone)]
pub(crate) struct ParsedTerm {
    pub(crate) term: Term,
    pub(crate) parents: Vec<usize>,
}

/// All terms of one OBO file, in file order, with parents resolved
#[derive(Debug, Clone)]
pub struct ParsedOntology {
    ontology_id: String,
    pub(crate) terms: Vec<ParsedTerm>,
    positions: HashMap<String, usize>,
}

impl ParsedOntology {
    pub fn ontology_id(&self) -> &str {
        &self.ontology_id
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, term_id: &str) -> Option<&Term> {
        self.position(term_id).map(|idx| &self.terms[idx].term)
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter().map(|parsed| &parsed.term)
    }

    /// Direct parents of `term_id`, following the resolved links
    pub fn parents_of(&self, term_id: &str) -> Vec<&Term> {
        self.position(term_id)
            .map(|idx| {
                self.terms[idx]
                    .parents
                    .iter()
                    .map(|&parent| &self.terms[parent].term)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn root_count(&self) -> usize {
        self.terms.iter().filter(|parsed| parsed.term.is_root()).count()
    }

    pub(crate) fn position(&self, term_id: &str) -> Option<usize> {
        self.positions.get(term_id).copied()
    }

    /// Turn declared parent ids into arena positions.
    fn resolve_parents(&mut self) -> Result<()> {
        for idx in 0..self.terms.len() {
            let mut resolved = Vec::with_capacity(self.terms[idx].term.parent_ids().len());
            for parent_id in self.terms[idx].term.parent_ids() {
                let parent = self.positions.get(parent_id).copied().ok_or_else(|| {
                    OntologyError::UnknownParent {
                        term_id: self.terms[idx].term.term_id().to_string(),
                        parent_id: parent_id.clone(),
                    }
                })?;
                resolved.push(parent);
            }
            self.terms[idx].parents = resolved;
        }
        Ok(())
    }
}

// ============================================================================
// OBO Parser
// ============================================================================

pub struct OboParser {
    ontology_id: String,
    validator: Option<String>,
}

impl OboParser {
    pub fn new(ontology_id: impl Into<String>) -> Self {
        OboParser {
            ontology_id: ontology_id.into(),
            validator: None,
        }
    }

    /// Stamp every parsed term with this validator key
    pub fn with_validator(mut self, validator: Option<String>) -> Self {
        self.validator = validator;
        self
    }

    pub fn parse(&self, content: &str) -> Result<ParsedOntology> {
        self.parse_lines(content.lines().map(|line| Ok(line.to_string())))
    }

    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<ParsedOntology> {
        self.parse_lines(reader.lines().map(|line| line.map_err(OntologyError::from)))
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedOntology> {
        info!(path = %path.display(), ontology_id = %self.ontology_id, "Parsing OBO file");
        let file = std::fs::File::open(path)?;
        self.parse_reader(std::io::BufReader::new(file))
    }

    fn parse_lines<I>(&self, lines: I) -> Result<ParsedOntology>
    where
        I: Iterator<Item = Result<String>>,
    {
        let mut ontology = ParsedOntology {
            ontology_id: self.ontology_id.clone(),
            terms: Vec::new(),
            positions: HashMap::new(),
        };

        let mut state = ParseState::Seeking;
        let mut stanza = StanzaBuilder::default();

        for (idx, line) in lines.enumerate() {
            let line_number = idx + 1;
            let raw = line?;
            let line = raw.trim();

            match state {
                ParseState::Seeking => {
                    if line.starts_with(TERM_STANZA) {
                        stanza = StanzaBuilder::opened_at(line_number);
                        state = ParseState::InTerm;
                    }
                },
                ParseState::InTerm => {
                    if line.is_empty() {
                        self.finish(&mut ontology, std::mem::take(&mut stanza))?;
                        state = ParseState::Seeking;
                    } else if line.starts_with('[') {
                        // A new stanza header closes the open term even without a blank line
                        self.finish(&mut ontology, std::mem::take(&mut stanza))?;
                        if line.starts_with(TERM_STANZA) {
                            stanza = StanzaBuilder::opened_at(line_number);
                        } else {
                            state = ParseState::Seeking;
                        }
                    } else if let Some(value) = line.strip_prefix(ID_PREFIX) {
                        stanza.id = Some(value.trim().to_string());
                    } else if let Some(value) = line.strip_prefix(NAME_PREFIX) {
                        stanza.name = Some(value.trim().to_string());
                    } else if let Some(value) = line.strip_prefix(IS_A_PREFIX) {
                        // "is_a: GO:0008150 ! biological_process" -> "GO:0008150"
                        let parent_id = value.split_whitespace().next().ok_or_else(|| {
                            OntologyError::parse(line_number, "is_a without a parent id")
                        })?;
                        stanza.parent_ids.push(parent_id.to_string());
                    }
                },
            }
        }

        if state == ParseState::InTerm {
            debug!("Closing term stanza left open at end of input");
            self.finish(&mut ontology, stanza)?;
        }

        ontology.resolve_parents()?;

        info!(
            ontology_id = %ontology.ontology_id,
            terms = ontology.len(),
            roots = ontology.root_count(),
            "Parsed OBO terms"
        );

        Ok(ontology)
    }

    fn finish(&self, ontology: &mut ParsedOntology, stanza: StanzaBuilder) -> Result<()> {
        let term_id = stanza
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OntologyError::parse(stanza.opened_at, "term stanza without an id"))?;

        let term_name = stanza.name.unwrap_or_else(|| {
            warn!(term_id = %term_id, "Term has no name");
            String::new()
        });

        let term = Term::new(&self.ontology_id, term_id, term_name, stanza.parent_ids)
            .with_validator(self.validator.clone());

        match ontology.positions.get(term.term_id()).copied() {
            Some(existing) => {
                warn!(term_id = %term.term_id(), "Duplicate term id, keeping the later stanza");
                ontology.terms[existing] = ParsedTerm {
                    term,
                    parents: Vec::new(),
                };
            },
            None => {
                ontology
                    .positions
                    .insert(term.term_id().to_string(), ontology.terms.len());
                ontology.terms.push(ParsedTerm {
                    term,
                    parents: Vec::new(),
                });
            },
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
