//! Ancestor closure over the is_a hierarchy.
//!
//! Each term's full set of ancestors is computed once at index time, so
//! "descendant of X" queries become a set-membership lookup on the stored
//! closure with no graph walk at query time.
//!
//! Closures are memoized per term. A term reached again while its own
//! closure is still being built means the hierarchy has a cycle, which is
//! reported as [`OntologyError::Cycle`].

use crate::models::Term;
use crate::parser::ParsedOntology;
use crate::{OntologyError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Visit {
    Unvisited,
    InProgress,
    Done(Vec<usize>),
}

/// Memoized depth-first ancestor collection over a parsed term arena
pub struct ClosureBuilder<'a> {
    ontology: &'a ParsedOntology,
    visits: Vec<Visit>,
    path: Vec<usize>,
}

impl<'a> ClosureBuilder<'a> {
    pub fn new(ontology: &'a ParsedOntology) -> Self {
        ClosureBuilder {
            ontology,
            visits: vec![Visit::Unvisited; ontology.len()],
            path: Vec::new(),
        }
    }

    /// Ancestor ids of `term_id` in discovery order, or `None` for an unknown id
    pub fn ancestors_of(&mut self, term_id: &str) -> Result<Option<Vec<String>>> {
        let Some(idx) = self.ontology.position(term_id) else {
            return Ok(None);
        };
        let ancestors = self.visit(idx)?;
        Ok(Some(self.ids(&ancestors)))
    }

    fn ids(&self, positions: &[usize]) -> Vec<String> {
        positions
            .iter()
            .map(|&idx| self.ontology.terms[idx].term.term_id().to_string())
            .collect()
    }

    fn visit(&mut self, idx: usize) -> Result<Vec<usize>> {
        match &self.visits[idx] {
            Visit::Done(ancestors) => return Ok(ancestors.clone()),
            Visit::InProgress => return Err(self.cycle_error(idx)),
            Visit::Unvisited => {},
        }

        self.visits[idx] = Visit::InProgress;
        self.path.push(idx);

        let ontology = self.ontology;
        let mut seen = HashSet::new();
        let mut ancestors = Vec::new();
        for &parent in &ontology.terms[idx].parents {
            let inherited = self.visit(parent)?;
            for ancestor in std::iter::once(parent).chain(inherited) {
                if seen.insert(ancestor) {
                    ancestors.push(ancestor);
                }
            }
        }

        self.path.pop();
        self.visits[idx] = Visit::Done(ancestors.clone());
        Ok(ancestors)
    }

    fn cycle_error(&self, repeated: usize) -> OntologyError {
        let start = self
            .path
            .iter()
            .position(|&idx| idx == repeated)
            .unwrap_or_default();
        let mut cycle: Vec<usize> = self.path[start..].to_vec();
        cycle.push(repeated);
        OntologyError::Cycle {
            path: self.ids(&cycle),
        }
    }
}

/// Consume a parsed ontology and return its terms with `parent_path_ids` filled in
pub fn materialize(ontology: ParsedOntology) -> Result<Vec<Term>> {
    let closures = {
        let mut builder = ClosureBuilder::new(&ontology);
        let mut closures = Vec::with_capacity(ontology.len());
        for idx in 0..ontology.len() {
            let ancestors = builder.visit(idx)?;
            closures.push(builder.ids(&ancestors));
        }
        closures
    };

    Ok(ontology
        .terms
        .into_iter()
        .zip(closures)
        .map(|(parsed, ancestors)| parsed.term.with_parent_path_ids(ancestors))
        .collect())
}
