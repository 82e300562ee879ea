//! Quads and datasets
//!
//! A [`Quad`] is an RDF statement with an optional graph name; `graph: None`
//! means the default graph. A [`Dataset`] is an ordered collection of quads
//! that preserves insertion order until explicitly sorted.

use crate::Term;
use serde::{Deserialize, Serialize};

/// A single RDF statement
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    /// Subject (IRI or blank node)
    pub s: Term,
    /// Predicate (always IRI)
    pub p: Term,
    /// Object (any term)
    pub o: Term,
    /// Graph name (None for the default graph)
    pub g: Option<Term>,
}

impl Quad {
    /// Create a statement in the default graph
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o, g: None }
    }

    /// Create a statement in a named graph
    pub fn in_graph(s: Term, p: Term, o: Term, g: Term) -> Self {
        Self { s, p, o, g: Some(g) }
    }

    /// Check whether this statement is in the default graph
    pub fn is_default_graph(&self) -> bool {
        self.g.is_none()
    }
}

impl std::fmt::Display for Quad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.g {
            Some(g) => write!(f, "{} {} {} {} .", self.s, self.p, self.o, g),
            None => write!(f, "{} {} {} .", self.s, self.p, self.o),
        }
    }
}

/// An ordered collection of quads
///
/// Insertion order is preserved; `sort()` establishes the total term order
/// (graph, then subject, predicate, object) for deterministic output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    quads: Vec<Quad>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quad
    pub fn add(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    /// Number of quads
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Iterate over the quads in their current order
    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Sort by (graph, subject, predicate, object) and drop duplicates
    pub fn sort(&mut self) {
        self.quads
            .sort_by(|a, b| (&a.g, &a.s, &a.p, &a.o).cmp(&(&b.g, &b.s, &b.p, &b.o)));
        self.quads.dedup();
    }

    /// Consume the dataset and return the underlying quads
    pub fn into_quads(self) -> Vec<Quad> {
        self.quads
    }

    /// Borrow the underlying quads
    pub fn as_slice(&self) -> &[Quad] {
        &self.quads
    }
}

impl From<Vec<Quad>> for Dataset {
    fn from(quads: Vec<Quad>) -> Self {
        Self { quads }
    }
}

impl IntoIterator for Dataset {
    type Item = Quad;
    type IntoIter = std::vec::IntoIter<Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_display() {
        let q = Quad::new(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/b"),
            Term::string("c"),
        );
        assert_eq!(
            q.to_string(),
            "<http://example.org/a> <http://example.org/b> \"c\" ."
        );

        let named = Quad::in_graph(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/b"),
            Term::string("c"),
            Term::iri("http://example.org/g"),
        );
        assert!(named.to_string().ends_with("<http://example.org/g> ."));
    }

    #[test]
    fn test_dataset_sort_dedup() {
        let mut ds = Dataset::new();
        let q = Quad::new(
            Term::iri("http://example.org/b"),
            Term::iri("http://example.org/p"),
            Term::integer(1),
        );
        ds.add(q.clone());
        ds.add(Quad::new(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/p"),
            Term::integer(2),
        ));
        ds.add(q);
        ds.sort();

        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.iter().next().unwrap().s.as_iri(),
            Some("http://example.org/a")
        );
    }

    #[test]
    fn test_default_graph_sorts_first() {
        let mut ds = Dataset::new();
        ds.add(Quad::in_graph(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/p"),
            Term::integer(1),
            Term::iri("http://example.org/g"),
        ));
        ds.add(Quad::new(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/p"),
            Term::integer(2),
        ));
        ds.sort();

        assert!(ds.iter().next().unwrap().is_default_graph());
    }
}
