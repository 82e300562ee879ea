//! QuadSink trait for event-driven statement consumption
//!
//! Producers emit statements one at a time without knowing the concrete
//! consumer. The standard consumer is [`QuadCollector`], which gathers
//! everything into a [`Dataset`]; a streaming serializer or a store ingest
//! path can implement the trait instead and skip materialization.

use crate::{Dataset, Quad};

/// Event-driven interface for statement consumption
pub trait QuadSink {
    /// Called once per statement, in producer traversal order
    fn quad(&mut self, quad: Quad);
}

/// A sink that collects statements into a [`Dataset`]
#[derive(Debug, Default)]
pub struct QuadCollector {
    dataset: Dataset,
}

impl QuadCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish collecting and return the dataset
    ///
    /// Consumes the collector.
    pub fn finish(self) -> Dataset {
        self.dataset
    }

    /// Get the current dataset (non-consuming)
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl QuadSink for QuadCollector {
    fn quad(&mut self, quad: Quad) {
        self.dataset.add(quad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Term;

    #[test]
    fn test_collector() {
        let mut sink = QuadCollector::new();
        sink.quad(Quad::new(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/p"),
            Term::string("x"),
        ));
        sink.quad(Quad::new(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/p"),
            Term::string("y"),
        ));

        let ds = sink.finish();
        assert_eq!(ds.len(), 2);
        // Insertion order preserved until sorted
        let objects: Vec<_> = ds
            .iter()
            .map(|q| q.o.as_literal().unwrap().0.as_str().unwrap().to_string())
            .collect();
        assert_eq!(objects, vec!["x", "y"]);
    }
}
