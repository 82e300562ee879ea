//! Expanded document to statement conversion
//!
//! Walks an expanded document and emits one [`Quad`] per statement, in
//! document traversal order. Lists become `rdf:first` / `rdf:rest` chains
//! of fresh blank nodes, with the linking statement emitted before the
//! chain; an empty list links straight to `rdf:nil`. Nodes carrying
//! `@graph` put their children's statements into the named graph.
//!
//! Blank node labels found in the document (`_:` identifiers) are remapped
//! through the run's namer, the same allocator that labels anonymous nodes
//! and list cells. Every label in the output therefore comes from one
//! counter, so a document label can never collide with a fresh one.

use crate::error::{JsonLdError, Result};
use crate::keyword::Keyword;
use crate::value::ValueObject;
use loam_graph_ir::{BlankId, BlankNodeNamer, Datatype, LiteralValue, Quad, QuadSink, Term};
use loam_vocab::rdf;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Emit statements for an expanded document
pub(crate) fn emit(
    expanded: &JsonValue,
    sink: &mut dyn QuadSink,
    namer: &mut BlankNodeNamer,
) -> Result<()> {
    let mut emitter = Emitter {
        sink,
        namer,
        labels: HashMap::new(),
    };
    match expanded {
        JsonValue::Array(nodes) => {
            for node in nodes {
                emitter.node(as_node(node)?, None)?;
            }
            Ok(())
        }
        JsonValue::Object(map) => {
            emitter.node(map, None)?;
            Ok(())
        }
        other => Err(JsonLdError::Processing {
            message: format!("cannot convert to statements: {}", other),
        }),
    }
}

fn as_node(value: &JsonValue) -> Result<&Map<String, JsonValue>> {
    value.as_object().ok_or_else(|| JsonLdError::Processing {
        message: format!("expected a node object, got: {}", value),
    })
}

/// One conversion run: the sink, the label allocator, and the mapping from
/// document blank labels to allocated ones
struct Emitter<'a> {
    sink: &'a mut dyn QuadSink,
    namer: &'a mut BlankNodeNamer,
    labels: HashMap<String, BlankId>,
}

impl Emitter<'_> {
    /// Emit one node's statements and return its subject term
    fn node(&mut self, map: &Map<String, JsonValue>, graph: Option<&Term>) -> Result<Term> {
        let subject = match map.get(Keyword::Id.as_str()) {
            Some(JsonValue::String(id)) => self.node_term(id),
            Some(other) => {
                return Err(JsonLdError::Processing {
                    message: format!("@id must be a string, got: {}", other),
                })
            }
            None => Term::BlankNode(self.namer.next_id()),
        };

        for (key, value) in map.iter() {
            match key.as_str() {
                "@id" => continue,

                "@type" => {
                    let types = value.as_array().ok_or_else(|| JsonLdError::Processing {
                        message: format!("@type must be an array, got: {}", value),
                    })?;
                    for t in types {
                        let iri = t.as_str().ok_or_else(|| JsonLdError::Processing {
                            message: format!("invalid @type value: {}", t),
                        })?;
                        self.sink.quad(quad(
                            subject.clone(),
                            Term::iri(rdf::TYPE),
                            Term::iri(iri),
                            graph,
                        ));
                    }
                }

                "@graph" => {
                    let nodes = value.as_array().ok_or_else(|| JsonLdError::Processing {
                        message: format!("@graph must be an array, got: {}", value),
                    })?;
                    for node in nodes {
                        self.node(as_node(node)?, Some(&subject))?;
                    }
                }

                key if key.starts_with('@') => continue,

                predicate => {
                    let p = Term::iri(predicate);
                    let items: Vec<&JsonValue> = match value {
                        JsonValue::Array(arr) => arr.iter().collect(),
                        single => vec![single],
                    };
                    for item in items {
                        match ValueObject::from_expanded(item)? {
                            Some(ValueObject::List(entries)) => {
                                self.list(&subject, &p, &entries, graph)?;
                            }
                            Some(value) => {
                                let object = self.value_term(&value)?;
                                self.sink.quad(quad(subject.clone(), p.clone(), object, graph));
                            }
                            None => {
                                let object = self.node(as_node(item)?, graph)?;
                                self.sink.quad(quad(subject.clone(), p.clone(), object, graph));
                            }
                        }
                    }
                }
            }
        }

        Ok(subject)
    }

    /// Emit a list as an `rdf:first` / `rdf:rest` chain
    fn list(
        &mut self,
        subject: &Term,
        predicate: &Term,
        entries: &[ValueObject],
        graph: Option<&Term>,
    ) -> Result<()> {
        if entries.is_empty() {
            self.sink.quad(quad(
                subject.clone(),
                predicate.clone(),
                Term::iri(rdf::NIL),
                graph,
            ));
            return Ok(());
        }

        let head = Term::BlankNode(self.namer.next_id());
        self.sink
            .quad(quad(subject.clone(), predicate.clone(), head.clone(), graph));

        let mut current = head;
        for (i, entry) in entries.iter().enumerate() {
            let first = self.value_term(entry)?;
            self.sink
                .quad(quad(current.clone(), Term::iri(rdf::FIRST), first, graph));

            let rest = if i + 1 == entries.len() {
                Term::iri(rdf::NIL)
            } else {
                Term::BlankNode(self.namer.next_id())
            };
            self.sink
                .quad(quad(current, Term::iri(rdf::REST), rest.clone(), graph));
            current = rest;
        }
        Ok(())
    }

    /// An IRI or blank node term from an identifier string
    fn node_term(&mut self, id: &str) -> Term {
        match id.strip_prefix("_:") {
            Some(label) => Term::BlankNode(self.remap(label)),
            None => Term::iri(id),
        }
    }

    /// Allocated label for a document blank label, stable within the run
    fn remap(&mut self, label: &str) -> BlankId {
        if let Some(id) = self.labels.get(label) {
            return id.clone();
        }
        let id = self.namer.next_id();
        self.labels.insert(label.to_string(), id.clone());
        id
    }

    /// Convert a non-list value object to its object term
    fn value_term(&mut self, value: &ValueObject) -> Result<Term> {
        match value {
            ValueObject::IdRef(id) => Ok(self.node_term(id)),

            ValueObject::Literal {
                value,
                type_,
                language,
            } => {
                if let Some(lang) = language {
                    let s = value.as_str().ok_or_else(|| JsonLdError::Processing {
                        message: format!("language-tagged value must be a string: {}", value),
                    })?;
                    return Ok(Term::lang_string(s, lang));
                }

                if let Some(t) = type_ {
                    let datatype = Datatype::iri(t);
                    return Ok(match value {
                        JsonValue::String(s) => Term::typed(s, datatype),
                        other => Term::Literal {
                            value: native_literal(other)?,
                            datatype,
                            language: None,
                        },
                    });
                }

                Ok(match value {
                    JsonValue::String(s) => Term::string(s),
                    JsonValue::Bool(b) => Term::boolean(*b),
                    JsonValue::Number(n) => match n.as_i64() {
                        Some(i) => Term::integer(i),
                        None => Term::double(n.as_f64().unwrap_or(f64::NAN)),
                    },
                    other => {
                        return Err(JsonLdError::Processing {
                            message: format!("cannot convert value to a literal: {}", other),
                        })
                    }
                })
            }

            ValueObject::List(_) => Err(JsonLdError::ListOfLists),
        }
    }
}

fn quad(s: Term, p: Term, o: Term, graph: Option<&Term>) -> Quad {
    match graph {
        Some(g) => Quad::in_graph(s, p, o, g.clone()),
        None => Quad::new(s, p, o),
    }
}

fn native_literal(value: &JsonValue) -> Result<LiteralValue> {
    match value {
        JsonValue::Bool(b) => Ok(LiteralValue::Boolean(*b)),
        JsonValue::Number(n) => Ok(match n.as_i64() {
            Some(i) => LiteralValue::Integer(i),
            None => LiteralValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        }),
        JsonValue::String(s) => Ok(LiteralValue::String(Arc::from(s.as_str()))),
        other => Err(JsonLdError::Processing {
            message: format!("cannot convert value to a literal: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_graph_ir::QuadCollector;
    use serde_json::json;

    fn run(expanded: JsonValue) -> Vec<String> {
        let mut sink = QuadCollector::new();
        let mut namer = BlankNodeNamer::default();
        emit(&expanded, &mut sink, &mut namer).unwrap();
        sink.finish().iter().map(|q| q.to_string()).collect()
    }

    #[test]
    fn test_simple_statement() {
        let quads = run(json!({
            "@id": "http://example.org/a",
            "http://schema.org/name": [{"@value": "Gregg"}]
        }));
        assert_eq!(
            quads,
            vec!["<http://example.org/a> <http://schema.org/name> \"Gregg\" ."]
        );
    }

    #[test]
    fn test_type_statement() {
        let quads = run(json!({
            "@id": "http://example.org/a",
            "@type": ["http://schema.org/Person"]
        }));
        assert_eq!(
            quads,
            vec![
                "<http://example.org/a> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> ."
            ]
        );
    }

    #[test]
    fn test_typed_and_native_literals() {
        let quads = run(json!({
            "@id": "http://example.org/a",
            "http://example.org/age": [42],
            "http://example.org/height": [1.5],
            "http://example.org/alive": [true],
            "http://example.org/born": [{
                "@value": "1970-01-01",
                "@type": "http://www.w3.org/2001/XMLSchema#date"
            }]
        }));
        assert_eq!(
            quads,
            vec![
                "<http://example.org/a> <http://example.org/age> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> .",
                "<http://example.org/a> <http://example.org/height> \"1.5\"^^<http://www.w3.org/2001/XMLSchema#double> .",
                "<http://example.org/a> <http://example.org/alive> \"true\"^^<http://www.w3.org/2001/XMLSchema#boolean> .",
                "<http://example.org/a> <http://example.org/born> \"1970-01-01\"^^<http://www.w3.org/2001/XMLSchema#date> .",
            ]
        );
    }

    #[test]
    fn test_language_literal() {
        let quads = run(json!({
            "@id": "http://example.org/a",
            "http://example.org/label": [{"@value": "bonjour", "@language": "fr"}]
        }));
        assert_eq!(
            quads,
            vec!["<http://example.org/a> <http://example.org/label> \"bonjour\"@fr ."]
        );
    }

    #[test]
    fn test_anonymous_subject_gets_blank_node() {
        let quads = run(json!({"http://example.org/p": [{"@value": "x"}]}));
        assert_eq!(quads, vec!["_:t0 <http://example.org/p> \"x\" ."]);
    }

    #[test]
    fn test_embedded_node() {
        let quads = run(json!({
            "@id": "http://example.org/a",
            "http://xmlns.com/foaf/0.1/knows": [{
                "@id": "http://example.org/b",
                "http://schema.org/name": [{"@value": "B"}]
            }]
        }));
        // The embedded node's statements come out first
        assert_eq!(
            quads,
            vec![
                "<http://example.org/b> <http://schema.org/name> \"B\" .",
                "<http://example.org/a> <http://xmlns.com/foaf/0.1/knows> <http://example.org/b> .",
            ]
        );
    }

    #[test]
    fn test_list_chain() {
        let quads = run(json!({
            "@id": "http://example.org/a",
            "http://example.org/p": [{"@list": [{"@value": "x"}, {"@value": "y"}]}]
        }));
        assert_eq!(
            quads,
            vec![
                "<http://example.org/a> <http://example.org/p> _:t0 .",
                "_:t0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> \"x\" .",
                "_:t0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> _:t1 .",
                "_:t1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> \"y\" .",
                "_:t1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> .",
            ]
        );
    }

    #[test]
    fn test_empty_list_links_to_nil() {
        let quads = run(json!({
            "@id": "http://example.org/a",
            "http://example.org/p": [{"@list": []}]
        }));
        assert_eq!(
            quads,
            vec![
                "<http://example.org/a> <http://example.org/p> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil> ."
            ]
        );
    }

    #[test]
    fn test_named_graph() {
        let quads = run(json!({
            "@id": "http://example.org/g1",
            "@graph": [{
                "@id": "http://example.org/a",
                "http://example.org/p": [{"@value": "x"}]
            }]
        }));
        assert_eq!(
            quads,
            vec!["<http://example.org/a> <http://example.org/p> \"x\" <http://example.org/g1> ."]
        );
    }

    #[test]
    fn test_document_blank_labels_remapped() {
        // References to the same document label resolve to the same node
        let quads = run(json!({
            "@id": "_:b1",
            "http://example.org/p": [{"@id": "_:b2"}, {"@id": "_:b1"}]
        }));
        assert_eq!(
            quads,
            vec![
                "_:t0 <http://example.org/p> _:t1 .",
                "_:t0 <http://example.org/p> _:t0 .",
            ]
        );
    }

    #[test]
    fn test_document_labels_disjoint_from_fresh_ones() {
        // A document label spelled like an allocated one must not capture
        // the anonymous node's statements
        let quads = run(json!([
            {"@id": "_:t1", "http://example.org/p": [{"@value": "labeled"}]},
            {"http://example.org/q": [{"@value": "anonymous"}]}
        ]));
        assert_eq!(
            quads,
            vec![
                "_:t0 <http://example.org/p> \"labeled\" .",
                "_:t1 <http://example.org/q> \"anonymous\" .",
            ]
        );
    }
}
