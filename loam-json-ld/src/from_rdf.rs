//! Statement to expanded document conversion
//!
//! Groups quads by graph and subject and rebuilds expanded node objects.
//! `rdf:first` / `rdf:rest` chains are stitched back into `@list` arrays,
//! recognized literal datatypes come back as native JSON values, and each
//! named graph nests under the `@graph` key of a default-graph node naming
//! it. Subjects come out sorted, blank nodes first.

use crate::error::{JsonLdError, Result};
use crate::value::term_to_value;
use loam_graph_ir::Quad;
use loam_vocab::rdf;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};

const DEFAULT_GRAPH: &str = "";

#[derive(Default)]
struct GraphAccumulator {
    nodes: BTreeMap<String, Map<String, JsonValue>>,
    lists: HashMap<String, ListEntry>,
}

/// Partial state of one list cell while scanning
#[derive(Default)]
struct ListEntry {
    first: Option<JsonValue>,
    rest: Option<String>,
    head: Option<HeadRef>,
}

/// Where a list head was referenced from
struct HeadRef {
    subject: String,
    predicate: String,
    index: usize,
}

/// Convert quads to an expanded document
pub(crate) fn from_quads(quads: &[Quad], use_rdf_type: bool) -> Result<JsonValue> {
    let mut graphs: BTreeMap<String, GraphAccumulator> = BTreeMap::new();
    graphs.insert(DEFAULT_GRAPH.to_string(), GraphAccumulator::default());

    for quad in quads {
        let graph_key = match &quad.g {
            Some(g) => g.node_key().ok_or_else(|| JsonLdError::Processing {
                message: format!("invalid graph name: {}", g),
            })?,
            None => DEFAULT_GRAPH.to_string(),
        };

        // Every named graph gets a node of its own in the default graph
        if graph_key != DEFAULT_GRAPH {
            if let Some(default) = graphs.get_mut(DEFAULT_GRAPH) {
                default
                    .nodes
                    .entry(graph_key.clone())
                    .or_insert_with(|| id_node(&graph_key));
            }
        }
        let graph = graphs.entry(graph_key).or_default();

        let subject = quad.s.node_key().ok_or_else(|| JsonLdError::Processing {
            message: format!("invalid subject: {}", quad.s),
        })?;
        let predicate = quad.p.as_iri().ok_or_else(|| JsonLdError::Processing {
            message: format!("invalid predicate: {}", quad.p),
        })?;

        // List cells are held back and stitched in afterwards
        if predicate == rdf::FIRST {
            graph.lists.entry(subject).or_default().first =
                Some(term_to_value(&quad.o).to_json());
            continue;
        }
        if predicate == rdf::REST {
            if let Some(id) = quad.o.as_blank() {
                graph.lists.entry(subject).or_default().rest = Some(id.to_ntriples());
            }
            continue;
        }

        let node = graph
            .nodes
            .entry(subject.clone())
            .or_insert_with(|| id_node(&subject));

        if predicate == rdf::TYPE && !use_rdf_type {
            if let Some(key) = quad.o.node_key() {
                push_value(node, "@type", JsonValue::String(key));
                continue;
            }
        }

        let object = if quad.o.as_iri() == Some(rdf::NIL) {
            // A bare rdf:nil object is an empty list
            let mut obj = Map::new();
            obj.insert("@list".to_string(), JsonValue::Array(vec![]));
            JsonValue::Object(obj)
        } else {
            term_to_value(&quad.o).to_json()
        };

        let index = push_value(node, predicate, object);

        // A blank object may turn out to be a list head
        if let Some(id) = quad.o.as_blank() {
            graph
                .lists
                .entry(id.to_ntriples())
                .or_default()
                .head = Some(HeadRef {
                subject: subject.clone(),
                predicate: predicate.to_string(),
                index,
            });
        }
    }

    for graph in graphs.values_mut() {
        stitch_lists(graph)?;
    }

    // Named graphs nest under their default-graph nodes
    let mut named: Vec<(String, GraphAccumulator)> = Vec::new();
    let mut default = GraphAccumulator::default();
    for (name, graph) in graphs {
        if name == DEFAULT_GRAPH {
            default = graph;
        } else {
            named.push((name, graph));
        }
    }
    for (name, graph) in named {
        if let Some(node) = default.nodes.get_mut(&name) {
            node.insert(
                "@graph".to_string(),
                JsonValue::Array(graph.nodes.into_values().map(JsonValue::Object).collect()),
            );
        }
    }

    Ok(JsonValue::Array(
        default.nodes.into_values().map(JsonValue::Object).collect(),
    ))
}

fn id_node(id: &str) -> Map<String, JsonValue> {
    let mut node = Map::new();
    node.insert("@id".to_string(), JsonValue::String(id.to_string()));
    node
}

/// Append a value to a node property array, returning its index
fn push_value(node: &mut Map<String, JsonValue>, key: &str, value: JsonValue) -> usize {
    let slot = node
        .entry(key.to_string())
        .or_insert_with(|| JsonValue::Array(Vec::new()));
    match slot {
        JsonValue::Array(arr) => {
            arr.push(value);
            arr.len() - 1
        }
        _ => 0,
    }
}

/// Replace referenced list heads with their stitched `@list` arrays
fn stitch_lists(graph: &mut GraphAccumulator) -> Result<()> {
    let heads: Vec<String> = graph
        .lists
        .iter()
        .filter(|(_, entry)| entry.head.is_some() && entry.first.is_some())
        .map(|(label, _)| label.clone())
        .collect();

    for label in heads {
        let mut items = Vec::new();
        let mut current = label.clone();
        let mut cells = 0usize;
        loop {
            let entry = graph
                .lists
                .get(&current)
                .ok_or_else(|| JsonLdError::ListMissingFirst {
                    node: current.clone(),
                })?;
            let first = entry
                .first
                .clone()
                .ok_or_else(|| JsonLdError::ListMissingFirst {
                    node: current.clone(),
                })?;
            items.push(first);

            // A well-formed chain visits each cell at most once
            cells += 1;
            if cells > graph.lists.len() {
                return Err(JsonLdError::Processing {
                    message: format!("list chain cycle at {}", current),
                });
            }
            match &entry.rest {
                Some(next) => current = next.clone(),
                None => break,
            }
        }

        let head = graph
            .lists
            .get(&label)
            .and_then(|e| e.head.as_ref())
            .ok_or_else(|| JsonLdError::Processing {
                message: format!("list head lost: {}", label),
            })?;
        let (subject, predicate, index) =
            (head.subject.clone(), head.predicate.clone(), head.index);

        if let Some(node) = graph.nodes.get_mut(&subject) {
            if let Some(JsonValue::Array(values)) = node.get_mut(&predicate) {
                if let Some(slot) = values.get_mut(index) {
                    let mut obj = Map::new();
                    obj.insert("@list".to_string(), JsonValue::Array(items));
                    *slot = JsonValue::Object(obj);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_graph_ir::{Datatype, Term};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn iri(s: &str) -> Term {
        Term::iri(s)
    }

    #[test]
    fn test_simple_statement() {
        let quads = vec![Quad::new(
            iri("http://example.org/a"),
            iri("http://schema.org/name"),
            Term::string("Gregg"),
        )];
        assert_eq!(
            from_quads(&quads, false).unwrap(),
            json!([{
                "@id": "http://example.org/a",
                "http://schema.org/name": [{"@value": "Gregg"}]
            }])
        );
    }

    #[test]
    fn test_literal_coercions() {
        let quads = vec![
            Quad::new(iri("http://example.org/a"), iri("http://example.org/i"), Term::integer(42)),
            Quad::new(iri("http://example.org/a"), iri("http://example.org/b"), Term::boolean(true)),
            Quad::new(iri("http://example.org/a"), iri("http://example.org/d"), Term::double(1.5)),
            Quad::new(
                iri("http://example.org/a"),
                iri("http://example.org/dec"),
                Term::typed("2.5", Datatype::xsd_decimal()),
            ),
            Quad::new(
                iri("http://example.org/a"),
                iri("http://example.org/l"),
                Term::lang_string("bonjour", "fr"),
            ),
        ];
        assert_eq!(
            from_quads(&quads, false).unwrap(),
            json!([{
                "@id": "http://example.org/a",
                "http://example.org/i": [42],
                "http://example.org/b": [true],
                "http://example.org/d": [1.5],
                "http://example.org/dec": [{
                    "@value": "2.5",
                    "@type": "http://www.w3.org/2001/XMLSchema#decimal"
                }],
                "http://example.org/l": [{"@value": "bonjour", "@language": "fr"}]
            }])
        );
    }

    #[test]
    fn test_type_statements_group() {
        let quads = vec![
            Quad::new(
                iri("http://example.org/a"),
                iri(rdf::TYPE),
                iri("http://schema.org/Person"),
            ),
            Quad::new(
                iri("http://example.org/a"),
                iri(rdf::TYPE),
                iri("http://schema.org/Employee"),
            ),
        ];
        assert_eq!(
            from_quads(&quads, false).unwrap(),
            json!([{
                "@id": "http://example.org/a",
                "@type": ["http://schema.org/Person", "http://schema.org/Employee"]
            }])
        );
    }

    #[test]
    fn test_use_rdf_type_keeps_predicate() {
        let quads = vec![Quad::new(
            iri("http://example.org/a"),
            iri(rdf::TYPE),
            iri("http://schema.org/Person"),
        )];
        assert_eq!(
            from_quads(&quads, true).unwrap(),
            json!([{
                "@id": "http://example.org/a",
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#type": [
                    {"@id": "http://schema.org/Person"}
                ]
            }])
        );
    }

    #[test]
    fn test_list_stitching() {
        let quads = vec![
            Quad::new(iri("http://example.org/a"), iri("http://example.org/p"), Term::blank("t0")),
            Quad::new(Term::blank("t0"), iri(rdf::FIRST), Term::string("x")),
            Quad::new(Term::blank("t0"), iri(rdf::REST), Term::blank("t1")),
            Quad::new(Term::blank("t1"), iri(rdf::FIRST), Term::string("y")),
            Quad::new(Term::blank("t1"), iri(rdf::REST), iri(rdf::NIL)),
        ];
        assert_eq!(
            from_quads(&quads, false).unwrap(),
            json!([{
                "@id": "http://example.org/a",
                "http://example.org/p": [{"@list": [{"@value": "x"}, {"@value": "y"}]}]
            }])
        );
    }

    #[test]
    fn test_single_element_list() {
        let quads = vec![
            Quad::new(iri("http://example.org/a"), iri("http://example.org/p"), Term::blank("t0")),
            Quad::new(Term::blank("t0"), iri(rdf::FIRST), Term::integer(1)),
            Quad::new(Term::blank("t0"), iri(rdf::REST), iri(rdf::NIL)),
        ];
        assert_eq!(
            from_quads(&quads, false).unwrap(),
            json!([{
                "@id": "http://example.org/a",
                "http://example.org/p": [{"@list": [1]}]
            }])
        );
    }

    #[test]
    fn test_bare_nil_is_empty_list() {
        let quads = vec![Quad::new(
            iri("http://example.org/a"),
            iri("http://example.org/p"),
            iri(rdf::NIL),
        )];
        assert_eq!(
            from_quads(&quads, false).unwrap(),
            json!([{
                "@id": "http://example.org/a",
                "http://example.org/p": [{"@list": []}]
            }])
        );
    }

    #[test]
    fn test_broken_chain_is_an_error() {
        let quads = vec![
            Quad::new(iri("http://example.org/a"), iri("http://example.org/p"), Term::blank("t0")),
            Quad::new(Term::blank("t0"), iri(rdf::FIRST), Term::string("x")),
            Quad::new(Term::blank("t0"), iri(rdf::REST), Term::blank("t1")),
        ];
        let err = from_quads(&quads, false).unwrap_err();
        assert!(matches!(err, JsonLdError::ListMissingFirst { .. }));
    }

    #[test]
    fn test_cyclic_chain_is_an_error() {
        let quads = vec![
            Quad::new(iri("http://example.org/a"), iri("http://example.org/p"), Term::blank("t0")),
            Quad::new(Term::blank("t0"), iri(rdf::FIRST), Term::string("x")),
            Quad::new(Term::blank("t0"), iri(rdf::REST), Term::blank("t1")),
            Quad::new(Term::blank("t1"), iri(rdf::FIRST), Term::string("y")),
            Quad::new(Term::blank("t1"), iri(rdf::REST), Term::blank("t0")),
        ];
        let err = from_quads(&quads, false).unwrap_err();
        assert!(matches!(err, JsonLdError::Processing { .. }));
    }

    #[test]
    fn test_named_graphs_nest() {
        let quads = vec![
            Quad::in_graph(
                iri("http://example.org/a"),
                iri("http://example.org/p"),
                Term::string("x"),
                iri("http://example.org/g1"),
            ),
            Quad::new(
                iri("http://example.org/b"),
                iri("http://example.org/p"),
                Term::string("y"),
            ),
        ];
        assert_eq!(
            from_quads(&quads, false).unwrap(),
            json!([
                {
                    "@id": "http://example.org/b",
                    "http://example.org/p": [{"@value": "y"}]
                },
                {
                    "@id": "http://example.org/g1",
                    "@graph": [{
                        "@id": "http://example.org/a",
                        "http://example.org/p": [{"@value": "x"}]
                    }]
                }
            ])
        );
    }

    #[test]
    fn test_subjects_sorted_blank_nodes_first() {
        let quads = vec![
            Quad::new(iri("http://example.org/z"), iri("http://example.org/p"), Term::string("z")),
            Quad::new(Term::blank("t0"), iri("http://example.org/p"), Term::string("b")),
            Quad::new(iri("http://example.org/a"), iri("http://example.org/p"), Term::string("a")),
        ];
        let result = from_quads(&quads, false).unwrap();
        let ids: Vec<&str> = result
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n.get("@id").and_then(|v| v.as_str()).unwrap_or(""))
            .collect();
        assert_eq!(ids, vec!["_:t0", "http://example.org/a", "http://example.org/z"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(from_quads(&[], false).unwrap(), json!([]));
    }
}
