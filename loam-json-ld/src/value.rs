//! Expanded value objects
//!
//! [`ValueObject`] is the shape of one expanded property value: an IRI
//! reference, a literal, or a list of the first two. It sits between the
//! document algorithms and the statement converters so both directions share
//! the same construction-time checks (no `@language` alongside `@type`, no
//! nested lists).

use crate::error::{JsonLdError, Result};
use crate::keyword::Keyword;
use loam_graph_ir::Term;
use loam_vocab::xsd;
use serde_json::{Map, Value as JsonValue};

/// One expanded property value
#[derive(Debug, Clone, PartialEq)]
pub enum ValueObject {
    /// A reference to a node: `{"@id": "..."}` with nothing else
    IdRef(String),
    /// A literal value, optionally typed or language-tagged
    Literal {
        value: JsonValue,
        type_: Option<String>,
        language: Option<String>,
    },
    /// An ordered list
    List(Vec<ValueObject>),
}

impl ValueObject {
    /// Construct a literal, enforcing that `@type` and `@language` are
    /// mutually exclusive
    pub fn literal(
        value: JsonValue,
        type_: Option<String>,
        language: Option<String>,
    ) -> Result<ValueObject> {
        if type_.is_some() && language.is_some() {
            return Err(JsonLdError::LanguageWithType);
        }
        Ok(ValueObject::Literal {
            value,
            type_,
            language,
        })
    }

    /// Construct a list, enforcing that lists do not nest
    pub fn list(items: Vec<ValueObject>) -> Result<ValueObject> {
        if items.iter().any(|i| matches!(i, ValueObject::List(_))) {
            return Err(JsonLdError::ListOfLists);
        }
        Ok(ValueObject::List(items))
    }

    /// Classify one item of an expanded property value array
    ///
    /// Returns `None` for node objects (embedded nodes and references with
    /// more than just `@id`), which the caller recurses into instead.
    pub fn from_expanded(item: &JsonValue) -> Result<Option<ValueObject>> {
        match item {
            JsonValue::Object(map) => {
                if let Some(JsonValue::Array(items)) = map.get(Keyword::List.as_str()) {
                    let mut list = Vec::with_capacity(items.len());
                    for entry in items {
                        match Self::from_expanded(entry)? {
                            Some(v) => list.push(v),
                            None => {
                                // Node objects inside a list stay references
                                if let Some(id) = entry
                                    .get(Keyword::Id.as_str())
                                    .and_then(|v| v.as_str())
                                {
                                    list.push(ValueObject::IdRef(id.to_string()));
                                } else {
                                    return Err(JsonLdError::Processing {
                                        message: format!(
                                            "unexpected list entry: {}",
                                            entry
                                        ),
                                    });
                                }
                            }
                        }
                    }
                    return Ok(Some(Self::list(list)?));
                }

                if let Some(value) = map.get(Keyword::Value.as_str()) {
                    let type_ = map
                        .get(Keyword::Type.as_str())
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string());
                    let language = map
                        .get(Keyword::Language.as_str())
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string());
                    return Ok(Some(Self::literal(value.clone(), type_, language)?));
                }

                // A lone @id is a reference; anything more is a node object
                if map.len() == 1 {
                    if let Some(JsonValue::String(id)) = map.get(Keyword::Id.as_str()) {
                        return Ok(Some(ValueObject::IdRef(id.clone())));
                    }
                }
                Ok(None)
            }

            JsonValue::Array(_) => Err(JsonLdError::ListOfLists),

            scalar => Ok(Some(ValueObject::Literal {
                value: scalar.clone(),
                type_: None,
                language: None,
            })),
        }
    }

    /// Serialize to expanded JSON
    ///
    /// Untyped native numbers and booleans come back as naked JSON values;
    /// everything else gets its value-object form.
    pub fn to_json(&self) -> JsonValue {
        match self {
            ValueObject::IdRef(id) => {
                let mut obj = Map::new();
                obj.insert(
                    Keyword::Id.as_str().to_string(),
                    JsonValue::String(id.clone()),
                );
                JsonValue::Object(obj)
            }

            ValueObject::Literal {
                value,
                type_,
                language,
            } => {
                if type_.is_none() && language.is_none() {
                    if value.is_number() || value.is_boolean() {
                        return value.clone();
                    }
                    let mut obj = Map::new();
                    obj.insert(Keyword::Value.as_str().to_string(), value.clone());
                    return JsonValue::Object(obj);
                }
                let mut obj = Map::new();
                obj.insert(Keyword::Value.as_str().to_string(), value.clone());
                if let Some(t) = type_ {
                    obj.insert(
                        Keyword::Type.as_str().to_string(),
                        JsonValue::String(t.clone()),
                    );
                }
                if let Some(l) = language {
                    obj.insert(
                        Keyword::Language.as_str().to_string(),
                        JsonValue::String(l.clone()),
                    );
                }
                JsonValue::Object(obj)
            }

            ValueObject::List(items) => {
                let mut obj = Map::new();
                obj.insert(
                    Keyword::List.as_str().to_string(),
                    JsonValue::Array(items.iter().map(|i| i.to_json()).collect()),
                );
                JsonValue::Object(obj)
            }
        }
    }
}

/// Convert a statement object term into a value object
///
/// Recognized numeric and boolean datatypes become native JSON values;
/// xsd:decimal keeps its lexical form to avoid losing precision; other
/// datatypes stay typed strings.
pub(crate) fn term_to_value(term: &Term) -> ValueObject {
    match term {
        Term::Iri(iri) => ValueObject::IdRef(iri.to_string()),
        Term::BlankNode(id) => ValueObject::IdRef(id.to_ntriples()),
        Term::Literal {
            value,
            datatype,
            language,
        } => {
            if let Some(lang) = language {
                return ValueObject::Literal {
                    value: JsonValue::String(value.lexical()),
                    type_: None,
                    language: Some(lang.to_string()),
                };
            }

            match datatype.as_iri() {
                xsd::STRING => ValueObject::Literal {
                    value: JsonValue::String(value.lexical()),
                    type_: None,
                    language: None,
                },
                xsd::INTEGER => {
                    let native = value
                        .as_integer()
                        .map(|i| JsonValue::from(i))
                        .or_else(|| value.as_str().and_then(|s| s.parse::<i64>().ok()).map(JsonValue::from));
                    match native {
                        Some(n) => ValueObject::Literal {
                            value: n,
                            type_: None,
                            language: None,
                        },
                        None => typed_lexical(value.lexical(), datatype.as_iri()),
                    }
                }
                xsd::BOOLEAN => {
                    let native = value
                        .as_bool()
                        .or_else(|| value.as_str().and_then(|s| s.parse::<bool>().ok()));
                    match native {
                        Some(b) => ValueObject::Literal {
                            value: JsonValue::Bool(b),
                            type_: None,
                            language: None,
                        },
                        None => typed_lexical(value.lexical(), datatype.as_iri()),
                    }
                }
                xsd::DOUBLE => {
                    let native = value
                        .as_double()
                        .or_else(|| value.as_str().and_then(|s| s.parse::<f64>().ok()))
                        .and_then(serde_json::Number::from_f64);
                    match native {
                        // Non-finite doubles have no JSON number form
                        Some(n) => ValueObject::Literal {
                            value: JsonValue::Number(n),
                            type_: None,
                            language: None,
                        },
                        None => typed_lexical(value.lexical(), datatype.as_iri()),
                    }
                }
                other => typed_lexical(value.lexical(), other),
            }
        }
    }
}

fn typed_lexical(lexical: String, datatype: &str) -> ValueObject {
    ValueObject::Literal {
        value: JsonValue::String(lexical),
        type_: Some(datatype.to_string()),
        language: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_graph_ir::Datatype;
    use serde_json::json;

    #[test]
    fn test_language_with_type_rejected() {
        let err = ValueObject::literal(
            json!("2020-01-01"),
            Some("http://www.w3.org/2001/XMLSchema#date".to_string()),
            Some("en".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, JsonLdError::LanguageWithType));
    }

    #[test]
    fn test_list_of_lists_rejected() {
        let inner = ValueObject::list(vec![]).unwrap();
        let err = ValueObject::list(vec![inner]).unwrap_err();
        assert!(matches!(err, JsonLdError::ListOfLists));
    }

    #[test]
    fn test_from_expanded_classification() {
        // Lone @id is a reference
        assert_eq!(
            ValueObject::from_expanded(&json!({"@id": "http://example.org/a"})).unwrap(),
            Some(ValueObject::IdRef("http://example.org/a".to_string()))
        );

        // @id plus properties is a node object
        assert_eq!(
            ValueObject::from_expanded(
                &json!({"@id": "http://example.org/a", "http://example.org/p": [1]})
            )
            .unwrap(),
            None
        );

        // Value object
        assert_eq!(
            ValueObject::from_expanded(&json!({"@value": "x", "@language": "en"})).unwrap(),
            Some(ValueObject::Literal {
                value: json!("x"),
                type_: None,
                language: Some("en".to_string()),
            })
        );

        // Naked scalar
        assert_eq!(
            ValueObject::from_expanded(&json!(42)).unwrap(),
            Some(ValueObject::Literal {
                value: json!(42),
                type_: None,
                language: None,
            })
        );

        // A nested array is a list of lists
        assert!(matches!(
            ValueObject::from_expanded(&json!([[1]])),
            Err(JsonLdError::ListOfLists)
        ));
    }

    #[test]
    fn test_to_json_native_values() {
        let int = ValueObject::Literal {
            value: json!(42),
            type_: None,
            language: None,
        };
        assert_eq!(int.to_json(), json!(42));

        let string = ValueObject::Literal {
            value: json!("hello"),
            type_: None,
            language: None,
        };
        assert_eq!(string.to_json(), json!({"@value": "hello"}));

        let tagged = ValueObject::Literal {
            value: json!("bonjour"),
            type_: None,
            language: Some("fr".to_string()),
        };
        assert_eq!(tagged.to_json(), json!({"@value": "bonjour", "@language": "fr"}));
    }

    #[test]
    fn test_term_to_value_datatypes() {
        assert_eq!(term_to_value(&Term::integer(42)).to_json(), json!(42));
        assert_eq!(term_to_value(&Term::boolean(true)).to_json(), json!(true));
        assert_eq!(term_to_value(&Term::double(1.5)).to_json(), json!(1.5));
        assert_eq!(
            term_to_value(&Term::string("hi")).to_json(),
            json!({"@value": "hi"})
        );
        assert_eq!(
            term_to_value(&Term::lang_string("hola", "es")).to_json(),
            json!({"@value": "hola", "@language": "es"})
        );

        // Decimals keep their lexical form
        assert_eq!(
            term_to_value(&Term::typed("2.5", Datatype::xsd_decimal())).to_json(),
            json!({"@value": "2.5", "@type": "http://www.w3.org/2001/XMLSchema#decimal"})
        );

        // Lexically stored integers still come back native
        assert_eq!(
            term_to_value(&Term::typed("7", Datatype::xsd_integer())).to_json(),
            json!(7)
        );

        // Non-finite doubles cannot be JSON numbers
        assert_eq!(
            term_to_value(&Term::double(f64::INFINITY)).to_json(),
            json!({"@value": "INF", "@type": "http://www.w3.org/2001/XMLSchema#double"})
        );
    }

    #[test]
    fn test_term_to_value_references() {
        assert_eq!(
            term_to_value(&Term::iri("http://example.org/a")).to_json(),
            json!({"@id": "http://example.org/a"})
        );
        assert_eq!(
            term_to_value(&Term::blank("t0")).to_json(),
            json!({"@id": "_:t0"})
        );
    }
}
