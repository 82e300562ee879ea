//! Document expansion
//!
//! Expansion rewrites a document into a context-free form: every key is a
//! full IRI or canonical keyword, every property value is an array, and
//! coercions declared in the context are applied as explicit `@type` /
//! `@id` structure. Aliased and deprecated keyword spellings are folded to
//! their canonical forms on the way through.

use crate::context::{ActiveContext, Coercion, Container, TermDefinition};
use crate::error::{JsonLdError, Result};
use crate::iri;
use crate::keyword::Keyword;
use crate::loader::ContextLoader;
use serde_json::{Map, Value as JsonValue};

pub(crate) struct Expander<'a> {
    pub loader: &'a dyn ContextLoader,
    /// When set, keys that expand to neither an IRI nor a keyword are
    /// errors instead of passing through untouched
    pub validate: bool,
}

impl<'a> Expander<'a> {
    /// Expand a document against an active context
    ///
    /// The result keeps the shape of the input: an object expands to an
    /// object, an array to an array. The exception is a top-level object
    /// whose only content is `@graph`, which unwraps to the array of its
    /// nodes.
    pub fn expand(&self, input: &JsonValue, active: &ActiveContext) -> Result<JsonValue> {
        match input {
            JsonValue::Array(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::Object(map) => nodes.push(self.expand_node(map, active)?),
                        other => {
                            return Err(JsonLdError::Processing {
                                message: format!("expected a node object, got: {}", other),
                            })
                        }
                    }
                }
                Ok(JsonValue::Array(nodes))
            }

            JsonValue::Object(map) => {
                let merged;
                let active = match map.get("@context") {
                    Some(ctx) => {
                        merged = ActiveContext::parse(Some(active), ctx, self.loader)?;
                        &merged
                    }
                    None => active,
                };

                // A document that is nothing but a default graph unwraps
                let content: Vec<&String> =
                    map.keys().filter(|k| k.as_str() != "@context").collect();
                if content.len() == 1 && active.keyword(content[0]) == Some(Keyword::Graph) {
                    if let Some(JsonValue::Array(nodes)) = map.get(content[0]) {
                        let mut expanded = Vec::with_capacity(nodes.len());
                        for node in nodes {
                            match node {
                                JsonValue::Object(map) => {
                                    expanded.push(self.expand_node(map, active)?)
                                }
                                other => {
                                    return Err(JsonLdError::Processing {
                                        message: format!(
                                            "expected a node object in @graph, got: {}",
                                            other
                                        ),
                                    })
                                }
                            }
                        }
                        return Ok(JsonValue::Array(expanded));
                    }
                }

                self.node_body(map, active)
            }

            other => Err(JsonLdError::Processing {
                message: format!("cannot expand: {}", other),
            }),
        }
    }

    /// Expand one node object, merging its local context first
    fn expand_node(
        &self,
        map: &Map<String, JsonValue>,
        active: &ActiveContext,
    ) -> Result<JsonValue> {
        let merged;
        let active = match map.get("@context") {
            Some(ctx) => {
                merged = ActiveContext::parse(Some(active), ctx, self.loader)?;
                &merged
            }
            None => active,
        };
        self.node_body(map, active)
    }

    fn node_body(
        &self,
        map: &Map<String, JsonValue>,
        active: &ActiveContext,
    ) -> Result<JsonValue> {
        let mut result = Map::new();

        for (key, value) in map.iter() {
            match active.keyword(key) {
                Some(Keyword::Context) => continue,

                Some(Keyword::Id) => {
                    let id = match value {
                        JsonValue::String(s) => s.as_str(),
                        JsonValue::Object(obj) => obj
                            .get(Keyword::Id.as_str())
                            .or_else(|| obj.get("@iri"))
                            .and_then(|v| v.as_str())
                            .ok_or_else(|| JsonLdError::Processing {
                                message: format!("invalid @id value: {}", value),
                            })?,
                        other => {
                            return Err(JsonLdError::Processing {
                                message: format!("invalid @id value: {}", other),
                            })
                        }
                    };
                    result.insert(
                        Keyword::Id.as_str().to_string(),
                        JsonValue::String(active.expand_iri(id, false)),
                    );
                }

                Some(Keyword::Type) => {
                    let types = self.expand_types(value, active)?;
                    result.insert(Keyword::Type.as_str().to_string(), JsonValue::Array(types));
                }

                Some(Keyword::Graph) => {
                    let nodes = match value {
                        JsonValue::Array(nodes) => nodes,
                        other => {
                            return Err(JsonLdError::Processing {
                                message: format!("@graph must be an array, got: {}", other),
                            })
                        }
                    };
                    let mut expanded = Vec::with_capacity(nodes.len());
                    for node in nodes {
                        match node {
                            JsonValue::Object(map) => expanded.push(self.expand_node(map, active)?),
                            other => {
                                return Err(JsonLdError::Processing {
                                    message: format!(
                                        "expected a node object in @graph, got: {}",
                                        other
                                    ),
                                })
                            }
                        }
                    }
                    result.insert(
                        Keyword::Graph.as_str().to_string(),
                        JsonValue::Array(expanded),
                    );
                }

                // Other keywords have no meaning at node position here
                Some(_) => continue,

                None => {
                    let (expanded_key, def) = active.resolve(key, true);
                    if self.validate
                        && !expanded_key.starts_with('@')
                        && !iri::any_iri(&expanded_key)
                    {
                        return Err(JsonLdError::Processing {
                            message: format!("key '{}' does not expand to an IRI", key),
                        });
                    }

                    let values = self.parse_value(value, def, active)?;
                    let values = wrap_list_container(values, def)?;

                    let slot = result
                        .entry(expanded_key)
                        .or_insert_with(|| JsonValue::Array(Vec::new()));
                    if let JsonValue::Array(existing) = slot {
                        existing.extend(values);
                    }
                }
            }
        }

        Ok(JsonValue::Object(result))
    }

    fn expand_types(&self, value: &JsonValue, active: &ActiveContext) -> Result<Vec<JsonValue>> {
        let mut types = Vec::new();
        let items: Vec<&JsonValue> = match value {
            JsonValue::Array(arr) => arr.iter().collect(),
            single => vec![single],
        };
        for item in items {
            let t = match item {
                JsonValue::String(s) => s.as_str(),
                JsonValue::Object(obj) => obj
                    .get(Keyword::Id.as_str())
                    .or_else(|| obj.get("@iri"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| JsonLdError::Processing {
                        message: format!("invalid @type value: {}", item),
                    })?,
                other => {
                    return Err(JsonLdError::Processing {
                        message: format!("invalid @type value: {}", other),
                    })
                }
            };
            types.push(JsonValue::String(active.expand_iri(t, true)));
        }
        Ok(types)
    }

    /// Expand one property value to its array of expanded items
    fn parse_value(
        &self,
        value: &JsonValue,
        def: Option<&TermDefinition>,
        active: &ActiveContext,
    ) -> Result<Vec<JsonValue>> {
        match value {
            JsonValue::Null => Ok(vec![]),

            JsonValue::Bool(_) | JsonValue::Number(_) => {
                if let Some(Coercion::Datatype(dt)) = def.and_then(|d| d.coercion.as_ref()) {
                    let mut obj = Map::new();
                    obj.insert(Keyword::Value.as_str().to_string(), value.clone());
                    obj.insert(
                        Keyword::Type.as_str().to_string(),
                        JsonValue::String(dt.clone()),
                    );
                    Ok(vec![JsonValue::Object(obj)])
                } else {
                    Ok(vec![value.clone()])
                }
            }

            JsonValue::String(s) => match def.and_then(|d| d.coercion.as_ref()) {
                Some(Coercion::Id) => {
                    let mut obj = Map::new();
                    obj.insert(
                        Keyword::Id.as_str().to_string(),
                        JsonValue::String(active.expand_iri(s, false)),
                    );
                    Ok(vec![JsonValue::Object(obj)])
                }
                Some(Coercion::Datatype(dt)) => {
                    let mut obj = Map::new();
                    obj.insert(
                        Keyword::Value.as_str().to_string(),
                        JsonValue::String(s.clone()),
                    );
                    obj.insert(
                        Keyword::Type.as_str().to_string(),
                        JsonValue::String(dt.clone()),
                    );
                    Ok(vec![JsonValue::Object(obj)])
                }
                None => {
                    let mut obj = Map::new();
                    obj.insert(
                        Keyword::Value.as_str().to_string(),
                        JsonValue::String(s.clone()),
                    );
                    if let Some(lang) = &active.language {
                        obj.insert(
                            Keyword::Language.as_str().to_string(),
                            JsonValue::String(lang.clone()),
                        );
                    }
                    Ok(vec![JsonValue::Object(obj)])
                }
            },

            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::Array(_) => return Err(JsonLdError::ListOfLists),
                        JsonValue::Object(map) => {
                            if self.value_keyword(map, active).is_some() {
                                out.extend(self.parse_value(item, def, active)?);
                            } else {
                                out.push(self.expand_node(map, active)?);
                            }
                        }
                        scalar => out.extend(self.parse_value(scalar, def, active)?),
                    }
                }
                Ok(out)
            }

            JsonValue::Object(map) => match self.value_keyword(map, active) {
                Some((Keyword::Value, _)) => {
                    Ok(vec![self.parse_value_object(map, def, active)?])
                }
                Some((Keyword::List, inner)) => {
                    let items = self.parse_value(inner, def, active)?;
                    for item in &items {
                        if item.get(Keyword::List.as_str()).is_some() {
                            return Err(JsonLdError::ListOfLists);
                        }
                    }
                    let mut obj = Map::new();
                    obj.insert(Keyword::List.as_str().to_string(), JsonValue::Array(items));
                    Ok(vec![JsonValue::Object(obj)])
                }
                // @set flattens away
                Some((Keyword::Set, inner)) => self.parse_value(inner, def, active),
                _ => Ok(vec![self.expand_node(map, active)?]),
            },
        }
    }

    /// Find the @value / @list / @set key of an object, if it has one,
    /// honoring aliases
    fn value_keyword<'v>(
        &self,
        map: &'v Map<String, JsonValue>,
        active: &ActiveContext,
    ) -> Option<(Keyword, &'v JsonValue)> {
        for (key, value) in map.iter() {
            match active.keyword(key) {
                Some(kw @ (Keyword::Value | Keyword::List | Keyword::Set)) => {
                    return Some((kw, value))
                }
                _ => {}
            }
        }
        None
    }

    fn parse_value_object(
        &self,
        map: &Map<String, JsonValue>,
        def: Option<&TermDefinition>,
        active: &ActiveContext,
    ) -> Result<JsonValue> {
        let mut value = None;
        let mut explicit_type = None;
        let mut explicit_language = None;
        for (key, v) in map.iter() {
            match active.keyword(key) {
                Some(Keyword::Value) => value = Some(v),
                Some(Keyword::Type) => explicit_type = v.as_str(),
                Some(Keyword::Language) => explicit_language = v.as_str(),
                _ => {}
            }
        }
        let value = value.ok_or_else(|| JsonLdError::Processing {
            message: "value object without @value".to_string(),
        })?;

        let type_ = match explicit_type {
            Some(t) => Some(active.expand_iri(t, true)),
            None => match def.and_then(|d| d.coercion.as_ref()) {
                Some(Coercion::Id) => Some(Keyword::Id.as_str().to_string()),
                Some(Coercion::Datatype(dt)) => Some(dt.clone()),
                None => None,
            },
        };

        // An @id type turns the value into a reference
        if type_.as_deref() == Some(Keyword::Id.as_str()) {
            let s = value.as_str().ok_or_else(|| JsonLdError::Processing {
                message: format!("@id-coerced value must be a string, got: {}", value),
            })?;
            let mut obj = Map::new();
            obj.insert(
                Keyword::Id.as_str().to_string(),
                JsonValue::String(active.expand_iri(s, false)),
            );
            return Ok(JsonValue::Object(obj));
        }

        if explicit_language.is_some() && type_.is_some() {
            return Err(JsonLdError::LanguageWithType);
        }
        let language = explicit_language
            .map(|l| l.to_string())
            .or_else(|| {
                if type_.is_none() && value.is_string() {
                    active.language.clone()
                } else {
                    None
                }
            });

        let mut obj = Map::new();
        obj.insert(Keyword::Value.as_str().to_string(), value.clone());
        if let Some(t) = type_ {
            obj.insert(Keyword::Type.as_str().to_string(), JsonValue::String(t));
        }
        if let Some(l) = language {
            obj.insert(
                Keyword::Language.as_str().to_string(),
                JsonValue::String(l),
            );
        }
        Ok(JsonValue::Object(obj))
    }
}

/// Apply a term's `@container: @list` by wrapping its values, unless the
/// document already supplied an explicit list
fn wrap_list_container(
    values: Vec<JsonValue>,
    def: Option<&TermDefinition>,
) -> Result<Vec<JsonValue>> {
    if def.map(|d| d.container) != Some(Some(Container::List)) {
        return Ok(values);
    }
    if values.len() == 1 && values[0].get(Keyword::List.as_str()).is_some() {
        return Ok(values);
    }
    for value in &values {
        if value.get(Keyword::List.as_str()).is_some() {
            return Err(JsonLdError::ListOfLists);
        }
    }
    let mut obj = Map::new();
    obj.insert(Keyword::List.as_str().to_string(), JsonValue::Array(values));
    Ok(vec![JsonValue::Object(obj)])
}
