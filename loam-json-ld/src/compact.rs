//! Document compaction
//!
//! Compaction is the inverse of expansion: expanded IRIs shrink back to the
//! shortest form the context offers (an exact term, a prefixed name, or a
//! vocabulary-relative name), coerced structure collapses back to bare
//! values, and canonical keywords come out under their aliases.

use crate::context::{ActiveContext, Coercion, Container, TermDefinition};
use crate::error::{JsonLdError, Result};
use crate::keyword::Keyword;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// Markers for the vocabulary and base entries of the namespace table
const VOCAB: &str = ":vocab";
const BASE: &str = ":base";

/// Compact an expanded document against a context
pub(crate) fn compact(expanded: &JsonValue, ctx: &ActiveContext) -> Result<JsonValue> {
    let compactor = Compactor::new(ctx);
    match expanded {
        JsonValue::Array(nodes) => {
            let mut out = Vec::with_capacity(nodes.len());
            for node in nodes {
                out.push(compactor.compact_value(node)?);
            }
            Ok(JsonValue::Array(out))
        }
        other => compactor.compact_value(other),
    }
}

/// Compact one IRI; `vocab` selects vocabulary-position rules (terms and
/// the default vocabulary) over identifier-position rules (base stripping)
pub(crate) fn compact_iri(iri: &str, ctx: &ActiveContext, vocab: bool) -> String {
    let compactor = Compactor::new(ctx);
    if vocab {
        compactor.compact_vocab(iri)
    } else {
        compactor.compact_id(iri)
    }
}

/// What shape a property's values have, used to pick among candidate terms
#[derive(Debug, Clone, PartialEq)]
enum Hint {
    List,
    Id,
    Literal(Option<String>),
    Plain,
}

impl Hint {
    fn of(items: &[JsonValue]) -> Hint {
        match items.first() {
            Some(JsonValue::Object(map)) => {
                if map.get(Keyword::List.as_str()).is_some() {
                    Hint::List
                } else if map.get(Keyword::Value.as_str()).is_some() {
                    Hint::Literal(
                        map.get(Keyword::Type.as_str())
                            .and_then(|v| v.as_str())
                            .map(|s| s.to_string()),
                    )
                } else if map.len() == 1
                    && map
                        .get(Keyword::Id.as_str())
                        .map_or(false, |v| v.is_string())
                {
                    Hint::Id
                } else {
                    Hint::Plain
                }
            }
            Some(_) => Hint::Literal(None),
            None => Hint::Plain,
        }
    }
}

struct Compactor<'a> {
    ctx: &'a ActiveContext,
    /// IRI to the terms naming it exactly, in definition order
    exact: HashMap<String, Vec<String>>,
    /// Namespace IRIs to strip, longest first. The vocabulary and base
    /// entries carry the `:vocab` / `:base` markers instead of a term name.
    prefixes: Vec<(String, String)>,
}

impl<'a> Compactor<'a> {
    fn new(ctx: &'a ActiveContext) -> Self {
        let mut exact: HashMap<String, Vec<String>> = HashMap::new();
        let mut prefixes: Vec<(String, String)> = Vec::new();

        for term in ctx.term_order() {
            if let Some(def) = ctx.get(term) {
                exact.entry(def.iri.clone()).or_default().push(term.clone());
                if def.iri.ends_with('/') || def.iri.ends_with('#') {
                    prefixes.push((def.iri.clone(), term.clone()));
                }
            }
        }
        if let Some(vocab) = &ctx.vocab {
            prefixes.push((vocab.clone(), VOCAB.to_string()));
        }
        if let Some(base) = &ctx.base {
            prefixes.push((base.clone(), BASE.to_string()));
        }
        // Longest namespace wins; definition order breaks ties
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            ctx,
            exact,
            prefixes,
        }
    }

    /// Pick the best exact term for an IRI given the value shape, if any
    fn choose_term(&self, iri: &str, hint: &Hint) -> Option<(&str, &TermDefinition)> {
        let candidates = self.exact.get(iri)?;
        let mut best: Option<(&str, &TermDefinition, u8)> = None;
        for name in candidates {
            let def = self.ctx.get(name)?;
            let rank = match term_rank(def, hint) {
                Some(r) => r,
                None => continue,
            };
            if best.as_ref().map_or(true, |(_, _, b)| rank < *b) {
                best = Some((name, def, rank));
            }
        }
        best.map(|(name, def, _)| (name, def))
    }

    /// Strip a namespace prefix. `vocab` controls whether the default
    /// vocabulary may be stripped (keys and types, not identifiers).
    fn prefix_compact(&self, iri: &str, vocab: bool) -> String {
        for (prefix, name) in &self.prefixes {
            if iri.len() <= prefix.len() || !iri.starts_with(prefix.as_str()) {
                continue;
            }
            let suffix = &iri[prefix.len()..];
            match name.as_str() {
                VOCAB if vocab => return suffix.to_string(),
                VOCAB => continue,
                BASE => return suffix.to_string(),
                _ => return format!("{}:{}", name, suffix),
            }
        }
        iri.to_string()
    }

    /// Compact an IRI in a vocabulary position (`@type` values)
    fn compact_vocab(&self, iri: &str) -> String {
        if let Some((name, _)) = self.choose_term(iri, &Hint::Plain) {
            return name.to_string();
        }
        self.prefix_compact(iri, true)
    }

    /// Compact an IRI in an identifier position (`@id` values)
    fn compact_id(&self, iri: &str) -> String {
        if let Some((name, _)) = self.choose_term(iri, &Hint::Plain) {
            return name.to_string();
        }
        self.prefix_compact(iri, false)
    }

    /// Compact a property key, returning the chosen term's definition when
    /// an exact term won
    fn compact_key(&self, iri: &str, hint: &Hint) -> (String, Option<&TermDefinition>) {
        if let Some((name, def)) = self.choose_term(iri, hint) {
            return (name.to_string(), Some(def));
        }
        (self.prefix_compact(iri, true), None)
    }

    fn compact_value(&self, value: &JsonValue) -> Result<JsonValue> {
        match value {
            JsonValue::Object(map) => self.compact_node(map),
            other => Ok(other.clone()),
        }
    }

    fn compact_node(&self, map: &Map<String, JsonValue>) -> Result<JsonValue> {
        let mut result = Map::new();

        for (key, value) in map.iter() {
            match key.as_str() {
                "@id" => {
                    let id = value.as_str().ok_or_else(|| JsonLdError::Processing {
                        message: format!("@id must be a string, got: {}", value),
                    })?;
                    result.insert(
                        self.ctx.alias_for(Keyword::Id).to_string(),
                        JsonValue::String(self.compact_id(id)),
                    );
                }

                "@type" => {
                    let types: Vec<JsonValue> = match value {
                        JsonValue::Array(arr) => arr
                            .iter()
                            .filter_map(|t| t.as_str())
                            .map(|t| JsonValue::String(self.compact_vocab(t)))
                            .collect(),
                        JsonValue::String(t) => {
                            vec![JsonValue::String(self.compact_vocab(t))]
                        }
                        other => {
                            return Err(JsonLdError::Processing {
                                message: format!("invalid @type value: {}", other),
                            })
                        }
                    };
                    let compacted = if types.len() == 1 {
                        types.into_iter().next().unwrap_or(JsonValue::Null)
                    } else {
                        JsonValue::Array(types)
                    };
                    result.insert(self.ctx.alias_for(Keyword::Type).to_string(), compacted);
                }

                "@graph" => {
                    let nodes = match value {
                        JsonValue::Array(nodes) => nodes,
                        other => {
                            return Err(JsonLdError::Processing {
                                message: format!("@graph must be an array, got: {}", other),
                            })
                        }
                    };
                    let mut compacted = Vec::with_capacity(nodes.len());
                    for node in nodes {
                        compacted.push(self.compact_value(node)?);
                    }
                    result.insert(
                        self.ctx.alias_for(Keyword::Graph).to_string(),
                        JsonValue::Array(compacted),
                    );
                }

                "@value" => {
                    result.insert(self.ctx.alias_for(Keyword::Value).to_string(), value.clone());
                }
                "@language" => {
                    result.insert(
                        self.ctx.alias_for(Keyword::Language).to_string(),
                        value.clone(),
                    );
                }

                "@list" => {
                    let items = match value {
                        JsonValue::Array(items) => items,
                        other => {
                            return Err(JsonLdError::Processing {
                                message: format!("@list must be an array, got: {}", other),
                            })
                        }
                    };
                    let mut compacted = Vec::with_capacity(items.len());
                    for item in items {
                        compacted.push(self.compact_one(item, None)?);
                    }
                    result.insert(
                        self.ctx.alias_for(Keyword::List).to_string(),
                        JsonValue::Array(compacted),
                    );
                }

                iri => {
                    let items: Vec<JsonValue> = match value {
                        JsonValue::Array(arr) => arr.clone(),
                        single => vec![single.clone()],
                    };
                    let hint = Hint::of(&items);
                    let (key, def) = self.compact_key(iri, &hint);
                    let compacted = self.compact_property_values(&items, def)?;
                    result.insert(key, compacted);
                }
            }
        }

        Ok(JsonValue::Object(result))
    }

    fn compact_property_values(
        &self,
        items: &[JsonValue],
        def: Option<&TermDefinition>,
    ) -> Result<JsonValue> {
        // A single list value either flattens into the term's list
        // container or stays an explicit list object
        if items.len() == 1 {
            if let Some(JsonValue::Array(list_items)) = items[0].get(Keyword::List.as_str()) {
                let mut compacted = Vec::with_capacity(list_items.len());
                for item in list_items {
                    compacted.push(self.compact_one(item, def)?);
                }
                if def.map(|d| d.container) == Some(Some(Container::List)) {
                    return Ok(JsonValue::Array(compacted));
                }
                let mut obj = Map::new();
                obj.insert(
                    self.ctx.alias_for(Keyword::List).to_string(),
                    JsonValue::Array(compacted),
                );
                return Ok(JsonValue::Object(obj));
            }
        }

        let mut compacted = Vec::with_capacity(items.len());
        for item in items {
            compacted.push(self.compact_one(item, def)?);
        }

        let keep_array = def.map(|d| d.container) == Some(Some(Container::Set));
        if compacted.len() == 1 && !keep_array {
            return Ok(compacted.into_iter().next().unwrap_or(JsonValue::Null));
        }
        Ok(JsonValue::Array(compacted))
    }

    fn compact_one(&self, item: &JsonValue, def: Option<&TermDefinition>) -> Result<JsonValue> {
        let map = match item {
            JsonValue::Object(map) => map,
            scalar => return Ok(scalar.clone()),
        };

        if let Some(value) = map.get(Keyword::Value.as_str()) {
            let type_ = map.get(Keyword::Type.as_str()).and_then(|v| v.as_str());
            let language = map
                .get(Keyword::Language.as_str())
                .and_then(|v| v.as_str());

            if language.is_none() {
                match type_ {
                    // A bare value collapses
                    None => return Ok(value.clone()),
                    // A type the term already coerces collapses too
                    Some(t) => {
                        if let Some(Coercion::Datatype(dt)) =
                            def.and_then(|d| d.coercion.as_ref())
                        {
                            if t == dt {
                                return Ok(value.clone());
                            }
                        }
                    }
                }
            } else if type_.is_none()
                && def.map_or(true, |d| d.coercion.is_none())
                && self.ctx.language.as_deref() == language
            {
                // The default language round-trips through a bare string
                return Ok(value.clone());
            }

            let mut obj = Map::new();
            obj.insert(self.ctx.alias_for(Keyword::Value).to_string(), value.clone());
            if let Some(t) = type_ {
                obj.insert(
                    self.ctx.alias_for(Keyword::Type).to_string(),
                    JsonValue::String(self.compact_vocab(t)),
                );
            }
            if let Some(l) = language {
                obj.insert(
                    self.ctx.alias_for(Keyword::Language).to_string(),
                    JsonValue::String(l.to_string()),
                );
            }
            return Ok(JsonValue::Object(obj));
        }

        if map.len() == 1 {
            if let Some(JsonValue::String(id)) = map.get(Keyword::Id.as_str()) {
                let compacted = self.compact_id(id);
                if matches!(def.and_then(|d| d.coercion.as_ref()), Some(Coercion::Id)) {
                    return Ok(JsonValue::String(compacted));
                }
                let mut obj = Map::new();
                obj.insert(
                    self.ctx.alias_for(Keyword::Id).to_string(),
                    JsonValue::String(compacted),
                );
                return Ok(JsonValue::Object(obj));
            }
        }

        self.compact_node(map)
    }
}

/// Rank a term for a value shape: 0 is a structural match, 1 a neutral
/// term, 2 a term whose coercion the value would have to override.
/// List-container terms are only usable for list values.
fn term_rank(def: &TermDefinition, hint: &Hint) -> Option<u8> {
    if def.container == Some(Container::List) && *hint != Hint::List {
        return None;
    }
    let rank = match (hint, &def.coercion) {
        (Hint::List, _) => {
            if def.container == Some(Container::List) {
                0
            } else {
                1
            }
        }
        (Hint::Id, Some(Coercion::Id)) => 0,
        (Hint::Literal(Some(t)), Some(Coercion::Datatype(dt))) if t == dt => 0,
        (Hint::Literal(None) | Hint::Plain, None) => 0,
        (_, None) => 1,
        _ => 2,
    };
    Some(rank)
}
