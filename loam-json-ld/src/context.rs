//! Context resolution
//!
//! An [`ActiveContext`] is the resolved form of one or more `@context`
//! values: term definitions, keyword aliases, and the `@base` / `@vocab` /
//! `@language` defaults. Both the current term syntax (`@id`, `@type`,
//! `@container`) and the deprecated one (`@iri`, `@coerce`, `@list: true`,
//! and the top-level `@coerce` block) funnel into the same
//! [`TermDefinition`] shape, so the rest of the processor never sees which
//! spelling the document used.

use crate::error::{JsonLdError, Result};
use crate::iri;
use crate::keyword::Keyword;
use crate::loader::ContextLoader;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// Container types for term values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    List,
    Set,
}

/// Value coercion declared on a term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion {
    /// String values are IRI references (`@type: @id` / `@coerce: @iri`)
    Id,
    /// String values are literals of this datatype
    Datatype(String),
}

/// A single term definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDefinition {
    /// The expanded IRI this term maps to
    pub iri: String,
    /// Value coercion, if any
    pub coercion: Option<Coercion>,
    /// Container, if any
    pub container: Option<Container>,
}

impl TermDefinition {
    fn plain(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            coercion: None,
            container: None,
        }
    }

    /// Serialize back to a `@context` entry value.
    ///
    /// Plain mappings become a string; anything with coercion or a container
    /// becomes an object in the current syntax.
    pub fn to_json(&self) -> JsonValue {
        if self.coercion.is_none() && self.container.is_none() {
            return JsonValue::String(self.iri.clone());
        }

        let mut obj = Map::new();
        obj.insert("@id".to_string(), JsonValue::String(self.iri.clone()));
        match &self.coercion {
            Some(Coercion::Id) => {
                obj.insert("@type".to_string(), JsonValue::String("@id".to_string()));
            }
            Some(Coercion::Datatype(dt)) => {
                obj.insert("@type".to_string(), JsonValue::String(dt.clone()));
            }
            None => {}
        }
        match self.container {
            Some(Container::List) => {
                obj.insert(
                    "@container".to_string(),
                    JsonValue::String("@list".to_string()),
                );
            }
            Some(Container::Set) => {
                obj.insert(
                    "@container".to_string(),
                    JsonValue::String("@set".to_string()),
                );
            }
            None => {}
        }
        JsonValue::Object(obj)
    }
}

/// The fully resolved context
#[derive(Debug, Clone, Default)]
pub struct ActiveContext {
    /// Base IRI for resolving relative `@id` values
    pub base: Option<String>,
    /// Default vocabulary for terms with no mapping
    pub vocab: Option<String>,
    /// Default language for plain string values
    pub language: Option<String>,
    /// Term definitions
    terms: HashMap<String, TermDefinition>,
    /// Term names in definition order (drives serialization and compaction
    /// tie-breaks)
    order: Vec<String>,
    /// Keyword aliases in definition order
    aliases: Vec<(String, Keyword)>,
    /// The context value this was parsed from, echoed by `serialize()`
    provided: Option<JsonValue>,
}

impl ActiveContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a term definition by name
    pub fn get(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term)
    }

    /// Check if a term is defined
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Term names in definition order
    pub fn term_order(&self) -> &[String] {
        &self.order
    }

    /// Resolve a document key to a keyword, honoring aliases
    ///
    /// Literal keyword spellings (including deprecated ones) and aliased
    /// names both resolve; anything else is a term or IRI.
    pub fn keyword(&self, key: &str) -> Option<Keyword> {
        if key.starts_with('@') {
            return Keyword::parse(key);
        }
        self.aliases
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, kw)| *kw)
    }

    /// The key to use for a keyword on output: the first alias defined for
    /// it, or the canonical spelling
    pub fn alias_for(&self, kw: Keyword) -> &str {
        self.aliases
            .iter()
            .find(|(_, k)| *k == kw)
            .map(|(name, _)| name.as_str())
            .unwrap_or_else(|| kw.as_str())
    }

    fn define(&mut self, term: &str, def: TermDefinition) {
        if !self.terms.contains_key(term) {
            self.order.push(term.to_string());
        }
        self.terms.insert(term.to_string(), def);
    }

    fn undefine(&mut self, term: &str) {
        self.terms.remove(term);
        self.order.retain(|t| t != term);
    }

    fn define_alias(&mut self, term: &str, kw: Keyword) {
        self.aliases.retain(|(name, _)| name != term);
        self.aliases.push((term.to_string(), kw));
    }

    /// Parse a `@context` value (null, string reference, object, or array)
    /// on top of an optional base context
    pub fn parse(
        base: Option<&ActiveContext>,
        source: &JsonValue,
        loader: &dyn ContextLoader,
    ) -> Result<ActiveContext> {
        let mut ctx = Self::parse_value(base, source, loader)?;
        if !source.is_null() {
            ctx.provided = Some(source.clone());
        }
        Ok(ctx)
    }

    fn parse_value(
        base: Option<&ActiveContext>,
        source: &JsonValue,
        loader: &dyn ContextLoader,
    ) -> Result<ActiveContext> {
        let active = base.cloned().unwrap_or_default();

        match source {
            // null resets to a fresh context
            JsonValue::Null => Ok(ActiveContext::default()),

            JsonValue::String(reference) => {
                tracing::debug!(iri = %reference, "fetching remote context");
                let doc = loader.fetch(reference).map_err(|e| remote_error(reference, &e))?;
                let body: JsonValue = serde_json::from_str(&doc.content)
                    .map_err(|e| remote_error(reference, &e))?;
                let inner = match &body {
                    JsonValue::Object(map) => map
                        .get("@context")
                        .cloned()
                        .ok_or_else(|| remote_error(reference, &"no @context member"))?,
                    other => other.clone(),
                };
                Self::parse_value(Some(&active), &inner, loader)
            }

            JsonValue::Object(map) => {
                // A wrapped document: {"@context": ...}
                if let Some(inner) = map.get("@context") {
                    return Self::parse_value(Some(&active), inner, loader);
                }
                parse_context_map(active, map)
            }

            JsonValue::Array(arr) => {
                // Sequential contexts merge left to right
                let mut merged = active;
                for entry in arr {
                    merged = Self::parse_value(Some(&merged), entry, loader)?;
                }
                Ok(merged)
            }

            other => Err(JsonLdError::InvalidContext {
                message: format!("invalid context value: {}", other),
            }),
        }
    }

    /// Expand a string in the given position to an IRI or keyword
    ///
    /// `vocab` selects the fallback for strings with no mapping: the default
    /// vocabulary for keys and `@type` values, the base IRI for `@id` values.
    pub fn expand_iri(&self, value: &str, vocab: bool) -> String {
        self.resolve(value, vocab).0
    }

    /// Like [`expand_iri`](Self::expand_iri) but also returns the term
    /// definition that drove an exact match
    pub fn resolve(&self, value: &str, vocab: bool) -> (String, Option<&TermDefinition>) {
        if value.starts_with('@') {
            if let Some(kw) = Keyword::parse(value) {
                return (kw.as_str().to_string(), None);
            }
            return (value.to_string(), None);
        }

        if let Some(kw) = self.keyword(value) {
            return (kw.as_str().to_string(), None);
        }

        if let Some(def) = self.terms.get(value) {
            return (def.iri.clone(), Some(def));
        }

        if let Some((prefix, suffix)) = iri::parse_prefix(value) {
            // ":suffix" resolves through the empty term
            let name = if prefix == ":" { "" } else { prefix.as_str() };
            if let Some(def) = self.terms.get(name) {
                return (format!("{}{}", def.iri, suffix), None);
            }
        }

        if iri::is_absolute(value) {
            return (value.to_string(), None);
        }

        if vocab {
            if let Some(v) = &self.vocab {
                return (format!("{}{}", v, value), None);
            }
        } else if let Some(b) = &self.base {
            return (iri::join(b, value), None);
        }

        (value.to_string(), None)
    }

    /// Serialize back to a `@context` value
    ///
    /// Echoes the context value this was parsed from when one is recorded
    /// (including remote references, which stay references); otherwise
    /// reconstructs an object in the current syntax. Empty contexts
    /// serialize to null.
    pub fn serialize(&self) -> JsonValue {
        if let Some(provided) = &self.provided {
            return provided.clone();
        }
        self.to_json()
    }

    /// Reconstruct a `@context` object from the resolved state
    pub fn to_json(&self) -> JsonValue {
        if self.terms.is_empty()
            && self.aliases.is_empty()
            && self.base.is_none()
            && self.vocab.is_none()
            && self.language.is_none()
        {
            return JsonValue::Null;
        }

        let mut ctx = Map::new();
        if let Some(base) = &self.base {
            ctx.insert("@base".to_string(), JsonValue::String(base.clone()));
        }
        if let Some(vocab) = &self.vocab {
            ctx.insert("@vocab".to_string(), JsonValue::String(vocab.clone()));
        }
        if let Some(lang) = &self.language {
            ctx.insert("@language".to_string(), JsonValue::String(lang.clone()));
        }
        for (name, kw) in &self.aliases {
            ctx.insert(name.clone(), JsonValue::String(kw.as_str().to_string()));
        }
        for term in &self.order {
            if let Some(def) = self.terms.get(term) {
                ctx.insert(term.clone(), def.to_json());
            }
        }
        JsonValue::Object(ctx)
    }
}

fn remote_error(reference: &str, cause: &dyn std::fmt::Display) -> JsonLdError {
    JsonLdError::InvalidContext {
        message: format!("Failed to parse remote context {}: {}", reference, cause),
    }
}

/// Compute @vocab, handling empty string and relative IRIs
fn compute_vocab(
    active: &ActiveContext,
    map: &Map<String, JsonValue>,
    value: &JsonValue,
) -> Result<Option<String>> {
    match value {
        JsonValue::String(s) => {
            if s.is_empty() {
                // Empty string means use @base as @vocab
                let base = map
                    .get("@base")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .or_else(|| active.base.clone());
                Ok(base.map(|b| iri::add_trailing_slash(&b)))
            } else if !iri::is_absolute(s) {
                // Relative vocab: join with base
                let base = map
                    .get("@base")
                    .and_then(|v| v.as_str())
                    .or(active.base.as_deref());
                if let Some(base) = base {
                    Ok(Some(iri::join(base, s)))
                } else {
                    Ok(Some(iri::add_trailing_slash(s)))
                }
            } else {
                Ok(Some(iri::add_trailing_slash(s)))
            }
        }
        JsonValue::Null => Ok(None),
        other => Err(JsonLdError::InvalidContext {
            message: format!("@vocab must be a string, got: {}", other),
        }),
    }
}

/// What a term's context entry turned out to be
enum TermParse {
    Alias(Keyword),
    Definition(TermDefinition),
    Remove,
}

/// Parse a context object
fn parse_context_map(base: ActiveContext, map: &Map<String, JsonValue>) -> Result<ActiveContext> {
    let mut result = base;

    // First pass: the scalar keys
    for (key, value) in map.iter() {
        match key.as_str() {
            "@vocab" => {
                result.vocab = compute_vocab(&result, map, value)?;
            }
            "@base" => match value {
                JsonValue::String(s) => result.base = Some(s.clone()),
                JsonValue::Null => result.base = None,
                other => {
                    return Err(JsonLdError::InvalidContext {
                        message: format!("@base must be a string, got: {}", other),
                    })
                }
            },
            "@language" => {
                result.language = value.as_str().map(|s| s.to_string());
            }
            _ => {}
        }
    }

    // Second pass: term definitions
    for (key, value) in map.iter() {
        if key.starts_with('@') {
            continue;
        }
        match parse_term_entry(key, value, map, &result)? {
            TermParse::Alias(kw) => result.define_alias(key, kw),
            TermParse::Definition(def) => result.define(key, def),
            TermParse::Remove => result.undefine(key),
        }
    }

    // Third pass: the deprecated top-level @coerce block, which names terms
    // from the outside: {"@coerce": {"@iri": ["homepage"], "xsd:date": "created"}}
    if let Some(block) = map.get("@coerce") {
        let block = block.as_object().ok_or_else(|| JsonLdError::InvalidContext {
            message: format!("@coerce must be an object, got: {}", block),
        })?;
        for (type_key, names) in block.iter() {
            let coercion = if type_key == "@iri" || type_key == "@id" {
                Coercion::Id
            } else {
                Coercion::Datatype(resolve_term_value(type_key, map, &result))
            };
            let names: Vec<String> = match names {
                JsonValue::String(s) => vec![s.clone()],
                JsonValue::Array(arr) => arr
                    .iter()
                    .map(|n| {
                        n.as_str().map(|s| s.to_string()).ok_or_else(|| {
                            JsonLdError::InvalidContext {
                                message: format!("@coerce term names must be strings, got: {}", n),
                            }
                        })
                    })
                    .collect::<Result<_>>()?,
                other => {
                    return Err(JsonLdError::InvalidContext {
                        message: format!("@coerce entry must name terms, got: {}", other),
                    })
                }
            };
            for name in names {
                if result.terms.contains_key(&name) {
                    if let Some(def) = result.terms.get_mut(&name) {
                        def.coercion = Some(coercion.clone());
                    }
                } else {
                    let iri = resolve_term_value(&name, map, &result);
                    result.define(
                        &name,
                        TermDefinition {
                            iri,
                            coercion: Some(coercion.clone()),
                            container: None,
                        },
                    );
                }
            }
        }
    }

    Ok(result)
}

/// Parse one term's context entry
fn parse_term_entry(
    key: &str,
    value: &JsonValue,
    map: &Map<String, JsonValue>,
    result: &ActiveContext,
) -> Result<TermParse> {
    match value {
        JsonValue::Null => Ok(TermParse::Remove),

        JsonValue::String(s) => {
            let mut visited = Vec::new();
            let resolved = recursively_get_id(s, map, &mut visited)?;
            if resolved.starts_with('@') {
                if let Some(kw) = Keyword::parse(&resolved) {
                    return Ok(TermParse::Alias(kw));
                }
                return Ok(TermParse::Definition(TermDefinition::plain(resolved)));
            }
            Ok(TermParse::Definition(TermDefinition::plain(
                resolve_term_value(&resolved, map, result),
            )))
        }

        JsonValue::Object(entry) => {
            // @id in the current syntax, @iri in the deprecated one
            let id = entry
                .get("@id")
                .or_else(|| entry.get("@iri"))
                .and_then(|v| v.as_str());
            let iri = match id {
                Some(s) if s.starts_with('@') => {
                    if let Some(kw) = Keyword::parse(s) {
                        return Ok(TermParse::Alias(kw));
                    }
                    s.to_string()
                }
                Some(s) => resolve_term_value(s, map, result),
                None => resolve_term_value(key, map, result),
            };

            // @type in the current syntax, @coerce in the deprecated one
            let coercion = match entry.get("@type").or_else(|| entry.get("@coerce")) {
                Some(JsonValue::String(s)) => {
                    if s == "@id" || s == "@iri" {
                        Some(Coercion::Id)
                    } else {
                        Some(Coercion::Datatype(resolve_term_value(s, map, result)))
                    }
                }
                Some(JsonValue::Null) | None => None,
                Some(other) => {
                    return Err(JsonLdError::InvalidContext {
                        message: format!("@type for term '{}' must be a string, got: {}", key, other),
                    })
                }
            };

            // @container in the current syntax, boolean @list / @set in the
            // deprecated one
            let mut container = match entry.get("@container") {
                Some(JsonValue::String(s)) => parse_container(s, key)?,
                Some(JsonValue::Array(arr)) => {
                    let mut found = None;
                    for item in arr {
                        if let Some(s) = item.as_str() {
                            if let Some(c) = parse_container(s, key)? {
                                found = Some(c);
                            }
                        }
                    }
                    found
                }
                Some(JsonValue::Null) | None => None,
                Some(other) => {
                    return Err(JsonLdError::InvalidContext {
                        message: format!(
                            "@container for term '{}' must be a string, got: {}",
                            key, other
                        ),
                    })
                }
            };
            if container.is_none() {
                if entry.get("@list").and_then(|v| v.as_bool()) == Some(true) {
                    container = Some(Container::List);
                } else if entry.get("@set").and_then(|v| v.as_bool()) == Some(true) {
                    container = Some(Container::Set);
                }
            }

            Ok(TermParse::Definition(TermDefinition {
                iri,
                coercion,
                container,
            }))
        }

        other => Err(JsonLdError::InvalidContext {
            message: format!("invalid context entry for '{}': {}", key, other),
        }),
    }
}

fn parse_container(s: &str, key: &str) -> Result<Option<Container>> {
    match s {
        "@list" => Ok(Some(Container::List)),
        "@set" => Ok(Some(Container::Set)),
        other => Err(JsonLdError::InvalidContext {
            message: format!("unknown @container value for term '{}': {}", key, other),
        }),
    }
}

/// Recursively resolve term references within the same context object
fn recursively_get_id(
    term: &str,
    map: &Map<String, JsonValue>,
    visited: &mut Vec<String>,
) -> Result<String> {
    if visited.iter().any(|v| v == term) {
        return Err(JsonLdError::InvalidIriMapping {
            term: term.to_string(),
        });
    }

    match map.get(term) {
        Some(JsonValue::String(s)) => {
            if s == term {
                // Self-reference is a cycle
                return Err(JsonLdError::InvalidIriMapping {
                    term: term.to_string(),
                });
            }
            if !s.contains(':') && !s.starts_with('@') {
                visited.push(term.to_string());
                return recursively_get_id(s, map, visited);
            }
            Ok(s.clone())
        }
        Some(JsonValue::Object(entry)) => {
            match entry.get("@id").or_else(|| entry.get("@iri")) {
                Some(JsonValue::String(id)) => Ok(id.clone()),
                _ => Ok(term.to_string()),
            }
        }
        _ => Ok(term.to_string()),
    }
}

/// Resolve a term's value: compact IRI via the raw map or prior definitions,
/// bare name via prior definitions or the default vocabulary
fn resolve_term_value(value: &str, map: &Map<String, JsonValue>, result: &ActiveContext) -> String {
    if let Some((prefix, suffix)) = iri::parse_prefix(value) {
        let name = if prefix == ":" { "" } else { prefix.as_str() };
        if let Some(prefix_iri) = raw_term_id(map, name) {
            return format!("{}{}", prefix_iri, suffix);
        }
        if let Some(def) = result.terms.get(name) {
            return format!("{}{}", def.iri, suffix);
        }
    }

    if !value.starts_with('@') && !iri::any_iri(value) {
        // A bare name may reference a term from an earlier context
        if let Some(def) = result.terms.get(value) {
            return def.iri.clone();
        }
        if let Some(vocab) = &result.vocab {
            return format!("{}{}", vocab, value);
        }
    }

    value.to_string()
}

/// The raw @id a context object maps a term to, if any
fn raw_term_id(map: &Map<String, JsonValue>, term: &str) -> Option<String> {
    match map.get(term)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Object(entry) => match entry.get("@id").or_else(|| entry.get("@iri")) {
            Some(JsonValue::String(id)) => Some(id.clone()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{NoLoader, StaticLoader};
    use serde_json::json;

    fn parse(source: JsonValue) -> ActiveContext {
        ActiveContext::parse(None, &source, &NoLoader).unwrap()
    }

    #[test]
    fn test_prefix_terms() {
        let ctx = parse(json!({
            "owl": "http://www.w3.org/2002/07/owl#",
            "ex": "http://example.org/ns#"
        }));

        assert_eq!(ctx.get("owl").unwrap().iri, "http://www.w3.org/2002/07/owl#");
        assert_eq!(ctx.get("ex").unwrap().iri, "http://example.org/ns#");
    }

    #[test]
    fn test_dependent_terms() {
        let ctx = parse(json!({
            "nc": "http://release.niem.gov/niem/niem-core/4.0/#",
            "name": "nc:PersonName"
        }));
        assert_eq!(
            ctx.get("name").unwrap().iri,
            "http://release.niem.gov/niem/niem-core/4.0/#PersonName"
        );

        let two_level = parse(json!({
            "clri": "https://purl.imsglobal.org/spec/clr/vocab#",
            "Address": "dtAddress",
            "dtAddress": "clri:dtAddress"
        }));
        assert_eq!(
            two_level.get("Address").unwrap().iri,
            "https://purl.imsglobal.org/spec/clr/vocab#dtAddress"
        );
    }

    #[test]
    fn test_bare_name_across_array_contexts() {
        let ctx = parse(json!([
            {"foo": "http://example.com/foo"},
            {"bar": "foo"}
        ]));
        assert_eq!(ctx.get("bar").unwrap().iri, "http://example.com/foo");
    }

    #[test]
    fn test_cyclic_terms_rejected() {
        let result = ActiveContext::parse(None, &json!({"foo": "foo"}), &NoLoader);
        assert!(matches!(
            result,
            Err(JsonLdError::InvalidIriMapping { .. })
        ));
    }

    #[test]
    fn test_term_object_with_coercion() {
        let ctx = parse(json!({
            "ical": "http://www.w3.org/2002/12/cal/ical#",
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "dtstart": {"@id": "ical:dtstart", "@type": "xsd:dateTime"}
        }));

        let def = ctx.get("dtstart").unwrap();
        assert_eq!(def.iri, "http://www.w3.org/2002/12/cal/ical#dtstart");
        assert_eq!(
            def.coercion,
            Some(Coercion::Datatype(
                "http://www.w3.org/2001/XMLSchema#dateTime".to_string()
            ))
        );
    }

    #[test]
    fn test_deprecated_iri_and_coerce_keys() {
        let ctx = parse(json!({
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "homepage": {"@iri": "http://xmlns.com/foaf/0.1/homepage", "@coerce": "@iri"},
            "created": {"@iri": "http://purl.org/dc/terms/created", "@coerce": "xsd:date"}
        }));

        let homepage = ctx.get("homepage").unwrap();
        assert_eq!(homepage.iri, "http://xmlns.com/foaf/0.1/homepage");
        assert_eq!(homepage.coercion, Some(Coercion::Id));

        let created = ctx.get("created").unwrap();
        assert_eq!(
            created.coercion,
            Some(Coercion::Datatype(
                "http://www.w3.org/2001/XMLSchema#date".to_string()
            ))
        );
    }

    #[test]
    fn test_deprecated_coerce_block() {
        let ctx = parse(json!({
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "homepage": "http://xmlns.com/foaf/0.1/homepage",
            "created": "http://purl.org/dc/terms/created",
            "@coerce": {
                "@iri": ["homepage"],
                "xsd:date": "created"
            }
        }));

        assert_eq!(ctx.get("homepage").unwrap().coercion, Some(Coercion::Id));
        assert_eq!(
            ctx.get("created").unwrap().coercion,
            Some(Coercion::Datatype(
                "http://www.w3.org/2001/XMLSchema#date".to_string()
            ))
        );
    }

    #[test]
    fn test_deprecated_list_flag() {
        let ctx = parse(json!({
            "b": {"@id": "http://example.com/b", "@list": true}
        }));
        assert_eq!(ctx.get("b").unwrap().container, Some(Container::List));
    }

    #[test]
    fn test_keyword_aliases() {
        let ctx = parse(json!({
            "id": "@id",
            "type": "@type",
            "schema": "http://schema.org/"
        }));

        assert_eq!(ctx.keyword("id"), Some(Keyword::Id));
        assert_eq!(ctx.keyword("type"), Some(Keyword::Type));
        assert_eq!(ctx.keyword("@type"), Some(Keyword::Type));
        assert_eq!(ctx.keyword("schema"), None);
        assert_eq!(ctx.alias_for(Keyword::Id), "id");
        assert_eq!(ctx.alias_for(Keyword::Graph), "@graph");
    }

    #[test]
    fn test_expand_iri() {
        let ctx = parse(json!({
            "@base": "http://base.example/",
            "@vocab": "http://vocab.example/",
            "schema": "http://schema.org/",
            "Person": "schema:Person"
        }));

        assert_eq!(ctx.expand_iri("Person", true), "http://schema.org/Person");
        assert_eq!(ctx.expand_iri("schema:name", true), "http://schema.org/name");
        assert_eq!(ctx.expand_iri("name", true), "http://vocab.example/name");
        assert_eq!(ctx.expand_iri("doc", false), "http://base.example/doc");
        assert_eq!(
            ctx.expand_iri("http://example.org/x", true),
            "http://example.org/x"
        );
        assert_eq!(ctx.expand_iri("@type", true), "@type");
    }

    #[test]
    fn test_empty_term() {
        let ctx = parse(json!({"": "http://example.com/"}));
        assert_eq!(ctx.expand_iri("", false), "http://example.com/");
    }

    #[test]
    fn test_blank_vocab_uses_base() {
        let ctx = parse(json!({
            "@base": "https://example.com/ledger/",
            "@vocab": ""
        }));
        assert_eq!(ctx.vocab, Some("https://example.com/ledger/".to_string()));
    }

    #[test]
    fn test_null_resets() {
        let base = parse(json!({"schema": "http://schema.org/"}));
        let cleared = ActiveContext::parse(Some(&base), &JsonValue::Null, &NoLoader).unwrap();
        assert!(!cleared.contains("schema"));
    }

    #[test]
    fn test_remote_context() {
        let loader = StaticLoader::new().with(
            "http://example.com/context",
            r#"{"@context": {"b": "http://example.com/b"}}"#,
        );
        let ctx =
            ActiveContext::parse(None, &json!("http://example.com/context"), &loader).unwrap();
        assert_eq!(ctx.get("b").unwrap().iri, "http://example.com/b");
        // The serialized form stays a reference
        assert_eq!(ctx.serialize(), json!("http://example.com/context"));
    }

    #[test]
    fn test_remote_context_failure() {
        let loader = StaticLoader::new().with("http://example.com/context", "not json");
        let err =
            ActiveContext::parse(None, &json!("http://example.com/context"), &loader).unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to parse remote context http://example.com/context"));

        let err = ActiveContext::parse(None, &json!("http://example.com/missing"), &loader)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse remote context"));
    }

    #[test]
    fn test_serialize_echoes_provided() {
        let source = json!({"b": {"@id": "http://example.com/b", "@list": true}});
        let ctx = parse(source.clone());
        assert_eq!(ctx.serialize(), source);
    }

    #[test]
    fn test_to_json_round_trip() {
        let ctx = parse(json!({
            "@vocab": "https://schema.org/",
            "@base": "https://example.com/",
            "schema": "http://schema.org/",
            "name": {"@id": "http://schema.org/name", "@type": "@id"},
            "nick": {"@id": "http://xmlns.com/foaf/0.1/nick", "@container": "@list"}
        }));

        let reparsed = parse(ctx.to_json());
        assert_eq!(reparsed.vocab, ctx.vocab);
        assert_eq!(reparsed.base, ctx.base);
        assert_eq!(reparsed.get("name").unwrap().coercion, Some(Coercion::Id));
        assert_eq!(
            reparsed.get("nick").unwrap().container,
            Some(Container::List)
        );
    }

    #[test]
    fn test_to_json_empty() {
        assert_eq!(ActiveContext::new().to_json(), JsonValue::Null);
    }
}
