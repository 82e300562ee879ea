//! JSON-LD processing for loam
//!
//! Implements the early-draft JSON-LD operations: context resolution
//! (including the deprecated `@iri` / `@coerce` / boolean-container term
//! syntax), document expansion and compaction, and conversion between
//! documents and the statement model in `loam-graph-ir`.
//!
//! All operations are driven by an [`Options`] value. Remote context
//! fetching goes through the [`ContextLoader`] trait and is disabled by
//! default.
//!
//! ```
//! use loam_json_ld::{expand, Options};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "@context": {"name": "http://schema.org/name"},
//!     "@id": "http://example.org/me",
//!     "name": "Gregg"
//! });
//! let expanded = expand(&doc, None, &Options::default()).unwrap();
//! assert_eq!(
//!     expanded,
//!     json!([{
//!         "@id": "http://example.org/me",
//!         "http://schema.org/name": [{"@value": "Gregg"}]
//!     }])
//! );
//! ```

mod compact;
pub mod context;
pub mod error;
mod expand;
mod from_rdf;
pub mod iri;
pub mod keyword;
pub mod loader;
mod to_rdf;
pub mod value;

pub use context::{ActiveContext, Coercion, Container, TermDefinition};
pub use error::{JsonLdError, Result};
pub use keyword::Keyword;
pub use loader::{ContextLoader, LoadError, NoLoader, RemoteDocument, StaticLoader};
pub use value::ValueObject;

// The statement model, re-exported for callers of the RDF conversions
pub use loam_graph_ir::{BlankNodeNamer, Dataset, Quad, QuadCollector, QuadSink, Term};

use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Processing options shared by all operations
#[derive(Clone)]
pub struct Options {
    /// Base IRI for resolving relative identifiers, applied beneath any
    /// `@base` the document declares
    pub base: Option<String>,
    /// When converting from statements, keep `rdf:type` as an ordinary
    /// predicate instead of folding it into `@type`
    pub use_rdf_type: bool,
    /// Reject keys that expand to neither an IRI nor a keyword
    pub validate: bool,
    /// Loader for remote context references
    pub loader: Arc<dyn ContextLoader>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base: None,
            use_rdf_type: false,
            validate: false,
            loader: Arc::new(NoLoader),
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("base", &self.base)
            .field("use_rdf_type", &self.use_rdf_type)
            .field("validate", &self.validate)
            .finish_non_exhaustive()
    }
}

fn base_context(opts: &Options) -> ActiveContext {
    let mut ctx = ActiveContext::new();
    ctx.base = opts.base.clone();
    ctx
}

/// Resolve a `@context` value to an [`ActiveContext`]
pub fn parse_context(source: &JsonValue, opts: &Options) -> Result<ActiveContext> {
    ActiveContext::parse(Some(&base_context(opts)), source, opts.loader.as_ref())
}

/// Expand a document
///
/// An external context supplied through `context` applies beneath any
/// `@context` the document itself declares. The result is always an array
/// of node objects: single-node documents wrap, and a document that is
/// nothing but a default graph unwraps to the array of its nodes.
pub fn expand(
    input: &JsonValue,
    context: Option<&JsonValue>,
    opts: &Options,
) -> Result<JsonValue> {
    tracing::debug!(has_context = context.is_some(), "expanding document");
    let active = match context {
        Some(ctx) => parse_context(ctx, opts)?,
        None => base_context(opts),
    };
    let expander = expand::Expander {
        loader: opts.loader.as_ref(),
        validate: opts.validate,
    };
    Ok(match expander.expand(input, &active)? {
        arr @ JsonValue::Array(_) => arr,
        single => JsonValue::Array(vec![single]),
    })
}

/// Compact a document against a context
///
/// The document is expanded first, so the input may be in any form. The
/// context used is `context` if supplied, otherwise the document's own
/// `@context`; whichever was used is echoed verbatim in the result. A
/// multi-node result nests its nodes under `@graph` so the context can sit
/// alongside them.
pub fn compact(
    input: &JsonValue,
    context: Option<&JsonValue>,
    opts: &Options,
) -> Result<JsonValue> {
    tracing::debug!(has_context = context.is_some(), "compacting document");
    let expanded = expand(input, None, opts)?;

    let raw = match context {
        Some(ctx) => Some(ctx.clone()),
        None => input.get("@context").cloned(),
    };
    let active = match &raw {
        Some(ctx) => parse_context(ctx, opts)?,
        None => base_context(opts),
    };
    // A single-node sequence compacts back to the node itself
    let compacted = match compact::compact(&expanded, &active)? {
        JsonValue::Array(mut nodes) if nodes.len() == 1 && nodes[0].is_object() => nodes.remove(0),
        other => other,
    };

    let keep_context = match &raw {
        Some(JsonValue::Null) | None => false,
        Some(JsonValue::Object(map)) => !map.is_empty(),
        Some(_) => true,
    };
    if !keep_context {
        return Ok(compacted);
    }
    let raw = raw.unwrap_or(JsonValue::Null);

    let mut result = Map::new();
    result.insert("@context".to_string(), raw);
    match compacted {
        JsonValue::Object(map) => {
            for (key, value) in map {
                result.insert(key, value);
            }
        }
        JsonValue::Array(nodes) => {
            result.insert(
                active.alias_for(Keyword::Graph).to_string(),
                JsonValue::Array(nodes),
            );
        }
        JsonValue::String(id) => {
            result.insert(active.alias_for(Keyword::Id).to_string(), JsonValue::String(id));
        }
        other => {
            return Err(JsonLdError::Processing {
                message: format!("unexpected compaction result: {}", other),
            })
        }
    }
    Ok(JsonValue::Object(result))
}

/// Convert a document to statements
///
/// Blank node labels are assigned from a fresh namer, so conversion is
/// deterministic for a given document.
pub fn to_rdf(
    input: &JsonValue,
    context: Option<&JsonValue>,
    opts: &Options,
) -> Result<Dataset> {
    let mut collector = QuadCollector::new();
    let mut namer = BlankNodeNamer::default();
    to_rdf_with_sink(input, context, opts, &mut collector, &mut namer)?;
    Ok(collector.finish())
}

/// Convert a document to statements, streaming into a caller-supplied sink
pub fn to_rdf_with_sink(
    input: &JsonValue,
    context: Option<&JsonValue>,
    opts: &Options,
    sink: &mut dyn QuadSink,
    namer: &mut BlankNodeNamer,
) -> Result<()> {
    tracing::debug!("converting document to statements");
    let expanded = expand(input, context, opts)?;
    to_rdf::emit(&expanded, sink, namer)
}

/// Convert statements to an expanded document
///
/// Subjects come out sorted; named graphs nest under `@graph` in a
/// default-graph node naming them.
pub fn from_rdf(quads: &[Quad], opts: &Options) -> Result<JsonValue> {
    tracing::debug!(count = quads.len(), "converting statements to a document");
    from_rdf::from_quads(quads, opts.use_rdf_type)
}

/// Expand a single string to an IRI against a context
pub fn expand_iri(value: &str, ctx: &ActiveContext, vocab: bool) -> String {
    ctx.expand_iri(value, vocab)
}

/// Compact a single IRI against a context
pub fn compact_iri(iri: &str, ctx: &ActiveContext, vocab: bool) -> String {
    compact::compact_iri(iri, ctx, vocab)
}
