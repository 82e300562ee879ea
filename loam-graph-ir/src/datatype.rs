//! Literal datatype IRIs

use loam_vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Datatype of a literal term
///
/// Always holds a full, expanded IRI. Constructors are provided for the
/// datatypes the converters produce themselves; any other IRI can be carried
/// through [`Datatype::iri`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Datatype(Arc<str>);

impl Datatype {
    /// Create a datatype from a full IRI
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Self(Arc::from(iri.as_ref()))
    }

    /// xsd:string
    pub fn xsd_string() -> Self {
        Self::iri(xsd::STRING)
    }

    /// xsd:boolean
    pub fn xsd_boolean() -> Self {
        Self::iri(xsd::BOOLEAN)
    }

    /// xsd:integer
    pub fn xsd_integer() -> Self {
        Self::iri(xsd::INTEGER)
    }

    /// xsd:decimal
    pub fn xsd_decimal() -> Self {
        Self::iri(xsd::DECIMAL)
    }

    /// xsd:double
    pub fn xsd_double() -> Self {
        Self::iri(xsd::DOUBLE)
    }

    /// rdf:langString
    pub fn rdf_lang_string() -> Self {
        Self::iri(rdf::LANG_STRING)
    }

    /// Get the datatype IRI
    pub fn as_iri(&self) -> &str {
        &self.0
    }

    /// Check if this is xsd:string
    pub fn is_xsd_string(&self) -> bool {
        &*self.0 == xsd::STRING
    }

    /// Check if this is rdf:langString
    pub fn is_lang_string(&self) -> bool {
        &*self.0 == rdf::LANG_STRING
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
