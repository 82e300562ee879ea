//! Statement terms
//!
//! Every position of a [`Quad`](crate::Quad) holds a [`Term`]: an expanded
//! IRI, a blank node, or a literal. Literal values are kept in native form
//! next to an explicit datatype, so numbers and booleans cross the document
//! boundary without reparsing their lexical form. Ordering is total (blank
//! nodes, then IRIs, then literals) so datasets sort deterministically.

use crate::Datatype;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A blank node label, held without the `_:` marker
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankId(Arc<str>);

impl BlankId {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// The bare label
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `_:label` spelling used in serializations and node-map keys
    pub fn to_ntriples(&self) -> String {
        format!("_:{}", self.0)
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// A literal's payload in native form
///
/// Equality and hashing treat doubles by their bit pattern, so `NaN`
/// literals compare equal to themselves and terms can key hash maps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LiteralValue {
    String(Arc<str>),
    Boolean(bool),
    Integer(i64),
    Double(f64),
}

impl LiteralValue {
    pub fn string(s: impl AsRef<str>) -> Self {
        LiteralValue::String(Arc::from(s.as_ref()))
    }

    /// Lexical form, with the XSD spellings for non-finite doubles
    pub fn lexical(&self) -> String {
        match self {
            LiteralValue::String(s) => s.to_string(),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Integer(i) => i.to_string(),
            LiteralValue::Double(d) if d.is_nan() => "NaN".to_string(),
            LiteralValue::Double(d) if *d == f64::INFINITY => "INF".to_string(),
            LiteralValue::Double(d) if *d == f64::NEG_INFINITY => "-INF".to_string(),
            LiteralValue::Double(d) => d.to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LiteralValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LiteralValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric reading: integers widen to doubles
    pub fn as_double(&self) -> Option<f64> {
        match self {
            LiteralValue::Double(d) => Some(*d),
            LiteralValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            LiteralValue::String(_) => 0,
            LiteralValue::Boolean(_) => 1,
            LiteralValue::Integer(_) => 2,
            LiteralValue::Double(_) => 3,
        }
    }
}

impl PartialEq for LiteralValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LiteralValue::String(a), LiteralValue::String(b)) => a == b,
            (LiteralValue::Boolean(a), LiteralValue::Boolean(b)) => a == b,
            (LiteralValue::Integer(a), LiteralValue::Integer(b)) => a == b,
            (LiteralValue::Double(a), LiteralValue::Double(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for LiteralValue {}

impl Hash for LiteralValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            LiteralValue::String(s) => s.hash(state),
            LiteralValue::Boolean(b) => b.hash(state),
            LiteralValue::Integer(i) => i.hash(state),
            LiteralValue::Double(d) => d.to_bits().hash(state),
        }
    }
}

impl PartialOrd for LiteralValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LiteralValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (LiteralValue::String(a), LiteralValue::String(b)) => a.cmp(b),
            (LiteralValue::Boolean(a), LiteralValue::Boolean(b)) => a.cmp(b),
            (LiteralValue::Integer(a), LiteralValue::Integer(b)) => a.cmp(b),
            (LiteralValue::Double(a), LiteralValue::Double(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// One term of a statement
///
/// Invariants the producers maintain:
/// - `Iri` holds an expanded IRI, never a compact one
/// - a `language` tag implies the `rdf:langString` datatype
/// - predicates are always `Iri`; graph names are `Iri` or `BlankNode`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Term {
    Iri(Arc<str>),
    BlankNode(BlankId),
    Literal {
        value: LiteralValue,
        /// Always concrete; plain strings carry `xsd:string`
        datatype: Datatype,
        language: Option<Arc<str>>,
    },
}

impl Term {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankId::new(label))
    }

    /// `xsd:string` literal
    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Literal {
            value: LiteralValue::string(value),
            datatype: Datatype::xsd_string(),
            language: None,
        }
    }

    /// `xsd:boolean` literal
    pub fn boolean(value: bool) -> Self {
        Term::Literal {
            value: LiteralValue::Boolean(value),
            datatype: Datatype::xsd_boolean(),
            language: None,
        }
    }

    /// `xsd:integer` literal
    pub fn integer(value: i64) -> Self {
        Term::Literal {
            value: LiteralValue::Integer(value),
            datatype: Datatype::xsd_integer(),
            language: None,
        }
    }

    /// `xsd:double` literal
    pub fn double(value: f64) -> Self {
        Term::Literal {
            value: LiteralValue::Double(value),
            datatype: Datatype::xsd_double(),
            language: None,
        }
    }

    /// `rdf:langString` literal with a language tag
    pub fn lang_string(value: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal {
            value: LiteralValue::string(value),
            datatype: Datatype::rdf_lang_string(),
            language: Some(Arc::from(lang.as_ref())),
        }
    }

    /// Literal with an arbitrary datatype, value kept lexical
    pub fn typed(value: impl AsRef<str>, datatype: Datatype) -> Self {
        Term::Literal {
            value: LiteralValue::string(value),
            datatype,
            language: None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::BlankNode(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<(&LiteralValue, &Datatype, Option<&str>)> {
        match self {
            Term::Literal {
                value,
                datatype,
                language,
            } => Some((value, datatype, language.as_deref())),
            _ => None,
        }
    }

    /// Key for grouping statements by node: the IRI, or `_:label`
    ///
    /// Literals cannot name a node and return `None`.
    pub fn node_key(&self) -> Option<String> {
        match self {
            Term::Iri(iri) => Some(iri.to_string()),
            Term::BlankNode(id) => Some(id.to_ntriples()),
            Term::Literal { .. } => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Term::BlankNode(_) => 0,
            Term::Iri(_) => 1,
            Term::Literal { .. } => 2,
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Iri(a), Term::Iri(b)) => a == b,
            (Term::BlankNode(a), Term::BlankNode(b)) => a == b,
            (
                Term::Literal {
                    value: av,
                    datatype: ad,
                    language: al,
                },
                Term::Literal {
                    value: bv,
                    datatype: bd,
                    language: bl,
                },
            ) => av == bv && ad == bd && al == bl,
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Term::Iri(iri) => iri.hash(state),
            Term::BlankNode(id) => id.hash(state),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                value.hash(state);
                datatype.hash(state);
                language.hash(state);
            }
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Term::BlankNode(a), Term::BlankNode(b)) => a.cmp(b),
            (Term::Iri(a), Term::Iri(b)) => a.cmp(b),
            (
                Term::Literal {
                    value: av,
                    datatype: ad,
                    language: al,
                },
                Term::Literal {
                    value: bv,
                    datatype: bd,
                    language: bl,
                },
            ) => (ad, al, av).cmp(&(bd, bl, bv)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "{}", id),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", value.lexical())?;
                match language {
                    Some(lang) => write!(f, "@{}", lang),
                    None if !datatype.is_xsd_string() => {
                        write!(f, "^^<{}>", datatype.as_iri())
                    }
                    None => Ok(()),
                }
            }
        }
    }
}
