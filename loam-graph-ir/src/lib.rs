//! In-memory RDF statement model for the loam crates
//!
//! This crate defines the data structures shared by producers and consumers
//! of RDF statements:
//!
//! - [`Term`] - IRI, blank node, or literal
//! - [`Quad`] - a statement with an optional graph name
//! - [`Dataset`] - an ordered collection of quads
//! - [`BlankNodeNamer`] - deterministic blank node label allocation
//! - [`QuadSink`] - event-driven statement consumption

pub mod datatype;
pub mod namer;
pub mod quad;
pub mod sink;
pub mod term;

pub use datatype::Datatype;
pub use namer::BlankNodeNamer;
pub use quad::{Dataset, Quad};
pub use sink::{QuadCollector, QuadSink};
pub use term::{BlankId, LiteralValue, Term};
