//! Remote context loading
//!
//! Context values that are strings are treated as references to remote
//! context documents. Fetching is behind the [`ContextLoader`] trait so the
//! processor itself never performs I/O; callers plug in whatever transport
//! they have. [`StaticLoader`] serves documents from memory and is what the
//! tests use; [`NoLoader`] refuses every fetch and is the default.

use std::collections::HashMap;
use thiserror::Error;

/// A fetched remote context document
#[derive(Clone, Debug)]
pub struct RemoteDocument {
    /// The IRI the document was fetched from
    pub iri: String,
    /// Raw document body (JSON text)
    pub content: String,
}

/// Error raised by a [`ContextLoader`]
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct LoadError(pub String);

/// Fetches remote context documents by IRI
pub trait ContextLoader: Send + Sync {
    fn fetch(&self, iri: &str) -> Result<RemoteDocument, LoadError>;
}

/// A loader that refuses every fetch
///
/// This is the default: documents that reference remote contexts fail with
/// an invalid-context error unless the caller supplies a real loader.
#[derive(Debug, Default)]
pub struct NoLoader;

impl ContextLoader for NoLoader {
    fn fetch(&self, _iri: &str) -> Result<RemoteDocument, LoadError> {
        Err(LoadError("remote context loading disabled".to_string()))
    }
}

/// A loader backed by an in-memory map of IRI to document body
#[derive(Debug, Default)]
pub struct StaticLoader {
    documents: HashMap<String, String>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document body for an IRI
    pub fn insert(&mut self, iri: impl Into<String>, content: impl Into<String>) {
        self.documents.insert(iri.into(), content.into());
    }

    /// Builder-style registration
    pub fn with(mut self, iri: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(iri, content);
        self
    }
}

impl ContextLoader for StaticLoader {
    fn fetch(&self, iri: &str) -> Result<RemoteDocument, LoadError> {
        match self.documents.get(iri) {
            Some(content) => Ok(RemoteDocument {
                iri: iri.to_string(),
                content: content.clone(),
            }),
            None => Err(LoadError(format!("document not found: {}", iri))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_loader() {
        let loader = StaticLoader::new().with("http://example.com/ctx", r#"{"@context": {}}"#);
        let doc = loader.fetch("http://example.com/ctx").unwrap();
        assert_eq!(doc.iri, "http://example.com/ctx");
        assert!(doc.content.contains("@context"));

        assert!(loader.fetch("http://example.com/missing").is_err());
    }

    #[test]
    fn test_no_loader_refuses() {
        assert!(NoLoader.fetch("http://example.com/ctx").is_err());
    }
}
