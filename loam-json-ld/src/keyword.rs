//! JSON-LD keywords
//!
//! Keywords are matched through this enum rather than by string comparison,
//! so aliased keys ("id" for "@id") and the deprecated spellings ("@iri",
//! "@literal") all resolve to the same variant.

/// The keywords the processor recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Context,
    Id,
    Type,
    Value,
    Language,
    List,
    Set,
    Graph,
}

impl Keyword {
    /// Parse a keyword string, accepting deprecated spellings
    ///
    /// `@iri` is the deprecated form of `@id`, `@literal` of `@value`.
    pub fn parse(s: &str) -> Option<Keyword> {
        match s {
            "@context" => Some(Keyword::Context),
            "@id" | "@iri" => Some(Keyword::Id),
            "@type" => Some(Keyword::Type),
            "@value" | "@literal" => Some(Keyword::Value),
            "@language" => Some(Keyword::Language),
            "@list" => Some(Keyword::List),
            "@set" => Some(Keyword::Set),
            "@graph" => Some(Keyword::Graph),
            _ => None,
        }
    }

    /// The canonical spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Context => "@context",
            Keyword::Id => "@id",
            Keyword::Type => "@type",
            Keyword::Value => "@value",
            Keyword::Language => "@language",
            Keyword::List => "@list",
            Keyword::Set => "@set",
            Keyword::Graph => "@graph",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
