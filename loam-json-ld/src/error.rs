use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JsonLdError {
    #[error("Invalid context: {message}")]
    InvalidContext { message: String },

    #[error("Invalid IRI mapping for term '{term}'")]
    InvalidIriMapping { term: String },

    #[error("@language cannot be used for values with a specified @type")]
    LanguageWithType,

    #[error("A list may not contain another list")]
    ListOfLists,

    #[error("List entry missing rdf:first: {node}")]
    ListMissingFirst { node: String },

    #[error("Processing error: {message}")]
    Processing { message: String },
}

pub type Result<T> = std::result::Result<T, JsonLdError>;
