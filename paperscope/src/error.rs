//! Error types for PaperScope

use thiserror::Error;

/// Result type alias for PaperScope operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Required credentials or endpoints are missing
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The paper search service failed or returned an error status
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A response could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    /// The vector store rejected or failed a request
    #[error("store error: {0}")]
    Store(String),

    /// The language model call failed
    #[error("llm error: {0}")]
    Llm(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// True for failures caused by an external service rather than by
    /// missing configuration.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Error::NotConfigured(_))
    }
}
