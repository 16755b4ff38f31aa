use thiserror::Error;

/// Failure reported by a credential store. Display is the backend's message, verbatim.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("malformed origin '{input}': {reason}")]
pub struct MalformedOrigin {
    pub input: String,
    pub reason: String,
}
