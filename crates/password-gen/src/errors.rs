use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("invalid generator policy: {0}")]
    InvalidPolicy(String),
}
