use keyfill_core_types::ElementId;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("element {0} is no longer attached")]
    Detached(ElementId),
    #[error("unknown element {0}")]
    UnknownElement(ElementId),
    #[error("invalid document fixture: {0}")]
    Fixture(String),
}
