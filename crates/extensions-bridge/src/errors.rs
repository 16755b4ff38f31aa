use keyfill_core_types::RequestId;
use thiserror::Error;

/// Failures of the transport itself. Handler failures travel inside a `Reply` instead.
#[derive(Clone, Debug, Error)]
pub enum BridgeError {
    #[error("channel closed")]
    ChannelClosed,
    #[error("request {req_id} ({action}) unanswered after {timeout_ms}ms")]
    Unanswered {
        req_id: RequestId,
        action: String,
        timeout_ms: u64,
    },
    #[error("encode error: {0}")]
    Encode(String),
}

/// Error produced by a vault handler; converted to `{success:false, error}` by the router.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
