//! Message protocol between the keyfill page agent and vault agent.
//!
//! Requests flow page → vault over a correlated request/response channel; the vault can
//! also push one-way [`PageCommand`]s to a page. Unknown actions are ignored, every known
//! action is answered exactly once, and handler failures are returned as
//! `{success: false, error}` replies rather than propagated across the boundary.

pub mod channel;
pub mod config;
pub mod errors;
pub mod protocol;
pub mod router;

pub use channel::{
    channel, push_channel, BridgeClient, BridgeEndpoint, BridgeEvent, BridgeEventBus,
    PushSender, ReplyEnvelope, RequestEnvelope, VaultClient,
};
pub use config::BridgeConfig;
pub use errors::{BridgeError, HandlerError};
pub use protocol::{
    Action, CredentialPayload, GeneratePasswordRequest, PageCommand, Reply, VaultRequest,
};
pub use router::{Router, VaultHandler};
