use extensions_bridge::BridgeError;
use keyfill_core_types::ElementId;
use keyfill_form_detector::DocumentError;
use thiserror::Error;

/// Failures inside one page agent flow. Logged by the agent, never surfaced to the page.
#[derive(Clone, Debug, Error)]
pub enum PageAgentError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("vault rejected {action}: {reason}")]
    Rejected { action: &'static str, reason: String },
    #[error("no login form on page")]
    NoLoginForm,
    #[error("vault returned no credentials")]
    NoCredentials,
    #[error("no focused element")]
    NoFocus,
    #[error("element {0} does not accept a generated password")]
    NotEditable(ElementId),
}
