//! Page-side orchestration for keyfill.
//!
//! The agent reacts to vault pushes (`checkForLoginForm`, `fillCredentials`,
//! `generatePassword`) and to form submissions. Every failure on this side is logged and
//! swallowed: autofill must never break the hosting page.

pub mod agent;
pub mod config;
pub mod errors;
pub mod events;
pub mod prompt;
pub mod state;

pub use agent::PageAgent;
pub use config::PageAgentConfig;
pub use errors::PageAgentError;
pub use events::{DismissReason, PageEvent};
pub use prompt::{PromptController, PromptId, PromptSurface, RecordingPrompt};
pub use state::PageState;
