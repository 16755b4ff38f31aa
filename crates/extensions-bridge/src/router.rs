use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::HandlerError;
use crate::protocol::{
    Action, CredentialPayload, GeneratePasswordRequest, Reply, VaultRequest,
};

/// Operations the vault agent exposes over the channel.
#[async_trait]
pub trait VaultHandler: Send + Sync {
    async fn get_credentials(&self, url: &str) -> Result<Vec<CredentialPayload>, HandlerError>;
    async fn save_credentials(&self, credentials: CredentialPayload) -> Result<(), HandlerError>;
    async fn generate_password(
        &self,
        request: GeneratePasswordRequest,
    ) -> Result<String, HandlerError>;
    async fn check_login_form(&self, url: &str) -> Result<bool, HandlerError>;
}

/// Maps raw messages onto handler calls.
pub struct Router {
    handler: Arc<dyn VaultHandler>,
}

impl Router {
    pub fn new(handler: Arc<dyn VaultHandler>) -> Arc<Self> {
        Arc::new(Self { handler })
    }

    /// Route a raw message.
    ///
    /// Returns `None` for messages whose action is not recognised; those get no reply.
    /// Every recognised action yields exactly one reply, failures included.
    pub async fn dispatch(&self, message: &Value) -> Option<Reply> {
        let name = message.get("action").and_then(Value::as_str);
        let Some(action) = name.and_then(Action::parse) else {
            debug!(target: "extensions-bridge", action = ?name, "ignoring unrecognised action");
            return None;
        };

        match serde_json::from_value::<VaultRequest>(message.clone()) {
            Ok(request) => Some(self.handle(request).await),
            Err(err) => {
                warn!(target: "extensions-bridge", %action, "malformed request: {err}");
                Some(Reply::failure(format!("malformed {action} request: {err}")))
            }
        }
    }

    pub async fn handle(&self, request: VaultRequest) -> Reply {
        let action = request.action();
        let result = match request {
            VaultRequest::GetCredentials { url } => self
                .handler
                .get_credentials(&url)
                .await
                .map(Reply::with_credentials),
            VaultRequest::SaveCredentials { credentials } => self
                .handler
                .save_credentials(credentials)
                .await
                .map(|_| Reply::ok()),
            VaultRequest::GeneratePassword(request) => self
                .handler
                .generate_password(request)
                .await
                .map(Reply::with_password),
            VaultRequest::CheckLoginForm { url } => self
                .handler
                .check_login_form(&url)
                .await
                .map(Reply::with_has_credentials),
        };

        result.unwrap_or_else(|err| {
            warn!(target: "extensions-bridge", %action, "handler failed: {err}");
            Reply::failure(err.to_string())
        })
    }
}
