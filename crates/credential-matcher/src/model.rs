use std::fmt;

use serde::{Deserialize, Serialize};

/// A stored login. Never mutated in place; saving replaces the whole record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub origin: String,
    #[serde(default)]
    pub username: String,
    pub secret: String,
}

impl CredentialRecord {
    pub fn new(
        origin: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("origin", &self.origin)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}
