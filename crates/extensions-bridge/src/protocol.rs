//! Wire shapes exchanged between the page agent and the vault agent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Actions the vault agent answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    GetCredentials,
    SaveCredentials,
    GeneratePassword,
    CheckLoginForm,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::GetCredentials,
        Action::SaveCredentials,
        Action::GeneratePassword,
        Action::CheckLoginForm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetCredentials => "getCredentials",
            Action::SaveCredentials => "saveCredentials",
            Action::GeneratePassword => "generatePassword",
            Action::CheckLoginForm => "checkLoginForm",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == raw)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page agent → vault agent request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum VaultRequest {
    GetCredentials { url: String },
    SaveCredentials { credentials: CredentialPayload },
    GeneratePassword(GeneratePasswordRequest),
    CheckLoginForm { url: String },
}

impl VaultRequest {
    pub fn action(&self) -> Action {
        match self {
            VaultRequest::GetCredentials { .. } => Action::GetCredentials,
            VaultRequest::SaveCredentials { .. } => Action::SaveCredentials,
            VaultRequest::GeneratePassword(_) => Action::GeneratePassword,
            VaultRequest::CheckLoginForm { .. } => Action::CheckLoginForm,
        }
    }
}

/// Login as it crosses the channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPayload {
    #[serde(default)]
    pub username: String,
    pub password: String,
    pub url: String,
}

impl fmt::Debug for CredentialPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPayload")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

/// Optional overrides; absent fields fall back to the vault's default policy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePasswordRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_numbers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_symbols: Option<bool>,
}

/// Vault agent → page agent reply. Exactly one per recognised request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<CredentialPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_credentials: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn with_credentials(credentials: Vec<CredentialPayload>) -> Self {
        Self {
            credentials: Some(credentials),
            ..Self::ok()
        }
    }

    pub fn with_has_credentials(has_credentials: bool) -> Self {
        Self {
            has_credentials: Some(has_credentials),
            ..Self::ok()
        }
    }

    pub fn with_password(password: String) -> Self {
        Self {
            password: Some(password),
            ..Self::ok()
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("success", &self.success)
            .field("credentials", &self.credentials)
            .field("has_credentials", &self.has_credentials)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("error", &self.error)
            .finish()
    }
}

/// One-way vault agent → page agent notification. No reply is expected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageCommand {
    CheckForLoginForm,
    FillCredentials {
        #[serde(rename = "targetElementId", default, skip_serializing_if = "Option::is_none")]
        target_element_id: Option<String>,
    },
    GeneratePassword {
        #[serde(rename = "targetElementId", default, skip_serializing_if = "Option::is_none")]
        target_element_id: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_use_action_tag_and_camel_case() {
        let request = VaultRequest::GeneratePassword(GeneratePasswordRequest {
            length: Some(20),
            include_numbers: None,
            include_symbols: Some(false),
        });
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "generatePassword", "length": 20, "includeSymbols": false})
        );

        let parsed: VaultRequest =
            serde_json::from_value(json!({"action": "checkLoginForm", "url": "https://a.test"}))
                .unwrap();
        assert_eq!(parsed.action(), Action::CheckLoginForm);
    }

    #[test]
    fn save_request_nests_credentials() {
        let parsed: VaultRequest = serde_json::from_value(json!({
            "action": "saveCredentials",
            "credentials": {"username": "u", "password": "p", "url": "https://a.test/login"}
        }))
        .unwrap();
        match parsed {
            VaultRequest::SaveCredentials { credentials } => {
                assert_eq!(credentials.username, "u");
                assert_eq!(credentials.url, "https://a.test/login");
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn replies_omit_absent_fields() {
        assert_eq!(
            serde_json::to_value(Reply::with_has_credentials(true)).unwrap(),
            json!({"success": true, "hasCredentials": true})
        );
        assert_eq!(
            serde_json::to_value(Reply::failure("boom")).unwrap(),
            json!({"success": false, "error": "boom"})
        );
    }

    #[test]
    fn push_commands_carry_target_element() {
        let command: PageCommand = serde_json::from_value(json!({
            "action": "fillCredentials",
            "targetElementId": "login:0"
        }))
        .unwrap();
        assert_eq!(
            command,
            PageCommand::FillCredentials {
                target_element_id: Some("login:0".into())
            }
        );
        let command: PageCommand =
            serde_json::from_value(json!({"action": "checkForLoginForm"})).unwrap();
        assert_eq!(command, PageCommand::CheckForLoginForm);
    }

    #[test]
    fn action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
        assert_eq!(Action::parse("deleteEverything"), None);
    }
}
