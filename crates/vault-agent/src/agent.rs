use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use extensions_bridge::{
    CredentialPayload, GeneratePasswordRequest, HandlerError, PageCommand, PushSender,
    VaultHandler,
};
use keyfill_core_types::TabId;
use keyfill_credential_matcher::{
    find_matching, normalize_origin, CredentialRecord, CredentialStore,
};
use keyfill_password_gen::GeneratorPolicy;
use tracing::{debug, info, instrument, warn};

use crate::menu::MenuItem;
use crate::settings::{Settings, SettingsStore};

pub const AUTO_SAVE_DISABLED: &str = "auto-save disabled";

pub struct VaultAgentBuilder {
    store: Arc<dyn CredentialStore>,
    settings: Arc<dyn SettingsStore>,
    default_policy: GeneratorPolicy,
}

impl VaultAgentBuilder {
    pub fn new(store: Arc<dyn CredentialStore>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            settings,
            default_policy: GeneratorPolicy::default(),
        }
    }

    pub fn with_default_policy(mut self, policy: GeneratorPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn build(self) -> Arc<VaultAgent> {
        Arc::new(VaultAgent {
            store: self.store,
            settings: self.settings,
            default_policy: self.default_policy,
            tabs: DashMap::new(),
        })
    }
}

/// Privileged side: owns the credential store and the generator.
pub struct VaultAgent {
    store: Arc<dyn CredentialStore>,
    settings: Arc<dyn SettingsStore>,
    default_policy: GeneratorPolicy,
    tabs: DashMap<TabId, PushSender>,
}

impl VaultAgent {
    pub fn builder(
        store: Arc<dyn CredentialStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> VaultAgentBuilder {
        VaultAgentBuilder::new(store, settings)
    }

    pub fn attach_tab(&self, tab: TabId, sender: PushSender) {
        debug!(target: "vault-agent", %tab, "page agent attached");
        self.tabs.insert(tab, sender);
    }

    pub fn detach_tab(&self, tab: TabId) {
        if self.tabs.remove(&tab).is_some() {
            debug!(target: "vault-agent", %tab, "page agent detached");
        }
    }

    /// Page finished loading. Asks the page to look for login forms when autofill is on.
    #[instrument(skip_all, fields(tab = %tab))]
    pub async fn navigation_complete(&self, tab: TabId) -> bool {
        let settings = self.current_settings().await;
        if !settings.auto_fill {
            debug!(target: "vault-agent", "autofill disabled, skipping detection");
            return false;
        }
        self.push(tab, PageCommand::CheckForLoginForm).await
    }

    pub async fn context_menu_clicked(
        &self,
        tab: TabId,
        item: MenuItem,
        target_element_id: Option<String>,
    ) -> bool {
        self.push(tab, item.command(target_element_id)).await
    }

    async fn push(&self, tab: TabId, command: PageCommand) -> bool {
        let sender = match self.tabs.get(&tab) {
            Some(entry) => entry.value().clone(),
            None => {
                warn!(target: "vault-agent", %tab, ?command, "no page agent attached");
                return false;
            }
        };
        if sender.send(command).await.is_err() {
            warn!(target: "vault-agent", %tab, "page agent gone, dropping tab");
            self.tabs.remove(&tab);
            return false;
        }
        true
    }

    async fn current_settings(&self) -> Settings {
        match self.settings.load().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(target: "vault-agent", "settings unavailable, autofill off: {err}");
                Settings {
                    auto_fill: false,
                    auto_save: false,
                    ..Settings::default()
                }
            }
        }
    }

    async fn matching_records(&self, url: &str) -> Result<Vec<CredentialRecord>, HandlerError> {
        let origin = match normalize_origin(url) {
            Ok(origin) => origin,
            Err(err) => {
                debug!(target: "vault-agent", %err, "request origin unusable");
                return Ok(Vec::new());
            }
        };
        let candidates = self
            .store
            .fetch_by_origin(&origin)
            .await
            .map_err(|err| HandlerError::new(err.to_string()))?;
        Ok(find_matching(&origin, &candidates))
    }

    fn policy_for(&self, request: &GeneratePasswordRequest) -> GeneratorPolicy {
        GeneratorPolicy {
            length: request.length.unwrap_or(self.default_policy.length),
            include_numbers: request
                .include_numbers
                .unwrap_or(self.default_policy.include_numbers),
            include_symbols: request
                .include_symbols
                .unwrap_or(self.default_policy.include_symbols),
        }
    }
}

#[async_trait]
impl VaultHandler for VaultAgent {
    async fn get_credentials(&self, url: &str) -> Result<Vec<CredentialPayload>, HandlerError> {
        let records = self.matching_records(url).await?;
        debug!(target: "vault-agent", matched = records.len(), "credentials requested");
        Ok(records
            .into_iter()
            .map(|record| CredentialPayload {
                username: record.username,
                password: record.secret,
                url: record.origin,
            })
            .collect())
    }

    async fn save_credentials(&self, credentials: CredentialPayload) -> Result<(), HandlerError> {
        if !self.current_settings().await.auto_save {
            return Err(HandlerError::new(AUTO_SAVE_DISABLED));
        }
        let origin =
            normalize_origin(&credentials.url).map_err(|err| HandlerError::new(err.to_string()))?;
        self.store
            .save(CredentialRecord::new(
                origin.clone(),
                credentials.username,
                credentials.password,
            ))
            .await
            .map_err(|err| HandlerError::new(err.to_string()))?;
        info!(target: "vault-agent", %origin, "captured credentials saved");
        Ok(())
    }

    async fn generate_password(
        &self,
        request: GeneratePasswordRequest,
    ) -> Result<String, HandlerError> {
        let policy = self.policy_for(&request);
        keyfill_password_gen::generate(&policy).map_err(|err| HandlerError::new(err.to_string()))
    }

    async fn check_login_form(&self, url: &str) -> Result<bool, HandlerError> {
        Ok(!self.matching_records(url).await?.is_empty())
    }
}
