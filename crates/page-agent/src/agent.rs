use std::sync::{Arc, Weak};

use extensions_bridge::{
    CredentialPayload, GeneratePasswordRequest, PageCommand, Reply, VaultClient, VaultRequest,
};
use keyfill_core_types::{ElementId, FormId};
use keyfill_form_detector::classify::field_type;
use keyfill_form_detector::{
    analyze_form, detect_forms, extract_credentials, fill_login_form, write_value, DetectedForm,
    FillOutcome, FormSnapshot, LoginCredentials, PageDocument,
};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::PageAgentConfig;
use crate::errors::PageAgentError;
use crate::events::{DismissReason, PageEvent};
use crate::prompt::{PromptController, PromptId, PromptSurface};
use crate::state::PageState;

/// Autofill orchestrator living inside one page.
pub struct PageAgent {
    document: Arc<dyn PageDocument>,
    vault: Arc<dyn VaultClient>,
    prompt: PromptController,
    config: PageAgentConfig,
    state: Mutex<PageState>,
    events: broadcast::Sender<PageEvent>,
}

impl PageAgent {
    pub fn new(
        document: Arc<dyn PageDocument>,
        vault: Arc<dyn VaultClient>,
        surface: Arc<dyn PromptSurface>,
        config: PageAgentConfig,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Arc::new(Self {
            document,
            vault,
            prompt: PromptController::new(surface),
            config,
            state: Mutex::new(PageState::Idle),
            events,
        })
    }

    pub fn state(&self) -> PageState {
        *self.state.lock()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    pub fn active_prompt(&self) -> Option<PromptId> {
        self.prompt.active()
    }

    fn transition(&self, to: PageState) {
        let from = std::mem::replace(&mut *self.state.lock(), to);
        debug!(target: "page-agent", %from, %to, "state transition");
        self.publish(PageEvent::StateChanged { from, to });
    }

    fn publish(&self, event: PageEvent) {
        let _ = self.events.send(event);
    }

    /// Detection pass for the current page load, followed by the match check.
    #[instrument(skip_all, fields(location = tracing::field::Empty))]
    pub async fn run_detection(self: &Arc<Self>) -> PageState {
        self.transition(PageState::Detecting);
        let detected = match detect_forms(self.document.as_ref()).await {
            Ok(detected) => detected,
            Err(err) => {
                warn!(target: "page-agent", error = %err, "form detection failed");
                Vec::new()
            }
        };
        if detected.is_empty() {
            self.transition(PageState::NoForm);
            return PageState::NoForm;
        }
        self.transition(PageState::HasForm);

        let url = self.document.location().await;
        tracing::Span::current().record("location", url.as_str());
        self.transition(PageState::AwaitingMatchCheck);
        match self.check_login_form(url).await {
            Ok(true) => {
                self.transition(PageState::HasCredentials);
                self.show_prompt();
                PageState::PromptShown
            }
            Ok(false) => {
                self.transition(PageState::NoCredentials);
                PageState::NoCredentials
            }
            Err(err) => {
                warn!(target: "page-agent", error = %err, "match check failed");
                self.transition(PageState::NoCredentials);
                PageState::NoCredentials
            }
        }
    }

    async fn check_login_form(&self, url: String) -> Result<bool, PageAgentError> {
        let reply = self
            .vault
            .request(VaultRequest::CheckLoginForm { url })
            .await?;
        let reply = accepted(reply, "checkLoginForm")?;
        Ok(reply.has_credentials.unwrap_or(false))
    }

    fn show_prompt(self: &Arc<Self>) {
        let (id, cancelled, replaced) = self.prompt.open();
        if let Some(previous) = replaced {
            self.publish(PageEvent::PromptRemoved {
                prompt: previous,
                reason: DismissReason::Replaced,
            });
        }
        self.transition(PageState::PromptShown);
        self.publish(PageEvent::PromptShown { prompt: id });
        info!(target: "page-agent", prompt = %id, "autofill prompt shown");

        let agent: Weak<Self> = Arc::downgrade(self);
        let timeout = self.config.prompt_timeout();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    if let Some(agent) = agent.upgrade() {
                        agent.finish_prompt(id, DismissReason::TimedOut);
                    }
                }
            }
        });
    }

    /// Remove prompt `id` if it is still on screen. Returns false when it already went away.
    fn finish_prompt(&self, id: PromptId, reason: DismissReason) -> bool {
        if self.prompt.close(Some(id)).is_none() {
            return false;
        }
        let next = match reason {
            DismissReason::Accepted => PageState::Accepted,
            DismissReason::TimedOut => PageState::TimedOut,
            DismissReason::Dismissed | DismissReason::Replaced => PageState::Dismissed,
        };
        self.transition(next);
        self.publish(PageEvent::PromptRemoved { prompt: id, reason });
        debug!(target: "page-agent", prompt = %id, ?reason, "prompt removed");
        true
    }

    /// User dismissed the prompt. No-op when it is already gone.
    pub fn dismiss_prompt(&self) -> bool {
        match self.prompt.active() {
            Some(id) => self.finish_prompt(id, DismissReason::Dismissed),
            None => false,
        }
    }

    /// User chose "autofill" on the prompt.
    pub async fn accept_prompt(self: &Arc<Self>) -> PageState {
        let Some(id) = self.prompt.active() else {
            debug!(target: "page-agent", "accept without an active prompt");
            return self.state();
        };
        if !self.finish_prompt(id, DismissReason::Accepted) {
            return self.state();
        }
        self.fill_credentials(None).await
    }

    /// Fetch credentials for this page and write the first one into a login form.
    ///
    /// With a target element, the login form containing it is preferred.
    pub async fn fill_credentials(&self, target: Option<ElementId>) -> PageState {
        self.transition(PageState::FetchingCredentials);
        match self.fetch_and_fill(target.as_ref()).await {
            Ok((form, outcome)) => {
                info!(target: "page-agent", %form, ?outcome, "credentials filled");
                self.transition(PageState::Filled);
                self.publish(PageEvent::Filled { form, outcome });
                PageState::Filled
            }
            Err(err) => {
                warn!(target: "page-agent", error = %err, "autofill skipped");
                self.transition(PageState::FillSkipped);
                PageState::FillSkipped
            }
        }
    }

    async fn fetch_and_fill(
        &self,
        target: Option<&ElementId>,
    ) -> Result<(FormId, FillOutcome), PageAgentError> {
        let url = self.document.location().await;
        let reply = self
            .vault
            .request(VaultRequest::GetCredentials { url })
            .await?;
        let reply = accepted(reply, "getCredentials")?;
        let first = reply
            .credentials
            .and_then(|records| records.into_iter().next())
            .ok_or(PageAgentError::NoCredentials)?;
        let credentials = LoginCredentials::new(first.username, first.password);

        // Forms are re-read after the reply; the page may have changed meanwhile.
        let forms = self.document.forms().await?;
        let form = pick_form(&forms, target).ok_or(PageAgentError::NoLoginForm)?;
        let outcome = fill_login_form(self.document.as_ref(), &form, &credentials).await?;
        Ok((form.form, outcome))
    }

    /// Ask the vault for a password and write it into the focused field.
    pub async fn generate_into_focused(&self, target: Option<ElementId>) -> Option<ElementId> {
        match self.try_generate(target).await {
            Ok(element) => {
                info!(target: "page-agent", %element, "generated password written");
                self.publish(PageEvent::PasswordGenerated {
                    element: element.clone(),
                });
                Some(element)
            }
            Err(err) => {
                warn!(target: "page-agent", error = %err, "password generation skipped");
                None
            }
        }
    }

    async fn try_generate(&self, target: Option<ElementId>) -> Result<ElementId, PageAgentError> {
        let focused = self
            .document
            .active_element()
            .await?
            .ok_or(PageAgentError::NoFocus)?;
        if let Some(target) = &target {
            if target != &focused.element {
                debug!(
                    target: "page-agent",
                    requested = %target,
                    focused = %focused.element,
                    "generating into focused element instead of menu target"
                );
            }
        }
        let kind = field_type(&focused);
        if !focused.tag.eq_ignore_ascii_case("input") || (kind != "password" && kind != "text") {
            return Err(PageAgentError::NotEditable(focused.element));
        }

        let reply = self
            .vault
            .request(VaultRequest::GeneratePassword(
                GeneratePasswordRequest::default(),
            ))
            .await?;
        let reply = accepted(reply, "generatePassword")?;
        let password = reply.password.unwrap_or_default();
        if password.is_empty() {
            return Err(PageAgentError::Rejected {
                action: "generatePassword",
                reason: "empty password".to_string(),
            });
        }
        write_value(self.document.as_ref(), &focused.element, &password).await?;
        Ok(focused.element)
    }

    /// Submit hook. Sends the submitted login to the vault when both values are present.
    pub async fn on_form_submit(&self, form: &FormSnapshot) -> bool {
        let Some(credentials) = extract_credentials(form) else {
            debug!(target: "page-agent", form = %form.id, "submit without capturable login");
            return false;
        };
        let url = self.document.location().await;
        let request = VaultRequest::SaveCredentials {
            credentials: CredentialPayload {
                username: credentials.username,
                password: credentials.password,
                url,
            },
        };
        match self.vault.notify(request).await {
            Ok(()) => {
                info!(target: "page-agent", form = %form.id, "submitted credentials captured");
                self.publish(PageEvent::CredentialsCaptured {
                    form: form.id.clone(),
                });
                true
            }
            Err(err) => {
                warn!(target: "page-agent", error = %err, "could not send captured credentials");
                false
            }
        }
    }

    pub async fn handle_command(self: &Arc<Self>, command: PageCommand) {
        debug!(target: "page-agent", ?command, "push received");
        match command {
            PageCommand::CheckForLoginForm => {
                self.run_detection().await;
            }
            PageCommand::FillCredentials { target_element_id } => {
                if let Some(id) = self.prompt.active() {
                    self.finish_prompt(id, DismissReason::Accepted);
                }
                self.fill_credentials(target_element_id.map(ElementId::new))
                    .await;
            }
            PageCommand::GeneratePassword { target_element_id } => {
                self.generate_into_focused(target_element_id.map(ElementId::new))
                    .await;
            }
        }
    }

    /// Process vault pushes one at a time until the push channel closes.
    pub fn run(self: Arc<Self>, mut commands: mpsc::Receiver<PageCommand>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(command) = commands.recv().await {
                self.handle_command(command).await;
            }
            debug!(target: "page-agent", "push channel closed");
        })
    }
}

fn accepted(reply: Reply, action: &'static str) -> Result<Reply, PageAgentError> {
    if reply.success {
        Ok(reply)
    } else {
        Err(PageAgentError::Rejected {
            action,
            reason: reply.error.unwrap_or_default(),
        })
    }
}

fn pick_form(forms: &[FormSnapshot], target: Option<&ElementId>) -> Option<DetectedForm> {
    let mut first = None;
    for form in forms {
        let Some(detected) = analyze_form(form) else {
            continue;
        };
        match target {
            Some(element) if form.field(element).is_some() => return Some(detected),
            _ => {
                first.get_or_insert(detected);
            }
        }
    }
    first
}
