//! In-process run of both agents over the real bridge, driven by fixtures.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use extensions_bridge::{channel, push_channel, Router};
use keyfill_core_types::{ElementId, FormId, TabId};
use keyfill_credential_matcher::{CredentialRecord, InMemoryCredentialStore};
use keyfill_form_detector::{DocumentFixture, FillOutcome, StaticDocument};
use keyfill_page_agent::{PageAgent, PageEvent, PageState, RecordingPrompt};
use keyfill_vault_agent::{StaticSettings, VaultAgent};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::AppConfig;

const SIMULATED_TAB: TabId = TabId(1);
const STORE_POLL: Duration = Duration::from_millis(5);

/// What the simulated user does once the autofill prompt appears.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PromptChoice {
    #[default]
    Accept,
    Dismiss,
    Ignore,
}

#[derive(Clone, Debug, Default)]
pub struct Scenario {
    pub page: DocumentFixture,
    pub records: Vec<CredentialRecord>,
    pub prompt: PromptChoice,
    /// Fill the focused field with a generated password after the autofill flow.
    pub generate: bool,
    /// Submit this form last, after any fill or generation.
    pub submit: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FillSummary {
    pub form: FormId,
    pub outcome: FillOutcome,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub final_state: PageState,
    pub states: Vec<PageState>,
    pub prompt_shown: bool,
    pub fill: Option<FillSummary>,
    pub generated: Option<ElementId>,
    pub captured: bool,
    pub stored_records: usize,
}

struct Observer {
    events: broadcast::Receiver<PageEvent>,
    states: Vec<PageState>,
    fill: Option<FillSummary>,
}

impl Observer {
    fn new(events: broadcast::Receiver<PageEvent>) -> Self {
        Self {
            events,
            states: Vec::new(),
            fill: None,
        }
    }

    fn record(&mut self, event: PageEvent) -> Option<PageState> {
        match event {
            PageEvent::StateChanged { to, .. } => {
                self.states.push(to);
                return Some(to);
            }
            PageEvent::Filled { form, outcome } => self.fill = Some(FillSummary { form, outcome }),
            _ => {}
        }
        None
    }

    /// Wait until a state accepted by `done` is entered, or `limit` passes.
    async fn until(
        &mut self,
        limit: Duration,
        done: impl Fn(PageState) -> bool,
    ) -> Option<PageState> {
        let deadline = Instant::now() + limit;
        loop {
            match tokio::time::timeout_at(deadline, self.events.recv()).await {
                Ok(Ok(event)) => {
                    if let Some(state) = self.record(event) {
                        if done(state) {
                            return Some(state);
                        }
                    }
                }
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    debug!(target: "keyfill", skipped, "observer lagged");
                }
                Ok(Err(broadcast::error::RecvError::Closed)) | Err(_) => return None,
            }
        }
    }

    fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.record(event);
        }
    }
}

pub async fn run_simulation(config: &AppConfig, scenario: Scenario) -> Result<SimulationReport> {
    let store = Arc::new(InMemoryCredentialStore::with_records(scenario.records));
    let vault = VaultAgent::builder(
        store.clone(),
        Arc::new(StaticSettings::new(config.settings.clone())),
    )
    .with_default_policy(config.generator)
    .build();

    let bridge = config.bridge_config();
    let (client, endpoint) = channel(&bridge);
    let server = endpoint.serve(Router::new(vault.clone()));

    let document = Arc::new(
        StaticDocument::from_fixture(scenario.page).context("invalid page fixture")?,
    );
    let prompt = RecordingPrompt::new();
    let agent = PageAgent::new(
        document.clone(),
        Arc::new(client),
        prompt.clone(),
        config.page_config(),
    );
    let mut observer = Observer::new(agent.subscribe());

    let (push_tx, push_rx) = push_channel(bridge.queue_capacity);
    vault.attach_tab(SIMULATED_TAB, push_tx);
    let runner = agent.clone().run(push_rx);

    let round_trip = bridge.request_timeout() + Duration::from_secs(1);
    if vault.navigation_complete(SIMULATED_TAB).await {
        observer
            .until(round_trip, |state| {
                state == PageState::PromptShown || state.is_terminal()
            })
            .await;
    } else {
        info!(target: "keyfill", "autofill disabled, detection not requested");
    }

    if agent.state() == PageState::PromptShown {
        match scenario.prompt {
            PromptChoice::Accept => {
                agent.accept_prompt().await;
            }
            PromptChoice::Dismiss => {
                agent.dismiss_prompt();
            }
            PromptChoice::Ignore => {
                let limit = config.page.prompt_timeout + Duration::from_secs(1);
                observer
                    .until(limit, |state| state == PageState::TimedOut)
                    .await;
            }
        }
    }

    let generated = if scenario.generate {
        agent.generate_into_focused(None).await
    } else {
        None
    };

    let mut captured = false;
    if let Some(form_id) = scenario.submit {
        let form_id = FormId::new(form_id);
        let form = document
            .form(&form_id)
            .ok_or_else(|| anyhow!("page fixture has no form {form_id}"))?;
        let before = store.records();
        captured = agent.on_form_submit(&form).await;
        if captured && config.settings.auto_save {
            let deadline = Instant::now() + round_trip;
            while store.records() == before && Instant::now() < deadline {
                tokio::time::sleep(STORE_POLL).await;
            }
        }
    }

    observer.drain();
    let report = SimulationReport {
        final_state: agent.state(),
        states: observer.states,
        prompt_shown: !prompt.shown().is_empty(),
        fill: observer.fill,
        generated,
        captured,
        stored_records: store.len(),
    };

    vault.detach_tab(SIMULATED_TAB);
    runner.abort();
    server.abort();
    Ok(report)
}
