use keyfill_core_types::{ElementId, FormId};
use keyfill_form_detector::FillOutcome;
use serde::{Deserialize, Serialize};

use crate::prompt::PromptId;
use crate::state::PageState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    Accepted,
    Dismissed,
    TimedOut,
    Replaced,
}

/// Observable page agent activity. Never carries secret values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PageEvent {
    StateChanged { from: PageState, to: PageState },
    PromptShown { prompt: PromptId },
    PromptRemoved { prompt: PromptId, reason: DismissReason },
    Filled { form: FormId, outcome: FillOutcome },
    CredentialsCaptured { form: FormId },
    PasswordGenerated { element: ElementId },
}
