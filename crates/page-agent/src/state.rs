use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of one page load.
///
/// ```text
/// Idle -> Detecting -> NoForm | HasForm
/// HasForm -> AwaitingMatchCheck -> NoCredentials | HasCredentials
/// HasCredentials -> PromptShown -> Accepted | Dismissed | TimedOut
/// Accepted -> FetchingCredentials -> Filled | FillSkipped
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    Idle,
    Detecting,
    NoForm,
    HasForm,
    AwaitingMatchCheck,
    NoCredentials,
    HasCredentials,
    PromptShown,
    Accepted,
    Dismissed,
    TimedOut,
    FetchingCredentials,
    Filled,
    FillSkipped,
}

impl PageState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PageState::NoForm
                | PageState::NoCredentials
                | PageState::Dismissed
                | PageState::TimedOut
                | PageState::Filled
                | PageState::FillSkipped
        )
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
