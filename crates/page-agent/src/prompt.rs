use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub const PROMPT_MESSAGE: &str = "Saved credentials found for this site";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromptId(pub u64);

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prompt:{}", self.0)
    }
}

/// Renders the in-page autofill prompt. Styling is up to the implementation.
pub trait PromptSurface: Send + Sync {
    fn show(&self, prompt: PromptId, message: &str);
    fn remove(&self, prompt: PromptId);
}

struct ActivePrompt {
    id: PromptId,
    timer: CancellationToken,
}

/// Owns the single prompt slot of a page and its auto-dismiss timer token.
pub struct PromptController {
    surface: Arc<dyn PromptSurface>,
    next_id: AtomicU64,
    active: Mutex<Option<ActivePrompt>>,
}

impl PromptController {
    pub fn new(surface: Arc<dyn PromptSurface>) -> Self {
        Self {
            surface,
            next_id: AtomicU64::new(1),
            active: Mutex::new(None),
        }
    }

    /// Show a new prompt. A prompt already on screen is removed first and returned.
    pub fn open(&self) -> (PromptId, CancellationToken, Option<PromptId>) {
        let id = PromptId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let timer = CancellationToken::new();
        let replaced = {
            let mut active = self.active.lock();
            let previous = active.replace(ActivePrompt {
                id,
                timer: timer.clone(),
            });
            previous.map(|prev| {
                prev.timer.cancel();
                prev.id
            })
        };
        if let Some(prev) = replaced {
            self.surface.remove(prev);
        }
        self.surface.show(id, PROMPT_MESSAGE);
        (id, timer, replaced)
    }

    /// Remove the active prompt if it is `id` (or any prompt when `id` is `None`).
    ///
    /// Cancels its timer. Returns the removed prompt, `None` when nothing was on screen.
    pub fn close(&self, id: Option<PromptId>) -> Option<PromptId> {
        let removed = {
            let mut active = self.active.lock();
            match active.as_ref() {
                Some(current) if id.map_or(true, |wanted| wanted == current.id) => active.take(),
                _ => None,
            }
        }?;
        removed.timer.cancel();
        self.surface.remove(removed.id);
        Some(removed.id)
    }

    pub fn active(&self) -> Option<PromptId> {
        self.active.lock().as_ref().map(|prompt| prompt.id)
    }
}

/// Prompt surface that only records what would have been rendered.
#[derive(Default)]
pub struct RecordingPrompt {
    shown: Mutex<Vec<PromptId>>,
    removed: Mutex<Vec<PromptId>>,
}

impl RecordingPrompt {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shown(&self) -> Vec<PromptId> {
        self.shown.lock().clone()
    }

    pub fn removed(&self) -> Vec<PromptId> {
        self.removed.lock().clone()
    }

    pub fn visible(&self) -> usize {
        self.shown.lock().len() - self.removed.lock().len()
    }
}

impl PromptSurface for RecordingPrompt {
    fn show(&self, prompt: PromptId, _message: &str) {
        self.shown.lock().push(prompt);
    }

    fn remove(&self, prompt: PromptId) {
        self.removed.lock().push(prompt);
    }
}
