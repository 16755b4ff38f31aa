use async_trait::async_trait;
use keyfill_core_types::ElementId;

use crate::errors::DocumentError;
use crate::model::{FieldSnapshot, FormSnapshot};

/// Capability surface the page agent needs from the hosting document.
#[async_trait]
pub trait PageDocument: Send + Sync {
    /// Full URL of the current page.
    async fn location(&self) -> String;

    /// Declared forms in document order.
    async fn forms(&self) -> Result<Vec<FormSnapshot>, DocumentError>;

    async fn active_element(&self) -> Result<Option<FieldSnapshot>, DocumentError>;

    async fn set_value(&self, element: &ElementId, value: &str) -> Result<(), DocumentError>;

    /// Fire a bubbling `input` event so reactive page code sees the new value.
    async fn dispatch_input(&self, element: &ElementId) -> Result<(), DocumentError>;
}
