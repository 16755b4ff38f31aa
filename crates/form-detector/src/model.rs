use std::fmt;

use keyfill_core_types::{ElementId, FormId};
use serde::{Deserialize, Serialize};

/// Point-in-time view of one form control.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub element: ElementId,
    pub tag: String,
    pub input_type: String,
    pub name: String,
    pub dom_id: String,
    pub value: String,
}

impl fmt::Debug for FieldSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSnapshot")
            .field("element", &self.element)
            .field("tag", &self.tag)
            .field("input_type", &self.input_type)
            .field("name", &self.name)
            .field("dom_id", &self.dom_id)
            .field("value_len", &self.value.len())
            .finish()
    }
}

/// Controls of one declared form, in document order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub id: FormId,
    pub fields: Vec<FieldSnapshot>,
}

impl FormSnapshot {
    pub fn field(&self, element: &ElementId) -> Option<&FieldSnapshot> {
        self.fields.iter().find(|field| &field.element == element)
    }
}

/// A form classified as a login form. Only valid for the detection pass that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedForm {
    pub form: FormId,
    pub username_field: Option<ElementId>,
    pub password_field: ElementId,
}

/// Values written into, or captured from, a login form.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOutcome {
    pub username_filled: bool,
    pub password_filled: bool,
}

impl FillOutcome {
    pub fn any(&self) -> bool {
        self.username_filled || self.password_filled
    }
}
