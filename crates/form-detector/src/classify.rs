//! Field classification heuristics shared by detection, fill and capture.

use serde::{Deserialize, Serialize};

use crate::model::FieldSnapshot;

const USERNAME_HINTS: [&str; 2] = ["user", "email"];
/// Button-like types never hold a typed value.
const BUTTON_TYPES: [&str; 4] = ["submit", "reset", "button", "image"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRole {
    Password,
    UsernameLike,
    Other,
}

/// Effective `type` of a control, as the DOM reports it for the element's tag.
///
/// A missing attribute means `text` on `<input>`. Other tags have fixed types:
/// `<textarea>` is `textarea`, `<select>` is `select-one` unless marked multiple, and
/// `<button>` is `submit` unless it is a `reset` or plain `button`.
pub fn field_type(field: &FieldSnapshot) -> String {
    let raw = field.input_type.trim().to_ascii_lowercase();
    match field.tag.trim().to_ascii_lowercase().as_str() {
        "textarea" => "textarea".to_string(),
        "select" if raw == "select-multiple" => raw,
        "select" => "select-one".to_string(),
        "button" if raw == "reset" || raw == "button" => raw,
        "button" => "submit".to_string(),
        _ if raw.is_empty() => "text".to_string(),
        _ => raw,
    }
}

fn is_text_entry(kind: &str) -> bool {
    kind == "text" || kind == "email"
}

/// Whether a value can be typed into a control of this type.
fn holds_text(kind: &str) -> bool {
    !BUTTON_TYPES.contains(&kind) && !kind.starts_with("select-")
}

/// Password wins over username-like so a single control never plays both roles.
pub fn classify(field: &FieldSnapshot) -> FieldRole {
    let kind = field_type(field);
    if kind == "password" {
        FieldRole::Password
    } else if is_text_entry(&kind) || (holds_text(&kind) && has_username_hint(field)) {
        FieldRole::UsernameLike
    } else {
        FieldRole::Other
    }
}

pub fn is_password(field: &FieldSnapshot) -> bool {
    classify(field) == FieldRole::Password
}

pub fn is_username_like(field: &FieldSnapshot) -> bool {
    classify(field) == FieldRole::UsernameLike
}

/// A text/email control whose name or id also names a user or email.
pub fn is_strong_username(field: &FieldSnapshot) -> bool {
    is_text_entry(&field_type(field)) && has_username_hint(field)
}

fn has_username_hint(field: &FieldSnapshot) -> bool {
    let name = field.name.to_lowercase();
    let id = field.dom_id.to_lowercase();
    USERNAME_HINTS
        .iter()
        .any(|hint| name.contains(hint) || id.contains(hint))
}
