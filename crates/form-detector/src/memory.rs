//! In-memory [`PageDocument`] backed by a declarative fixture.

use std::collections::HashSet;

use async_trait::async_trait;
use keyfill_core_types::{ElementId, FormId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::DocumentError;
use crate::model::{FieldSnapshot, FormSnapshot};
use crate::ports::PageDocument;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocumentFixture {
    pub url: String,
    #[serde(default)]
    pub forms: Vec<FormFixture>,
    #[serde(default)]
    pub focused: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FormFixture {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldFixture>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldFixture {
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(rename = "type", default)]
    pub input_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: String,
}

fn default_tag() -> String {
    "input".to_string()
}

impl FieldFixture {
    pub fn input(input_type: &str, name: &str) -> Self {
        Self {
            handle: None,
            tag: default_tag(),
            input_type: input_type.to_string(),
            name: name.to_string(),
            id: String::new(),
            value: String::new(),
        }
    }

    pub fn with_handle(mut self, handle: &str) -> Self {
        self.handle = Some(handle.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }
}

impl FormFixture {
    pub fn new(id: &str, fields: Vec<FieldFixture>) -> Self {
        Self {
            id: Some(id.to_string()),
            fields,
        }
    }
}

struct DocumentState {
    url: String,
    forms: Vec<FormSnapshot>,
    focused: Option<ElementId>,
    detached: HashSet<ElementId>,
    input_events: Vec<ElementId>,
}

impl DocumentState {
    fn field_mut(&mut self, element: &ElementId) -> Option<&mut FieldSnapshot> {
        self.forms
            .iter_mut()
            .flat_map(|form| form.fields.iter_mut())
            .find(|field| &field.element == element)
    }

    fn field(&self, element: &ElementId) -> Option<&FieldSnapshot> {
        self.forms
            .iter()
            .flat_map(|form| form.fields.iter())
            .find(|field| &field.element == element)
    }

    fn ensure_attached(&self, element: &ElementId) -> Result<(), DocumentError> {
        if self.detached.contains(element) {
            return Err(DocumentError::Detached(element.clone()));
        }
        if self.field(element).is_none() {
            return Err(DocumentError::UnknownElement(element.clone()));
        }
        Ok(())
    }
}

/// Document used by tests and the CLI simulator.
pub struct StaticDocument {
    state: Mutex<DocumentState>,
}

impl StaticDocument {
    pub fn from_fixture(fixture: DocumentFixture) -> Result<Self, DocumentError> {
        let mut seen = HashSet::new();
        let mut forms = Vec::with_capacity(fixture.forms.len());
        for (form_idx, form) in fixture.forms.into_iter().enumerate() {
            let form_id = form.id.unwrap_or_else(|| format!("form{form_idx}"));
            let mut fields = Vec::with_capacity(form.fields.len());
            for (field_idx, field) in form.fields.into_iter().enumerate() {
                let handle = field
                    .handle
                    .unwrap_or_else(|| format!("{form_id}:{field_idx}"));
                let element = ElementId::new(handle);
                if !seen.insert(element.clone()) {
                    return Err(DocumentError::Fixture(format!(
                        "duplicate element handle {element}"
                    )));
                }
                fields.push(FieldSnapshot {
                    element,
                    tag: field.tag,
                    input_type: field.input_type,
                    name: field.name,
                    dom_id: field.id,
                    value: field.value,
                });
            }
            forms.push(FormSnapshot {
                id: FormId::new(form_id),
                fields,
            });
        }

        let focused = fixture.focused.map(ElementId::new);
        if let Some(element) = &focused {
            if !seen.contains(element) {
                return Err(DocumentError::Fixture(format!(
                    "focused element {element} does not exist"
                )));
            }
        }

        Ok(Self {
            state: Mutex::new(DocumentState {
                url: fixture.url,
                forms,
                focused,
                detached: HashSet::new(),
                input_events: Vec::new(),
            }),
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DocumentError> {
        let fixture: DocumentFixture =
            serde_json::from_str(raw).map_err(|err| DocumentError::Fixture(err.to_string()))?;
        Self::from_fixture(fixture)
    }

    pub fn value_of(&self, element: &ElementId) -> Option<String> {
        self.state.lock().field(element).map(|field| field.value.clone())
    }

    /// Simulate the user typing into a field, without firing events.
    pub fn type_into(&self, element: &ElementId, value: &str) -> Result<(), DocumentError> {
        let mut state = self.state.lock();
        state.ensure_attached(element)?;
        if let Some(field) = state.field_mut(element) {
            field.value = value.to_string();
        }
        Ok(())
    }

    pub fn focus(&self, element: Option<ElementId>) {
        self.state.lock().focused = element;
    }

    pub fn detach(&self, element: &ElementId) {
        self.state.lock().detached.insert(element.clone());
    }

    pub fn form(&self, id: &FormId) -> Option<FormSnapshot> {
        self.state
            .lock()
            .forms
            .iter()
            .find(|form| &form.id == id)
            .cloned()
    }

    /// Elements that received an `input` event, in dispatch order.
    pub fn input_events(&self) -> Vec<ElementId> {
        self.state.lock().input_events.clone()
    }
}

#[async_trait]
impl PageDocument for StaticDocument {
    async fn location(&self) -> String {
        self.state.lock().url.clone()
    }

    async fn forms(&self) -> Result<Vec<FormSnapshot>, DocumentError> {
        let state = self.state.lock();
        Ok(state
            .forms
            .iter()
            .map(|form| FormSnapshot {
                id: form.id.clone(),
                fields: form
                    .fields
                    .iter()
                    .filter(|field| !state.detached.contains(&field.element))
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn active_element(&self) -> Result<Option<FieldSnapshot>, DocumentError> {
        let state = self.state.lock();
        let Some(element) = state.focused.as_ref() else {
            return Ok(None);
        };
        if state.detached.contains(element) {
            return Ok(None);
        }
        Ok(state.field(element).cloned())
    }

    async fn set_value(&self, element: &ElementId, value: &str) -> Result<(), DocumentError> {
        let mut state = self.state.lock();
        state.ensure_attached(element)?;
        if let Some(field) = state.field_mut(element) {
            field.value = value.to_string();
        }
        Ok(())
    }

    async fn dispatch_input(&self, element: &ElementId) -> Result<(), DocumentError> {
        let mut state = self.state.lock();
        state.ensure_attached(element)?;
        state.input_events.push(element.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_default_to_form_and_position() {
        let doc = StaticDocument::from_fixture(DocumentFixture {
            url: "https://example.com".into(),
            forms: vec![FormFixture {
                id: None,
                fields: vec![FieldFixture::input("text", "user")],
            }],
            focused: None,
        })
        .unwrap();
        assert_eq!(doc.value_of(&ElementId::new("form0:0")), Some(String::new()));
    }

    #[test]
    fn duplicate_handles_are_rejected() {
        let fixture = DocumentFixture {
            url: "https://example.com".into(),
            forms: vec![FormFixture::new(
                "login",
                vec![
                    FieldFixture::input("text", "a").with_handle("x"),
                    FieldFixture::input("text", "b").with_handle("x"),
                ],
            )],
            focused: None,
        };
        assert!(matches!(
            StaticDocument::from_fixture(fixture),
            Err(DocumentError::Fixture(_))
        ));
    }

    #[test]
    fn json_fixture_parses() {
        let doc = StaticDocument::from_json_str(
            r#"{"url":"https://example.com/login","forms":[{"id":"f","fields":[{"type":"password","name":"pwd","handle":"p"}]}],"focused":"p"}"#,
        )
        .unwrap();
        assert_eq!(doc.value_of(&ElementId::new("p")), Some(String::new()));
    }
}
