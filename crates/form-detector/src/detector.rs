use keyfill_core_types::ElementId;
use tracing::debug;

use crate::classify::{is_password, is_strong_username, is_username_like};
use crate::errors::DocumentError;
use crate::model::{DetectedForm, FillOutcome, FormSnapshot, LoginCredentials};
use crate::ports::PageDocument;

/// Classify one form. Qualifies only with a password field and a username-like field.
pub fn analyze_form(form: &FormSnapshot) -> Option<DetectedForm> {
    let password = form.fields.iter().find(|field| is_password(field))?;
    let username = form.fields.iter().find(|field| is_username_like(field))?;
    Some(DetectedForm {
        form: form.id.clone(),
        username_field: Some(username.element.clone()),
        password_field: password.element.clone(),
    })
}

pub async fn detect_forms(document: &dyn PageDocument) -> Result<Vec<DetectedForm>, DocumentError> {
    let forms = document.forms().await?;
    let detected: Vec<DetectedForm> = forms.iter().filter_map(analyze_form).collect();
    debug!(
        target: "form-detector",
        scanned = forms.len(),
        detected = detected.len(),
        "detection pass finished"
    );
    Ok(detected)
}

/// First qualifying form in document order.
pub async fn find_login_form(
    document: &dyn PageDocument,
) -> Result<Option<DetectedForm>, DocumentError> {
    Ok(detect_forms(document).await?.into_iter().next())
}

/// Assign a value and notify the page of the change.
pub async fn write_value(
    document: &dyn PageDocument,
    element: &ElementId,
    value: &str,
) -> Result<(), DocumentError> {
    document.set_value(element, value).await?;
    document.dispatch_input(element).await
}

/// Write credentials into a detected form. Empty values leave their field untouched.
pub async fn fill_login_form(
    document: &dyn PageDocument,
    form: &DetectedForm,
    credentials: &LoginCredentials,
) -> Result<FillOutcome, DocumentError> {
    let mut outcome = FillOutcome::default();

    if let Some(username_field) = &form.username_field {
        if !credentials.username.is_empty() {
            write_value(document, username_field, &credentials.username).await?;
            outcome.username_filled = true;
        }
    }

    if !credentials.password.is_empty() {
        write_value(document, &form.password_field, &credentials.password).await?;
        outcome.password_filled = true;
    }

    debug!(target: "form-detector", form = %form.form, ?outcome, "filled login form");
    Ok(outcome)
}

/// Pull submitted credentials out of a form. Both values must be present.
pub fn extract_credentials(form: &FormSnapshot) -> Option<LoginCredentials> {
    let password = form.fields.iter().find(|field| is_password(field))?;
    let username = form
        .fields
        .iter()
        .find(|field| is_strong_username(field))
        .or_else(|| form.fields.iter().find(|field| is_username_like(field)))?;

    if username.value.is_empty() || password.value.is_empty() {
        return None;
    }
    Some(LoginCredentials::new(
        username.value.clone(),
        password.value.clone(),
    ))
}
