//! Field-scoped validation errors.
//!
//! Form validation failures are reported per attribute so the client can
//! render each message next to the field that caused it. The special `base`
//! key is reserved for failures that cannot be attributed to a field (for
//! example when the whole form payload is missing).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

/// Key used for errors that do not belong to a specific attribute.
pub const BASE: &str = "base";

/// Message attached to blank required attributes.
pub const MSG_BLANK: &str = "can't be blank";

/// Message returned when the expected top-level form key is absent.
pub const MSG_FORM_MISSING: &str = "Form data is missing. Please fill out the form and try again.";

/// Ordered map of attribute name to its error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single `base` error for a submission whose form key was absent.
    pub fn form_missing() -> Self {
        let mut errors = Self::new();
        errors.add(BASE, MSG_FORM_MISSING);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for one attribute (empty when none).
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fold another set of errors into this one.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field} {m}")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            for err in list.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// `validator` custom rule: the value must contain a non-whitespace character.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(MSG_BLANK.into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(custom(function = "not_blank"))]
        name: String,
    }

    #[test]
    fn form_missing_is_a_single_base_error() {
        let errors = FieldErrors::form_missing();
        assert_eq!(errors.get(BASE), [MSG_FORM_MISSING.to_string()]);
        assert_eq!(errors.fields().count(), 1);
    }

    #[test]
    fn validator_errors_keep_their_field() {
        let form = Form {
            name: "   ".to_string(),
        };
        let errors: FieldErrors = form.validate().unwrap_err().into();
        assert_eq!(errors.get("name"), [MSG_BLANK.to_string()]);
        assert!(errors.get(BASE).is_empty());
    }

    #[test]
    fn merge_appends_messages() {
        let mut a = FieldErrors::new();
        a.add("name", MSG_BLANK);
        let mut b = FieldErrors::new();
        b.add("name", "is too long");
        b.add("version_type", MSG_BLANK);
        a.merge(b);
        assert_eq!(a.get("name").len(), 2);
        assert_eq!(a.get("version_type"), [MSG_BLANK.to_string()]);
    }

    #[test]
    fn display_joins_field_and_message() {
        let mut errors = FieldErrors::new();
        errors.add("version_type", MSG_BLANK);
        assert_eq!(errors.to_string(), "version_type can't be blank");
    }
}
