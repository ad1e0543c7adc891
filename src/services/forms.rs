use std::collections::BTreeMap;

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

/// Key under which errors that belong to no single field are reported
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const FIELD_REQUIRED: &str = "This field is required.";

/// Validation error for a blank required field
pub fn required() -> ValidationError {
    ValidationError::new("required").with_message(FIELD_REQUIRED.into())
}

/// Field name → messages, as rendered next to a re-displayed form
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// A form-level error
    pub fn non_field(message: &str) -> Self {
        Self::field(NON_FIELD_ERRORS, message)
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Every listed field reported as required, for a submission that could not be read
    pub fn required_fields(fields: &[&str]) -> Self {
        let mut errors = Self::default();
        for field in fields {
            errors.add(field, FIELD_REQUIRED);
        }
        errors
    }

    /// Messages reported for `field`, empty if it passed
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut form_errors = Self::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                form_errors.add(&field.to_string(), &message);
            }
        }
        form_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "This field is required."))]
        name: String,
        #[validate(length(max = 3))]
        code: String,
    }

    #[test]
    fn test_collects_messages_per_field() {
        let sample = Sample {
            name: String::new(),
            code: "toolong".to_string(),
        };
        let errors = FormErrors::from(&sample.validate().unwrap_err());

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"], serde_json::json!(["This field is required."]));
        assert_eq!(json["code"], serde_json::json!(["Invalid value (length)"]));
    }

    #[test]
    fn test_non_field_error() {
        let errors = FormErrors::non_field("Something went wrong.");
        assert!(errors.has_field(NON_FIELD_ERRORS));
        assert!(!errors.is_empty());
        assert!(FormErrors::default().is_empty());
    }

    #[test]
    fn test_required_fields() {
        let errors = FormErrors::required_fields(&["username", "password"]);
        assert_eq!(errors.messages("username"), [FIELD_REQUIRED]);
        assert_eq!(errors.messages("password"), [FIELD_REQUIRED]);
        assert!(errors.messages("next").is_empty());
    }
}
