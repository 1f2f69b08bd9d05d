//! Form definitions backing the console's modal dialogs.
//!
//! Each form is the raw, editable field state of a dialog. Converting it into
//! its payload with `TryFrom` runs the local validation rules and reports the
//! first rule that fails.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod kyc;
pub mod location;
pub mod login;
pub mod question;

#[derive(Debug, Error)]
/// Errors that can occur when validating form data.
pub enum FormError {
    /// Derived validation rules failed; `message` names the first one.
    #[error("{message}")]
    Validation {
        message: String,
        #[source]
        errors: ValidationErrors,
    },

    /// A hand-written rule failed.
    #[error("{0}")]
    Rule(String),

    #[error("invalid value: {0}")]
    TypeConstraint(#[from] TypeConstraintError),
}

impl FormError {
    pub fn rule(message: impl Into<String>) -> Self {
        FormError::Rule(message.into())
    }

    /// Wraps validator output, picking the first failing field in display
    /// order.
    pub fn from_validation(errors: ValidationErrors, field_order: &[&str]) -> Self {
        let message = first_violation(&errors, field_order);
        FormError::Validation { message, errors }
    }

    /// User-facing text of the violated rule.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Returns the message of the first failing rule, walking fields in
/// `field_order` and falling back to any remaining field.
pub fn first_violation(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let field_errors = errors.field_errors();

    let ordered = field_order
        .iter()
        .filter_map(|name| field_errors.get(*name).map(|errs| (name.to_string(), *errs)));
    let mut rest: Vec<_> = field_errors
        .iter()
        .map(|(name, errs)| (name.to_string(), *errs))
        .filter(|(name, _)| !field_order.contains(&name.as_str()))
        .collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));

    ordered
        .chain(rest)
        .find_map(|(name, errs)| {
            errs.first().map(|err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{name} is invalid"),
            })
        })
        .unwrap_or_else(|| "Please fill all required fields".to_string())
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use validator::ValidationError;

    use super::*;

    #[test]
    fn first_violation_follows_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "weight",
            ValidationError::new("range").with_message(Cow::Borrowed("Weight out of range")),
        );
        errors.add(
            "text",
            ValidationError::new("length").with_message(Cow::Borrowed("Text is required")),
        );

        assert_eq!(first_violation(&errors, &["text", "weight"]), "Text is required");
        assert_eq!(first_violation(&errors, &["weight", "text"]), "Weight out of range");
    }

    #[test]
    fn unnamed_rules_fall_back_to_field_name() {
        let mut errors = ValidationErrors::new();
        errors.add("order", ValidationError::new("range"));

        assert_eq!(first_violation(&errors, &[]), "order is invalid");
    }
}
