//! Validation of submitted forms.
//!
//! A form is deserialized from an urlencoded body into a `*FormData`
//! struct, then validated into a typed value. Invalid data yields
//! [`FormErrors`] so the caller can re-render the bound form.

mod account;
mod post;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::error::RepoError;
use crate::ports::AuthError;

pub use account::{
    LoginFormData, PASSWORD_MIN_LENGTH, SignupFormData, USERNAME_MAX_LENGTH, USERNAME_TAKEN,
    ValidSignup, safe_redirect_path,
};
pub use post::{PostFormData, ValidPost};

/// Key under which errors not tied to one field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// A single error not attached to any field.
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when nothing was recorded, otherwise the errors.
    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormError> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(FormError::Invalid(self))
        }
    }
}

/// Why a submission was not accepted.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Submitted form is invalid")]
    Invalid(FormErrors),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Trimmed value of an optional text field, `None` when blank.
fn cleaned(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_collect_per_field() {
        let mut errors = FormErrors::new();
        errors.add("text", REQUIRED);
        errors.add("text", "Another");
        assert!(errors.has("text"));
        assert!(!errors.has("group"));
        assert_eq!(errors.get("text").len(), 2);
        assert_eq!(errors.get("group"), &[] as &[String]);
    }

    #[test]
    fn test_errors_serialize_as_map() {
        let errors = FormErrors::non_field("nope");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "__all__": ["nope"] }));
    }

    #[test]
    fn test_cleaned_blank_is_none() {
        assert_eq!(cleaned(None), None);
        assert_eq!(cleaned(Some("   ")), None);
        assert_eq!(cleaned(Some(" a ")), Some("a"));
    }
}
