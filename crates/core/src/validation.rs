//! Field validators for the account forms.
//!
//! Each validator returns `None` when the value is acceptable and
//! `Some(message)` with a user-facing message otherwise. The portal runs them
//! per field as the user types; the server runs [`validate_account`] over a
//! whole payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::email::is_well_formed;

/// Minimum length of first, last and school names.
pub const NAME_MIN_LENGTH: usize = 2;

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Validate a required name-like field.
///
/// `label` is used verbatim at the start of the message ("First name").
#[must_use]
pub fn validate_name(label: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some(format!("{label} is required"));
    }
    if value.chars().count() < NAME_MIN_LENGTH {
        return Some(format!(
            "{label} must be at least {NAME_MIN_LENGTH} characters"
        ));
    }
    None
}

/// Validate an email field against the `x@y.z` format rule.
#[must_use]
pub fn validate_email(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some("Email is required".to_owned());
    }
    if !is_well_formed(value) {
        return Some("Email is invalid".to_owned());
    }
    None
}

/// Validate a password field.
#[must_use]
pub fn validate_password(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some("Password is required".to_owned());
    }
    if value.chars().count() < PASSWORD_MIN_LENGTH {
        return Some(format!(
            "Password must be at least {PASSWORD_MIN_LENGTH} characters"
        ));
    }
    None
}

/// Validate a password confirmation against the password.
#[must_use]
pub fn validate_confirmation(password: &str, confirmation: &str) -> Option<String> {
    if confirmation.is_empty() {
        return Some("Please confirm your password".to_owned());
    }
    if password != confirmation {
        return Some("Passwords do not match".to_owned());
    }
    None
}

/// Per-field error messages keyed by the field's wire name (`firstName`,
/// `email`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` if present; clears the field otherwise.
    pub fn set(&mut self, field: &str, message: Option<String>) {
        match message {
            Some(m) if !m.is_empty() => {
                self.0.insert(field.to_owned(), m);
            }
            _ => {
                self.0.remove(field);
            }
        }
    }

    /// Error message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns true if no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// An account payload as received by the server.
#[derive(Debug, Clone, Copy)]
pub struct AccountFields<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    /// Only checked when the payload carries a confirmation.
    pub confirm_password: Option<&'a str>,
    /// Only checked for accounts that create a school.
    pub school_name: Option<&'a str>,
}

/// Validate every field of an account payload.
#[must_use]
pub fn validate_account(fields: &AccountFields<'_>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.set("firstName", validate_name("First name", fields.first_name));
    errors.set("lastName", validate_name("Last name", fields.last_name));
    errors.set("email", validate_email(fields.email));
    errors.set("password", validate_password(fields.password));
    if let Some(confirm) = fields.confirm_password {
        errors.set(
            "confirmPassword",
            validate_confirmation(fields.password, confirm),
        );
    }
    if let Some(school) = fields.school_name {
        errors.set("schoolName", validate_name("School name", school));
    }
    errors
}
