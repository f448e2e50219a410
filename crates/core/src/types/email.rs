//! Email address type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Format rule shared by the account forms and the server: something, an @,
/// something, a dot, something. Deliberately loose, not RFC 5322.
static EMAIL_FORMAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("Invalid regex"));

/// Returns true if `s` passes the account-form email format rule.
///
/// The match is unanchored, so any substring of the shape `x@y.z` qualifies.
#[must_use]
pub fn is_well_formed(s: &str) -> bool {
    EMAIL_FORMAT_RE.is_match(s)
}

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not match the `x@y.z` format rule.
    #[error("email is invalid")]
    Invalid,
}

/// An email address that passed the account-form format rule.
///
/// Emails are the identity key of admin records. They are compared
/// case-sensitively and only checked for format, never for uniqueness.
///
/// ## Examples
///
/// ```
/// use school_portal_core::Email;
///
/// assert!(Email::parse("teacher@school.edu").is_ok());
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("bad-email").is_err());
/// assert!(Email::parse("user@localhost").is_err()); // no dot after the @
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters, or
    /// does not match the `x@y.z` format rule.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !is_well_formed(s) {
            return Err(EmailError::Invalid);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the domain part of the email (after the last @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.rsplit('@').next().unwrap_or("")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
