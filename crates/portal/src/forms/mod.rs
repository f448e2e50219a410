//! Account creation form controllers.
//!
//! A [`Form`] tracks values, touched fields and per-field errors. Fields are
//! validated when they lose focus ([`Form::blur`]) and on every change once
//! touched ([`Form::change`]). [`Form::validate_all`] touches everything and
//! blocks submission while any error remains.
//!
//! The controllers in [`create_admin`] and [`create_super`] add the submit
//! step: call the API, cache the created account in the session store, and
//! hand back a toast plus a delayed redirect for the UI to act on.

pub mod create_admin;
pub mod create_super;

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use thiserror::Error;

use school_portal_core::{AdminRecord, FieldErrors};

use crate::api::ApiError;
use crate::session::SessionStore;
use crate::store::KeyValueStore;

pub use create_admin::{AdminField, CreateAdminForm};
pub use create_super::{CreateSuperForm, SuperField};

/// Raises a controller's submitting flag until dropped, so a cancelled
/// submit future lowers it too.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Delay between a successful submit and the redirect.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// A field of a form.
pub trait FormField: Copy + Eq + Hash + Debug + 'static {
    /// Every field, in display order.
    const ALL: &'static [Self];

    /// Wire name, also used as the key of [`FieldErrors`].
    fn name(self) -> &'static str;

    /// Error message for this field given every current value.
    fn validate(self, values: &FormValues<Self>) -> Option<String>;

    /// Fields to re-validate (if touched) when this one changes.
    fn dependents(self) -> &'static [Self] {
        &[]
    }
}

/// Current values of a form, empty string when unset.
#[derive(Debug, Clone)]
pub struct FormValues<F> {
    values: HashMap<F, String>,
}

impl<F: FormField> FormValues<F> {
    /// Value of `field`.
    #[must_use]
    pub fn get(&self, field: F) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }
}

impl<F> Default for FormValues<F> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

/// Form state: values, touched fields and current error messages.
#[derive(Debug, Clone)]
pub struct Form<F> {
    values: FormValues<F>,
    touched: HashSet<F>,
    errors: HashMap<F, String>,
}

impl<F> Default for Form<F> {
    fn default() -> Self {
        Self {
            values: FormValues::default(),
            touched: HashSet::new(),
            errors: HashMap::new(),
        }
    }
}

impl<F: FormField> Form<F> {
    /// Empty, untouched form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`.
    #[must_use]
    pub fn value(&self, field: F) -> &str {
        self.values.get(field)
    }

    /// All values.
    #[must_use]
    pub const fn values(&self) -> &FormValues<F> {
        &self.values
    }

    /// Current error of `field`, if any.
    #[must_use]
    pub fn error(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Whether `field` has been touched.
    #[must_use]
    pub fn is_touched(&self, field: F) -> bool {
        self.touched.contains(&field)
    }

    /// Set `field`, re-validating it and its dependents once touched.
    pub fn change(&mut self, field: F, value: impl Into<String>) {
        self.values.values.insert(field, value.into());
        if self.touched.contains(&field) {
            self.validate_field(field);
        }
        for &dependent in field.dependents() {
            if self.touched.contains(&dependent) {
                self.validate_field(dependent);
            }
        }
    }

    /// Mark `field` touched and validate it.
    pub fn blur(&mut self, field: F) {
        self.touched.insert(field);
        self.validate_field(field);
    }

    /// Touch and validate every field. Returns true if the form is valid.
    pub fn validate_all(&mut self) -> bool {
        for &field in F::ALL {
            self.touched.insert(field);
            self.validate_field(field);
        }
        self.errors.is_empty()
    }

    /// Current errors keyed by wire name.
    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (field, message) in &self.errors {
            errors.set(field.name(), Some(message.clone()));
        }
        errors
    }

    /// Clear values, touched state and errors.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn validate_field(&mut self, field: F) {
        match field.validate(&self.values) {
            Some(message) if !message.is_empty() => {
                self.errors.insert(field, message);
            }
            _ => {
                self.errors.remove(&field);
            }
        }
    }
}

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

/// A transient notification for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Navigation the UI should perform after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub path: &'static str,
    pub after: Duration,
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub record: AdminRecord,
    pub toast: Toast,
    pub redirect: Redirect,
}

/// Why a submit did not go through.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Client-side validation failed; nothing was sent.
    #[error("form has errors: {0}")]
    Invalid(FieldErrors),

    /// A submit is already running.
    #[error("a submission is already in progress")]
    InProgress,

    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    /// Toast to show for this failure.
    #[must_use]
    pub fn toast(&self) -> Toast {
        let message = match self {
            Self::Invalid(_) => "Please fix the errors in the form".to_owned(),
            Self::InProgress => "Please wait for the current request to finish".to_owned(),
            Self::Api(e) => e.user_message(),
        };
        Toast::new(ToastKind::Error, message)
    }
}

/// Cache a created account and build the success outcome.
///
/// A failed storage write does not undo the account (the server already has
/// it); it downgrades the toast to a warning instead.
fn finish<S: KeyValueStore>(
    session: &SessionStore<S>,
    record: AdminRecord,
    success_message: &str,
) -> SubmitOutcome {
    let toast = if session.record_created_account(&record) {
        Toast::new(ToastKind::Success, success_message)
    } else {
        tracing::warn!(email = %record.email, "Created account could not be cached locally");
        Toast::new(
            ToastKind::Warning,
            format!("{success_message}, but it could not be saved on this device"),
        )
    };

    tracing::info!(email = %record.email, role = %record.role, "Account created");

    SubmitOutcome {
        redirect: Redirect {
            path: record.role.dashboard_path(),
            after: REDIRECT_DELAY,
        },
        record,
        toast,
    }
}

#[cfg(test)]
mod tests {
    use school_portal_core::Role;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_finish_success() {
        let session = SessionStore::new(MemoryStore::new());
        let record = AdminRecord::new("a@b.com", "Ada", "Lovelace", Role::SuperAdmin);

        let outcome = finish(&session, record, "Super admin created successfully");

        assert_eq!(outcome.toast.kind, ToastKind::Success);
        assert_eq!(outcome.redirect.path, "/super-admin/dashboard");
        assert_eq!(outcome.redirect.after, REDIRECT_DELAY);
        assert_eq!(session.active_email().as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_finish_storage_failure_warns() {
        let session = SessionStore::new(MemoryStore::with_quota(16));
        let record = AdminRecord::new("a@b.com", "Ada", "Lovelace", Role::Admin);

        let outcome = finish(&session, record, "Admin created successfully");

        assert_eq!(outcome.toast.kind, ToastKind::Warning);
        assert!(outcome.toast.message.contains("could not be saved"));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_submit_error_toasts() {
        let toast = SubmitError::Invalid(FieldErrors::new()).toast();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Please fix the errors in the form");

        let toast = SubmitError::Api(ApiError::Server {
            status: 409,
            message: "Email already registered".to_owned(),
            errors: None,
        })
        .toast();
        assert_eq!(toast.message, "Email already registered");
    }
}
