//! Super-admin creation form (JSON payload).

use secrecy::SecretString;

use school_portal_core::validation::{
    validate_confirmation, validate_email, validate_name, validate_password,
};
use school_portal_core::wire::CreateSuperRequest;

use super::{Form, FormField, FormValues, InFlight, SubmitError, SubmitOutcome, finish};
use crate::api::ApiClient;
use crate::session::SessionStore;
use crate::store::KeyValueStore;

/// Fields of the super-admin form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuperField {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
}

impl FormField for SuperField {
    const ALL: &'static [Self] = &[
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Password,
        Self::ConfirmPassword,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        }
    }

    fn validate(self, values: &FormValues<Self>) -> Option<String> {
        let value = values.get(self);
        match self {
            Self::FirstName => validate_name("First name", value),
            Self::LastName => validate_name("Last name", value),
            Self::Email => validate_email(value),
            Self::Password => validate_password(value),
            Self::ConfirmPassword => validate_confirmation(values.get(Self::Password), value),
        }
    }

    fn dependents(self) -> &'static [Self] {
        match self {
            Self::Password => &[Self::ConfirmPassword],
            _ => &[],
        }
    }
}

/// Controller of the super-admin creation form.
#[derive(Debug, Default)]
pub struct CreateSuperForm {
    pub form: Form<SuperField>,
    submitting: bool,
}

impl CreateSuperForm {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submit is running.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate, send, and cache the created super admin.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Invalid` without calling the API when a field
    /// fails validation, or `SubmitError::Api` when the request fails.
    pub async fn submit<S: KeyValueStore>(
        &mut self,
        api: &ApiClient,
        session: &SessionStore<S>,
    ) -> Result<SubmitOutcome, SubmitError> {
        if self.submitting {
            return Err(SubmitError::InProgress);
        }
        if !self.form.validate_all() {
            return Err(SubmitError::Invalid(self.form.errors()));
        }

        let request = CreateSuperRequest {
            first_name: self.form.value(SuperField::FirstName).trim().to_owned(),
            last_name: self.form.value(SuperField::LastName).trim().to_owned(),
            email: self.form.value(SuperField::Email).trim().to_owned(),
            password: SecretString::from(self.form.value(SuperField::Password).to_owned()),
        };

        let result = {
            let _in_flight = InFlight::raise(&mut self.submitting);
            api.create_super(&request, session.bearer_token().as_ref()).await
        };

        let record = result?;
        self.form.reset();
        Ok(finish(session, record, "Super admin created successfully"))
    }
}
