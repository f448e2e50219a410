//! School admin creation form (multipart payload with optional profile image).

use secrecy::SecretString;

use school_portal_core::Role;
use school_portal_core::validation::{
    validate_confirmation, validate_email, validate_name, validate_password,
};

use super::{Form, FormField, FormValues, InFlight, SubmitError, SubmitOutcome, finish};
use crate::api::{ApiClient, CreateAdminRequest, ProfileImage};
use crate::session::SessionStore;
use crate::store::KeyValueStore;

/// Fields of the admin form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminField {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
    SchoolName,
    /// Optional; generated by the backend when blank.
    SchoolCode,
}

impl FormField for AdminField {
    const ALL: &'static [Self] = &[
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Password,
        Self::ConfirmPassword,
        Self::SchoolName,
        Self::SchoolCode,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::SchoolName => "schoolName",
            Self::SchoolCode => "schoolCode",
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
            Self::SchoolName => validate_name("School name", value),
            Self::SchoolCode => None,
        }
    }

    fn dependents(self) -> &'static [Self] {
        match self {
            Self::Password => &[Self::ConfirmPassword],
            _ => &[],
        }
    }
}

/// Controller of the admin creation form.
#[derive(Debug)]
pub struct CreateAdminForm {
    pub form: Form<AdminField>,
    pub role: Role,
    pub profile_image: Option<ProfileImage>,
    submitting: bool,
}

impl Default for CreateAdminForm {
    fn default() -> Self {
        Self {
            form: Form::new(),
            role: Role::Admin,
            profile_image: None,
            submitting: false,
        }
    }
}

impl CreateAdminForm {
    /// Empty form creating an `admin`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submit is running.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Build the request from the current values.
    fn request(&self) -> CreateAdminRequest {
        let code = self.form.value(AdminField::SchoolCode).trim();
        CreateAdminRequest {
            first_name: self.form.value(AdminField::FirstName).trim().to_owned(),
            last_name: self.form.value(AdminField::LastName).trim().to_owned(),
            email: self.form.value(AdminField::Email).trim().to_owned(),
            password: SecretString::from(self.form.value(AdminField::Password).to_owned()),
            role: self.role.clone(),
            school_name: self.form.value(AdminField::SchoolName).trim().to_owned(),
            school_code: (!code.is_empty()).then(|| code.to_owned()),
            profile_image: self.profile_image.clone(),
        }
    }

    /// Validate, send, and cache the created admin.
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

        let request = self.request();

        let result = {
            let _in_flight = InFlight::raise(&mut self.submitting);
            api.create_admin(request, session.bearer_token().as_ref()).await
        };

        let record = result?;
        self.form.reset();
        self.profile_image = None;
        Ok(finish(session, record, "Admin created successfully"))
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_school_name_required() {
        let mut form = Form::<AdminField>::new();
        form.blur(AdminField::SchoolName);
        assert_eq!(
            form.error(AdminField::SchoolName),
            Some("School name is required")
        );
        form.blur(AdminField::SchoolCode);
        assert_eq!(form.error(AdminField::SchoolCode), None);
    }

    #[test]
    fn test_request_trims_and_drops_blank_code() {
        let mut controller = CreateAdminForm::new();
        controller.form.change(AdminField::FirstName, "  Ada ");
        controller.form.change(AdminField::LastName, "Lovelace");
        controller.form.change(AdminField::Email, " ada@school.org ");
        controller.form.change(AdminField::Password, " pass word ");
        controller.form.change(AdminField::SchoolName, "Northwind High");
        controller.form.change(AdminField::SchoolCode, "   ");

        let request = controller.request();

        assert_eq!(request.first_name, "Ada");
        assert_eq!(request.email, "ada@school.org");
        assert_eq!(request.password.expose_secret(), " pass word ");
        assert_eq!(request.role, Role::Admin);
        assert_eq!(request.school_code, None);
    }

    #[test]
    fn test_request_keeps_code_and_image() {
        let mut controller = CreateAdminForm::new();
        controller.role = Role::Teacher;
        controller.form.change(AdminField::SchoolCode, "NW-01");
        controller.profile_image = Some(ProfileImage {
            file_name: "me.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: vec![1, 2, 3],
        });

        let request = controller.request();

        assert_eq!(request.role, Role::Teacher);
        assert_eq!(request.school_code.as_deref(), Some("NW-01"));
        assert_eq!(request.profile_image.map(|i| i.bytes.len()), Some(3));
    }
}
