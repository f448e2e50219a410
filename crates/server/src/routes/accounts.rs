//! Account creation.
//!
//! Both endpoints validate the payload with the same rules the portal forms
//! apply, then answer with the record the client caches. Nothing is stored
//! server-side and the password never leaves the handler.

use std::collections::HashMap;

use axum::{Json, extract::Multipart, http::StatusCode};
use secrecy::ExposeSecret;
use uuid::Uuid;

use school_portal_core::validation::{AccountFields, validate_account};
use school_portal_core::wire::{AccountCreated, CreateSuperRequest, Envelope, fields};
use school_portal_core::{AdminRecord, Email, EmailError, FieldErrors, Role, SchoolInfo};

use crate::error::{AppError, Result};

type Created = (StatusCode, Json<Envelope<AccountCreated>>);

fn text_value<'a>(text: &'a HashMap<String, String>, key: &str) -> &'a str {
    text.get(key).map_or("", String::as_str)
}

/// Parse the address; the format rule has already reported everything but
/// the length limit.
fn parse_email(raw: &str, errors: &mut FieldErrors) -> Option<Email> {
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(EmailError::TooLong { max }) => {
            errors.set(
                fields::EMAIL,
                Some(format!("Email must be at most {max} characters")),
            );
            None
        }
        Err(_) => None,
    }
}

/// `POST /create-admin` - multipart admin creation.
///
/// Text parts: `firstName`, `lastName`, `email`, `password`, `role`
/// (default `admin`), `schoolName`, optional `schoolCode`. Optional file part
/// `profileImage`, whose file name ends up in the record.
pub async fn create_admin(mut multipart: Multipart) -> Result<Created> {
    let mut text: HashMap<String, String> = HashMap::new();
    let mut profile_image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(String::from) else {
            continue;
        };
        if name == fields::PROFILE_IMAGE {
            let file_name = field.file_name().map(String::from);
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                profile_image = file_name;
            }
        } else {
            let value = field.text().await?;
            text.insert(name, value);
        }
    }

    let mut errors = validate_account(&AccountFields {
        first_name: text_value(&text, fields::FIRST_NAME),
        last_name: text_value(&text, fields::LAST_NAME),
        email: text_value(&text, fields::EMAIL).trim(),
        password: text_value(&text, fields::PASSWORD),
        confirm_password: None,
        school_name: Some(text_value(&text, fields::SCHOOL_NAME)),
    });

    let role = match text.get(fields::ROLE).map(|r| r.trim()) {
        None | Some("") => Some(Role::Admin),
        Some(raw) => raw.parse::<Role>().ok(),
    };
    if role.is_none() {
        errors.set(fields::ROLE, Some("Role is invalid".to_string()));
    }

    let email = parse_email(text_value(&text, fields::EMAIL), &mut errors);

    let (Some(role), Some(email)) = (role, email) else {
        return Err(AppError::Validation(errors));
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let school_name = text_value(&text, fields::SCHOOL_NAME).trim().to_owned();
    let school_id = Uuid::new_v4().to_string();
    let school_code = match text_value(&text, fields::SCHOOL_CODE).trim() {
        "" => SchoolInfo::derive_code(&school_name, &school_id),
        code => code.to_owned(),
    };

    let mut admin = AdminRecord::new(
        email.into_inner(),
        text_value(&text, fields::FIRST_NAME),
        text_value(&text, fields::LAST_NAME),
        role,
    )
    .with_school(SchoolInfo {
        name: school_name,
        id: school_id,
        code: school_code,
    });
    admin.profile_image = profile_image;

    tracing::info!(email = %admin.email, role = %admin.role, "Admin account built");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Admin created successfully",
            AccountCreated { admin },
        )),
    ))
}

/// `POST /create-super` - JSON super admin creation.
pub async fn create_super(Json(request): Json<CreateSuperRequest>) -> Result<Created> {
    let mut errors = validate_account(&AccountFields {
        first_name: &request.first_name,
        last_name: &request.last_name,
        email: request.email.trim(),
        password: request.password.expose_secret(),
        confirm_password: None,
        school_name: None,
    });
    let email = parse_email(&request.email, &mut errors);

    let Some(email) = email.filter(|_| errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };

    let admin = AdminRecord::new(
        email.into_inner(),
        &request.first_name,
        &request.last_name,
        Role::SuperAdmin,
    );

    tracing::info!(email = %admin.email, "Super admin account built");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Super admin created successfully",
            AccountCreated { admin },
        )),
    ))
}
