//! Backend-facing commands: health check and account creation.

use std::path::{Path, PathBuf};

use clap::Args;

use school_portal_core::Role;
use school_portal_portal::api::ProfileImage;
use school_portal_portal::forms::{
    AdminField, CreateAdminForm, CreateSuperForm, SubmitError, SubmitOutcome, SuperField, ToastKind,
};

use super::{CliError, Context};

/// Personal fields shared by both account forms.
#[derive(Debug, Args)]
pub struct AccountArgs {
    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long)]
    pub last_name: String,

    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Password (at least 6 characters)
    #[arg(short, long)]
    pub password: String,

    /// Password confirmation (defaults to the password)
    #[arg(long)]
    pub confirm_password: Option<String>,
}

/// School fields of an admin account.
#[derive(Debug)]
pub struct SchoolArgs {
    pub name: String,
    pub code: Option<String>,
    pub role: String,
    pub profile_image: Option<PathBuf>,
}

/// `GET /` against the configured backend.
///
/// # Errors
///
/// Returns `CliError::Api` if the backend does not answer.
pub async fn health(ctx: &Context) -> Result<(), CliError> {
    let message = ctx.api.health().await?;
    tracing::info!(api = %ctx.api.base_url(), "{message}");
    Ok(())
}

/// Create a super admin through the form controller.
///
/// # Errors
///
/// Returns `CliError::Submit` on validation or API failure.
pub async fn create_super(ctx: &Context, account: AccountArgs) -> Result<(), CliError> {
    let mut controller = CreateSuperForm::new();
    let confirm = account
        .confirm_password
        .unwrap_or_else(|| account.password.clone());
    controller.form.change(SuperField::FirstName, account.first_name);
    controller.form.change(SuperField::LastName, account.last_name);
    controller.form.change(SuperField::Email, account.email);
    controller.form.change(SuperField::Password, account.password);
    controller.form.change(SuperField::ConfirmPassword, confirm);

    let result = controller.submit(&ctx.api, &ctx.session).await;
    report(result)
}

/// Create a school admin through the form controller.
///
/// # Errors
///
/// Returns `CliError` for an unknown role, an unreadable profile image, or a
/// failed submit.
pub async fn create_admin(
    ctx: &Context,
    account: AccountArgs,
    school: SchoolArgs,
) -> Result<(), CliError> {
    let role: Role = school
        .role
        .parse()
        .map_err(|_| CliError::InvalidRole(school.role.clone()))?;

    let mut controller = CreateAdminForm::new();
    controller.role = role;
    controller.profile_image = school
        .profile_image
        .as_deref()
        .map(read_profile_image)
        .transpose()?;

    let confirm = account
        .confirm_password
        .unwrap_or_else(|| account.password.clone());
    controller.form.change(AdminField::FirstName, account.first_name);
    controller.form.change(AdminField::LastName, account.last_name);
    controller.form.change(AdminField::Email, account.email);
    controller.form.change(AdminField::Password, account.password);
    controller.form.change(AdminField::ConfirmPassword, confirm);
    controller.form.change(AdminField::SchoolName, school.name);
    controller
        .form
        .change(AdminField::SchoolCode, school.code.unwrap_or_default());

    let result = controller.submit(&ctx.api, &ctx.session).await;
    report(result)
}

/// Log a submit result the way the UI would show it.
fn report(result: Result<SubmitOutcome, SubmitError>) -> Result<(), CliError> {
    match result {
        Ok(outcome) => {
            match outcome.toast.kind {
                ToastKind::Success => tracing::info!("{}", outcome.toast.message),
                ToastKind::Warning | ToastKind::Error => {
                    tracing::warn!("{}", outcome.toast.message);
                }
            }
            if let Some(school) = &outcome.record.school {
                tracing::info!(school = %school.name, code = %school.code, "School registered");
            }
            tracing::info!(
                "Continue at {} (after {}s)",
                outcome.redirect.path,
                outcome.redirect.after.as_secs()
            );
            Ok(())
        }
        Err(SubmitError::Invalid(errors)) => {
            for (field, message) in errors.iter() {
                tracing::error!(field, "{message}");
            }
            Err(SubmitError::Invalid(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Load a profile picture, guessing its content type from the extension.
fn read_profile_image(path: &Path) -> Result<ProfileImage, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "profile".to_owned(), |n| n.to_string_lossy().into_owned());

    Ok(ProfileImage {
        content_type: content_type_for(path).to_owned(),
        file_name,
        bytes,
    })
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
