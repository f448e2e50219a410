//! Local session commands. None of these talk to the backend.

use clap::Args;
use secrecy::SecretString;

use school_portal_core::{AdminPatch, Role};
use school_portal_portal::dashboard::{self, Navigation};

use super::{CliError, Context};

/// Fields accepted by `update`.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// New first name
    #[arg(long)]
    pub first_name: Option<String>,

    /// New last name
    #[arg(long)]
    pub last_name: Option<String>,

    /// New role
    #[arg(long)]
    pub role: Option<String>,

    /// New profile image reference
    #[arg(long)]
    pub profile_image: Option<String>,

    /// Activate or deactivate the account
    #[arg(long)]
    pub active: Option<bool>,
}

impl UpdateArgs {
    fn into_patch(self) -> Result<AdminPatch, CliError> {
        let role = self
            .role
            .map(|r| r.parse::<Role>().map_err(|_| CliError::InvalidRole(r.clone())))
            .transpose()?;
        Ok(AdminPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            role,
            school: None,
            profile_image: self.profile_image,
            is_active: self.active,
        })
    }
}

/// Show the active account.
pub fn whoami(ctx: &Context) {
    let Some(current) = dashboard::current_dashboard(&ctx.session) else {
        tracing::info!("Not signed in; continue at {}", dashboard::LOGIN_PATH);
        return;
    };

    tracing::info!(
        email = %current.email,
        role = %current.role,
        dashboard = current.path,
        "{}",
        current.display_name
    );
    if let Some(school) = &current.school {
        tracing::info!(school = %school.name, id = %school.id, code = %school.code, "School");
    }
}

/// List cached accounts, marking the active one.
pub fn accounts(ctx: &Context) {
    let active = ctx.session.active_email();
    let emails = ctx.session.get_all_admin_emails();
    if emails.is_empty() {
        tracing::info!("No cached accounts");
        return;
    }
    for email in emails {
        let marker = if active.as_deref() == Some(email.as_str()) {
            "*"
        } else {
            " "
        };
        let role = ctx
            .session
            .get_admin_data_by_email(&email)
            .map_or_else(|| "?".to_owned(), |r| r.role.to_string());
        tracing::info!("{marker} {email} ({role})");
    }
}

/// Make a cached account active.
///
/// # Errors
///
/// Returns `CliError::UnknownAccount` if nothing is cached for `email`.
pub fn switch(ctx: &Context, email: &str) -> Result<(), CliError> {
    if !ctx.session.set_active_email(email) {
        return Err(CliError::UnknownAccount(email.to_owned()));
    }
    tracing::info!("Active account is now {email}");
    Ok(())
}

/// Resolve a dashboard route for the active account.
pub fn open(ctx: &Context, path: &str) {
    match dashboard::open(&ctx.session, path) {
        Navigation::Render(view) => {
            tracing::info!(dashboard = view.path, "Welcome, {}", view.display_name);
        }
        Navigation::Redirect(to) => tracing::info!("Redirected to {to}"),
    }
}

/// Merge fields into the active account.
///
/// # Errors
///
/// Returns `CliError` if no field is given, the role is unknown, or the
/// session has no active account.
pub fn update(ctx: &Context, args: UpdateArgs) -> Result<(), CliError> {
    let patch = args.into_patch()?;
    if patch.is_empty() {
        return Err(CliError::NothingToUpdate);
    }
    if !ctx.session.update_admin_data(patch) {
        return Err(CliError::SessionWrite("update the active account"));
    }
    if let Some(record) = ctx.session.get_current_admin_data() {
        tracing::info!(updated_at = %record.updated_at, "Updated {}", record.email);
    }
    Ok(())
}

/// End a session, keeping the cached profile.
///
/// # Errors
///
/// Returns `CliError::SessionWrite` if the store rejects the change.
pub fn logout(ctx: &Context, email: Option<&str>) -> Result<(), CliError> {
    if !ctx.session.clear_session_data(email) {
        return Err(CliError::SessionWrite("clear the session"));
    }
    tracing::info!("Signed out");
    Ok(())
}

/// Remove every cached key of an account.
///
/// # Errors
///
/// Returns `CliError::SessionWrite` if the store rejects the change.
pub fn forget(ctx: &Context, email: Option<&str>) -> Result<(), CliError> {
    if !ctx.session.clear_all_admin_data(email) {
        return Err(CliError::SessionWrite("remove the account"));
    }
    tracing::info!("Account data removed");
    Ok(())
}

/// Store a bearer token used by later API calls.
///
/// # Errors
///
/// Returns `CliError::SessionWrite` if the store rejects the change.
pub fn token(ctx: &Context, email: &str, token: String) -> Result<(), CliError> {
    if !ctx.session.store_token(email, &SecretString::from(token)) {
        return Err(CliError::SessionWrite("store the token"));
    }
    tracing::info!("Token stored for {email}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use school_portal_core::AdminRecord;
    use school_portal_portal::config::ClientConfig;

    use super::*;

    fn context(dir: &tempfile::TempDir) -> Context {
        let config = ClientConfig {
            store_path: dir.path().join("storage.json"),
            ..ClientConfig::default()
        };
        Context::from_config(&config).unwrap()
    }

    fn seed(ctx: &Context, email: &str, role: Role) {
        let record = AdminRecord::new(email, "Sam", "Lee", role);
        assert!(ctx.session.store_admin_data(&record));
    }

    #[test]
    fn test_switch_and_forget() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        seed(&ctx, "a@school.org", Role::Admin);
        seed(&ctx, "b@school.org", Role::Teacher);

        switch(&ctx, "a@school.org").unwrap();
        assert_eq!(ctx.session.active_email().as_deref(), Some("a@school.org"));

        let err = switch(&ctx, "nobody@school.org").unwrap_err();
        assert!(matches!(err, CliError::UnknownAccount(_)));

        forget(&ctx, None).unwrap();
        assert_eq!(ctx.session.get_all_admin_emails(), vec!["b@school.org"]);
        assert_eq!(ctx.session.active_email(), None);
    }

    #[test]
    fn test_update_requires_fields() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        seed(&ctx, "a@school.org", Role::Admin);

        let empty = UpdateArgs {
            first_name: None,
            last_name: None,
            role: None,
            profile_image: None,
            active: None,
        };
        assert!(matches!(
            update(&ctx, empty).unwrap_err(),
            CliError::NothingToUpdate
        ));

        let args = UpdateArgs {
            first_name: Some("Samira".to_owned()),
            last_name: None,
            role: Some("teacher".to_owned()),
            profile_image: None,
            active: None,
        };
        update(&ctx, args).unwrap();

        let record = ctx.session.get_current_admin_data().unwrap();
        assert_eq!(record.first_name, "Samira");
        assert_eq!(record.last_name, "Lee");
        assert_eq!(record.role, Role::Teacher);
    }

    #[test]
    fn test_update_rejects_unknown_role() {
        let args = UpdateArgs {
            first_name: None,
            last_name: None,
            role: Some("janitor".to_owned()),
            profile_image: None,
            active: None,
        };
        assert!(matches!(
            args.into_patch().unwrap_err(),
            CliError::InvalidRole(r) if r == "janitor"
        ));
    }

    #[test]
    fn test_logout_keeps_profile() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        seed(&ctx, "a@school.org", Role::Admin);

        logout(&ctx, None).unwrap();

        assert_eq!(ctx.session.active_email(), None);
        assert!(ctx.session.get_admin_data_by_email("a@school.org").is_some());
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let ctx = context(&dir);
            seed(&ctx, "a@school.org", Role::Student);
            token(&ctx, "a@school.org", "tok-123".to_owned()).unwrap();
        }

        let ctx = context(&dir);
        assert_eq!(ctx.session.active_email().as_deref(), Some("a@school.org"));
        assert!(ctx.session.bearer_token().is_some());
    }
}
