//! Session store: the active admin identity and cached account records.
//!
//! # Storage layout
//!
//! ```text
//! user_<email>          canonical AdminRecord (permanent)
//! school_<email>        SchoolInfo of that record (permanent)
//! currentAdmin_<email>  AdminRecord copy for the signed-in session
//! token_<email>         bearer token of that session
//! currentActiveEmail    email of the signed-in admin
//! currentAdmin          AdminRecord of the last created account
//! schoolInfo            SchoolInfo of the last created account
//! createdSchoolName     name of the last created school
//! createdSchoolId       id of the last created school
//! token                 bearer token sent with API calls
//! ```
//!
//! `user_<email>` is the source of truth; every other key is a view derived
//! from it and written in the same [`WriteBatch`], so views never drift from
//! the canonical record after a failed write.
//!
//! Operations never return errors. Failures are logged with `tracing` and
//! reported as `false` / `None`, and a missing value is indistinguishable
//! from a corrupt one.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use school_portal_core::{AdminPatch, AdminRecord, SchoolInfo};

use crate::store::{KeyValueStore, StoreError, WriteBatch};

/// Storage key names.
pub mod keys {
    pub const CURRENT_ACTIVE_EMAIL: &str = "currentActiveEmail";
    pub const CURRENT_ADMIN: &str = "currentAdmin";
    pub const SCHOOL_INFO: &str = "schoolInfo";
    pub const CREATED_SCHOOL_NAME: &str = "createdSchoolName";
    pub const CREATED_SCHOOL_ID: &str = "createdSchoolId";
    pub const TOKEN: &str = "token";

    pub const USER_PREFIX: &str = "user_";
    pub const CURRENT_ADMIN_PREFIX: &str = "currentAdmin_";
    pub const SCHOOL_PREFIX: &str = "school_";
    pub const TOKEN_PREFIX: &str = "token_";

    #[must_use]
    pub fn user(email: &str) -> String {
        format!("{USER_PREFIX}{email}")
    }

    #[must_use]
    pub fn current_admin(email: &str) -> String {
        format!("{CURRENT_ADMIN_PREFIX}{email}")
    }

    #[must_use]
    pub fn school(email: &str) -> String {
        format!("{SCHOOL_PREFIX}{email}")
    }

    #[must_use]
    pub fn token(email: &str) -> String {
        format!("{TOKEN_PREFIX}{email}")
    }
}

/// Internal failure reasons, logged at the session boundary.
#[derive(Debug, Error)]
enum SessionError {
    #[error("admin record has no email")]
    MissingEmail,

    #[error("no active admin email is set")]
    NoActiveEmail,

    #[error("no admin record stored for {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read/write access to the locally persisted admin session.
///
/// Owns its store; all operations go through `&self`.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a key-value store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Cache `record` and make its email the active one.
    ///
    /// Writes `user_<email>`, `school_<email>` (when the record has a
    /// school), `currentActiveEmail` and `currentAdmin_<email>` in one batch.
    /// Returns false, without writing anything, if the email is blank or the
    /// store rejects the batch.
    #[must_use]
    pub fn store_admin_data(&self, record: &AdminRecord) -> bool {
        let result = normalized(record)
            .and_then(|record| admin_views(&record))
            .and_then(|batch| Ok(self.store.apply(batch)?));
        report("store admin data", result).is_some()
    }

    /// Cache a freshly created account, including the single-slot views the
    /// dashboards read (`currentAdmin`, `schoolInfo`, `createdSchoolName`,
    /// `createdSchoolId`).
    #[must_use]
    pub fn record_created_account(&self, record: &AdminRecord) -> bool {
        let result = normalized(record)
            .and_then(|record| {
                admin_views(&record).and_then(|batch| legacy_views(batch, &record))
            })
            .and_then(|batch| Ok(self.store.apply(batch)?));
        report("record created account", result).is_some()
    }

    /// Email of the signed-in admin.
    #[must_use]
    pub fn active_email(&self) -> Option<String> {
        report(
            "read active email",
            self.store
                .get(keys::CURRENT_ACTIVE_EMAIL)
                .map_err(SessionError::from),
        )
        .flatten()
        .filter(|e| !e.trim().is_empty())
    }

    /// Record of the signed-in admin.
    ///
    /// Prefers the session copy `currentAdmin_<email>` and falls back to the
    /// canonical `user_<email>`.
    #[must_use]
    pub fn get_current_admin_data(&self) -> Option<AdminRecord> {
        let email = self.active_email()?;
        self.read_record(&keys::current_admin(&email))
            .or_else(|| self.read_record(&keys::user(&email)))
    }

    /// Canonical record stored for `email`.
    #[must_use]
    pub fn get_admin_data_by_email(&self, email: &str) -> Option<AdminRecord> {
        self.read_record(&keys::user(email))
    }

    /// Shallow-merge `patch` into the signed-in admin's record.
    ///
    /// Rewrites `user_<email>` and `currentAdmin_<email>` (and
    /// `school_<email>` when the merged record has a school). Returns false
    /// if no admin is signed in or no record exists for them.
    #[must_use]
    pub fn update_admin_data(&self, patch: AdminPatch) -> bool {
        let result = self.try_update(patch);
        report("update admin data", result).is_some()
    }

    fn try_update(&self, patch: AdminPatch) -> Result<(), SessionError> {
        let email = self.active_email().ok_or(SessionError::NoActiveEmail)?;
        let mut record = self
            .get_admin_data_by_email(&email)
            .ok_or_else(|| SessionError::NotFound(email.clone()))?;

        record.merge(patch);

        let json = serde_json::to_string(&record)?;
        let mut batch = WriteBatch::new()
            .set(keys::user(&email), json.clone())
            .set(keys::current_admin(&email), json);
        if let Some(school) = &record.school {
            batch = batch.set(keys::school(&email), serde_json::to_string(school)?);
        }

        self.store.apply(batch)?;
        tracing::debug!(email = %email, "Updated admin record");
        Ok(())
    }

    /// Emails of every cached admin record, in key order.
    #[must_use]
    pub fn get_all_admin_emails(&self) -> Vec<String> {
        report(
            "list admin emails",
            self.store
                .keys_with_prefix(keys::USER_PREFIX)
                .map_err(SessionError::from),
        )
        .unwrap_or_default()
        .into_iter()
        .filter_map(|k| k.strip_prefix(keys::USER_PREFIX).map(str::to_owned))
        .collect()
    }

    /// Make `email` the active admin. Fails if no record is cached for it.
    #[must_use]
    pub fn set_active_email(&self, email: &str) -> bool {
        let result = if self.get_admin_data_by_email(email).is_some() {
            self.store
                .set(keys::CURRENT_ACTIVE_EMAIL, email)
                .map_err(SessionError::from)
        } else {
            Err(SessionError::NotFound(email.to_owned()))
        };
        report("set active email", result).is_some()
    }

    /// Save the bearer token issued to `email`.
    #[must_use]
    pub fn store_token(&self, email: &str, token: &SecretString) -> bool {
        let result = if email.trim().is_empty() {
            Err(SessionError::MissingEmail)
        } else {
            self.store
                .apply(
                    WriteBatch::new()
                        .set(keys::TOKEN, token.expose_secret())
                        .set(keys::token(email), token.expose_secret()),
                )
                .map_err(SessionError::from)
        };
        report("store token", result).is_some()
    }

    /// Token to send as `Authorization: Bearer` with API calls.
    #[must_use]
    pub fn bearer_token(&self) -> Option<SecretString> {
        report(
            "read token",
            self.store.get(keys::TOKEN).map_err(SessionError::from),
        )
        .flatten()
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
    }

    /// Sign out: drop the session-scoped keys of `email` (the active email
    /// when `None`) and clear `currentActiveEmail`. The permanent
    /// `user_<email>` and `school_<email>` entries are kept.
    #[must_use]
    pub fn clear_session_data(&self, email: Option<&str>) -> bool {
        let email = email.map(str::to_owned).or_else(|| self.active_email());

        let mut batch = WriteBatch::new();
        if let Some(email) = &email {
            batch = batch
                .remove(keys::current_admin(email))
                .remove(keys::token(email));
        }
        batch = batch.remove(keys::CURRENT_ACTIVE_EMAIL);

        let result = self.store.apply(batch).map_err(SessionError::from);
        report("clear session data", result).is_some()
    }

    /// Forget `email` (the active email when `None`) entirely: every
    /// per-email key, the single-slot views and token when they belong to
    /// it, and `currentActiveEmail`.
    #[must_use]
    pub fn clear_all_admin_data(&self, email: Option<&str>) -> bool {
        let result = email
            .map(str::to_owned)
            .or_else(|| self.active_email())
            .ok_or(SessionError::NoActiveEmail)
            .and_then(|email| self.try_clear_all(email.trim()));
        report("clear all admin data", result).is_some()
    }

    fn try_clear_all(&self, email: &str) -> Result<(), SessionError> {
        let mut batch = WriteBatch::new()
            .remove(keys::user(email))
            .remove(keys::school(email))
            .remove(keys::current_admin(email))
            .remove(keys::token(email));

        let owns_legacy = self
            .read_record(keys::CURRENT_ADMIN)
            .is_some_and(|r| r.email.trim() == email);
        if owns_legacy {
            batch = batch
                .remove(keys::CURRENT_ADMIN)
                .remove(keys::SCHOOL_INFO)
                .remove(keys::CREATED_SCHOOL_NAME)
                .remove(keys::CREATED_SCHOOL_ID);
        }

        let shared_token = self.store.get(keys::TOKEN)?;
        if shared_token.is_some() && shared_token == self.store.get(&keys::token(email))? {
            batch = batch.remove(keys::TOKEN);
        }

        batch = batch.remove(keys::CURRENT_ACTIVE_EMAIL);
        self.store.apply(batch)?;
        tracing::info!(email = %email, "Cleared all admin data");
        Ok(())
    }

    fn read_record(&self, key: &str) -> Option<AdminRecord> {
        let raw = report(
            "read admin record",
            self.store.get(key).map_err(SessionError::from),
        )??;

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring corrupt admin record");
                None
            }
        }
    }
}

/// Copy of `record` with its email trimmed, so keys and stored JSON agree.
fn normalized(record: &AdminRecord) -> Result<AdminRecord, SessionError> {
    let email = record.email.trim();
    if email.is_empty() {
        return Err(SessionError::MissingEmail);
    }
    Ok(AdminRecord {
        email: email.to_owned(),
        ..record.clone()
    })
}

/// Per-email views of a normalized `record` plus the active email marker.
fn admin_views(record: &AdminRecord) -> Result<WriteBatch, SessionError> {
    let email = record.email.as_str();
    let json = serde_json::to_string(record)?;
    let mut batch = WriteBatch::new().set(keys::user(email), json.clone());
    if let Some(school) = &record.school {
        batch = batch.set(keys::school(email), serde_json::to_string(school)?);
    }
    Ok(batch
        .set(keys::CURRENT_ACTIVE_EMAIL, email)
        .set(keys::current_admin(email), json))
}

/// Single-slot views of the last created account.
fn legacy_views(batch: WriteBatch, record: &AdminRecord) -> Result<WriteBatch, SessionError> {
    let mut batch = batch.set(keys::CURRENT_ADMIN, serde_json::to_string(record)?);
    if let Some(SchoolInfo { name, id, .. }) = &record.school {
        batch = batch
            .set(keys::SCHOOL_INFO, serde_json::to_string(&record.school)?)
            .set(keys::CREATED_SCHOOL_NAME, name.as_str())
            .set(keys::CREATED_SCHOOL_ID, id.as_str());
    }
    Ok(batch)
}

/// Log a failed session operation and turn the result into an `Option`.
fn report<T>(operation: &str, result: Result<T, SessionError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(
            e @ (SessionError::MissingEmail
            | SessionError::NoActiveEmail
            | SessionError::NotFound(_)),
        ) => {
            tracing::warn!(operation, error = %e, "Session operation skipped");
            None
        }
        Err(e) => {
            tracing::error!(operation, error = %e, "Session operation failed");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use school_portal_core::Role;

    use super::*;
    use crate::store::MemoryStore;

    fn school() -> SchoolInfo {
        SchoolInfo {
            name: "North Ridge".to_owned(),
            id: "sch-42".to_owned(),
            code: "NORT-42".to_owned(),
        }
    }

    fn record(email: &str) -> AdminRecord {
        AdminRecord::new(email, "Ada", "Lovelace", Role::Admin).with_school(school())
    }

    fn session() -> SessionStore<MemoryStore> {
        SessionStore::new(MemoryStore::new())
    }

    #[test]
    fn test_store_without_email_writes_nothing() {
        let session = session();
        let mut r = record("a@b.com");
        r.email = "  ".to_owned();

        assert!(!session.store_admin_data(&r));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_store_then_get_current() {
        let session = session();
        assert!(session.store_admin_data(&record("a@b.com")));

        let current = session.get_current_admin_data().unwrap();
        assert_eq!(current.email, "a@b.com");
        assert_eq!(session.active_email().as_deref(), Some("a@b.com"));
        assert!(session.store().get("school_a@b.com").unwrap().is_some());
        assert!(session.store().get("currentAdmin_a@b.com").unwrap().is_some());
    }

    #[test]
    fn test_store_without_school_skips_school_key() {
        let session = session();
        let r = AdminRecord::new("s@b.com", "Sam", "Root", Role::SuperAdmin);
        assert!(session.store_admin_data(&r));
        assert_eq!(session.store().get("school_s@b.com").unwrap(), None);
    }

    #[test]
    fn test_padded_email_is_stored_trimmed_and_forgotten() {
        let session = session();
        assert!(session.record_created_account(&record(" a@b.com ")));

        let stored = session.get_admin_data_by_email("a@b.com").unwrap();
        assert_eq!(stored.email, "a@b.com");

        assert!(session.clear_all_admin_data(Some("a@b.com")));
        assert_eq!(session.store().get(keys::CURRENT_ADMIN).unwrap(), None);
        assert_eq!(session.store().get(keys::SCHOOL_INFO).unwrap(), None);
        assert_eq!(session.store().get(keys::CREATED_SCHOOL_ID).unwrap(), None);
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_unknown_role_survives_store_and_merge() {
        let session = session();
        let cached = serde_json::json!({
            "email": "a@b.com",
            "role": "x",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z",
        });
        session
            .store()
            .set("user_a@b.com", &cached.to_string())
            .unwrap();
        session.store().set(keys::CURRENT_ACTIVE_EMAIL, "a@b.com").unwrap();

        let cached = session.get_admin_data_by_email("a@b.com").unwrap();
        assert_eq!(cached.role, Role::Other("x".to_owned()));

        assert!(session.update_admin_data(AdminPatch {
            first_name: Some("Ada".to_owned()),
            ..AdminPatch::default()
        }));
        let merged = session.get_current_admin_data().unwrap();
        assert_eq!(merged.role, Role::Other("x".to_owned()));
        assert_eq!(merged.first_name, "Ada");

        assert!(session.update_admin_data(AdminPatch {
            role: Some(Role::Other("y".to_owned())),
            ..AdminPatch::default()
        }));
        assert_eq!(
            session.get_admin_data_by_email("a@b.com").unwrap().role,
            Role::Other("y".to_owned())
        );
    }

    #[test]
    fn test_get_current_without_active_email() {
        let session = session();
        session.store().set("user_a@b.com", "{}").unwrap();
        assert!(session.get_current_admin_data().is_none());
    }

    #[test]
    fn test_get_current_falls_back_to_user_key() {
        let session = session();
        assert!(session.store_admin_data(&record("a@b.com")));
        session.store().remove("currentAdmin_a@b.com").unwrap();

        assert_eq!(session.get_current_admin_data().unwrap().email, "a@b.com");
    }

    #[test]
    fn test_corrupt_json_reads_as_none() {
        let session = session();
        session.store().set("user_a@b.com", "{not json").unwrap();
        session.store().set("currentActiveEmail", "a@b.com").unwrap();

        assert!(session.get_admin_data_by_email("a@b.com").is_none());
        assert!(session.get_current_admin_data().is_none());
    }

    #[test]
    fn test_update_merges_and_stamps() {
        let session = session();
        let original = record("a@b.com");
        assert!(session.store_admin_data(&original));

        assert!(session.update_admin_data(AdminPatch {
            role: Some(Role::Teacher),
            ..AdminPatch::default()
        }));

        let updated = session.get_admin_data_by_email("a@b.com").unwrap();
        assert_eq!(updated.role, Role::Teacher);
        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.school, Some(school()));
        assert!(updated.updated_at > updated.created_at);
        assert_eq!(session.get_current_admin_data().unwrap(), updated);
    }

    #[test]
    fn test_update_without_active_email_fails() {
        let session = session();
        assert!(!session.update_admin_data(AdminPatch::default()));
    }

    #[test]
    fn test_get_all_admin_emails() {
        let session = session();
        assert!(session.store_admin_data(&record("b@b.com")));
        assert!(session.store_admin_data(&record("a@b.com")));
        session.store().set("token", "x").unwrap();

        assert_eq!(
            session.get_all_admin_emails(),
            vec!["a@b.com".to_owned(), "b@b.com".to_owned()]
        );
    }

    #[test]
    fn test_clear_session_keeps_permanent_keys() {
        let session = session();
        assert!(session.store_admin_data(&record("a@b.com")));
        assert!(session.store_token("a@b.com", &SecretString::from("tok")));

        assert!(session.clear_session_data(Some("a@b.com")));

        assert_eq!(session.store().get("currentAdmin_a@b.com").unwrap(), None);
        assert_eq!(session.store().get("token_a@b.com").unwrap(), None);
        assert_eq!(session.active_email(), None);
        assert!(session.get_admin_data_by_email("a@b.com").is_some());
        assert!(session.store().get("school_a@b.com").unwrap().is_some());
    }

    #[test]
    fn test_clear_session_defaults_to_active_email() {
        let session = session();
        assert!(session.store_admin_data(&record("a@b.com")));

        assert!(session.clear_session_data(None));
        assert_eq!(session.store().get("currentAdmin_a@b.com").unwrap(), None);
    }

    #[test]
    fn test_clear_all_removes_everything_for_email() {
        let session = session();
        let r = record("a@b.com");
        assert!(session.record_created_account(&r));
        assert!(session.store_token("a@b.com", &SecretString::from("tok")));
        assert!(session.store_admin_data(&record("other@b.com")));

        assert!(session.clear_all_admin_data(Some("a@b.com")));

        assert!(session.get_admin_data_by_email("a@b.com").is_none());
        assert_eq!(session.store().get("school_a@b.com").unwrap(), None);
        assert_eq!(session.store().get("currentAdmin").unwrap(), None);
        assert_eq!(session.store().get("createdSchoolId").unwrap(), None);
        assert!(session.bearer_token().is_none());
        assert_eq!(session.active_email(), None);
        assert!(session.get_admin_data_by_email("other@b.com").is_some());
    }

    #[test]
    fn test_clear_all_without_any_email_fails() {
        let session = session();
        assert!(!session.clear_all_admin_data(None));
    }

    #[test]
    fn test_record_created_account_writes_views() {
        let session = session();
        assert!(session.record_created_account(&record("a@b.com")));

        let store = session.store();
        assert_eq!(store.get("createdSchoolName").unwrap().as_deref(), Some("North Ridge"));
        assert_eq!(store.get("createdSchoolId").unwrap().as_deref(), Some("sch-42"));
        let info: SchoolInfo =
            serde_json::from_str(&store.get("schoolInfo").unwrap().unwrap()).unwrap();
        assert_eq!(info, school());
        let legacy: AdminRecord =
            serde_json::from_str(&store.get("currentAdmin").unwrap().unwrap()).unwrap();
        assert_eq!(legacy.email, "a@b.com");
    }

    #[test]
    fn test_quota_failure_leaves_no_partial_state() {
        let session = SessionStore::new(MemoryStore::with_quota(64));
        assert!(!session.store_admin_data(&record("a@b.com")));
        assert!(session.store().is_empty());
        assert!(session.get_current_admin_data().is_none());
    }

    #[test]
    fn test_set_active_email_requires_record() {
        let session = session();
        assert!(!session.set_active_email("ghost@b.com"));

        assert!(session.store_admin_data(&record("a@b.com")));
        assert!(session.store_admin_data(&record("b@b.com")));
        assert!(session.set_active_email("a@b.com"));
        assert_eq!(session.active_email().as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_token_roundtrip() {
        let session = session();
        assert!(session.bearer_token().is_none());
        assert!(session.store_token("a@b.com", &SecretString::from("abc")));
        assert_eq!(session.bearer_token().unwrap().expose_secret(), "abc");
        assert!(!session.store_token("", &SecretString::from("abc")));
    }
}
