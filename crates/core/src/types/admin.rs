//! Admin record as cached by the portal and returned by the server.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, SchoolInfo};

const fn default_active() -> bool {
    true
}

/// An account record.
///
/// Serialized with camelCase keys; this is the JSON shape both the server
/// responses and the portal's session storage use.
///
/// `email` is the identity key. It is a plain string rather than an
/// [`Email`](super::Email) because cached records are read back without
/// validation and may carry an empty email, which the session store rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<SchoolInfo>,
    /// URL or data reference of the profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminRecord {
    /// Create an active record stamped with the current time.
    #[must_use]
    pub fn new(email: impl Into<String>, first_name: &str, last_name: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            email: email.into(),
            first_name: first_name.trim().to_owned(),
            last_name: last_name.trim().to_owned(),
            role,
            school: None,
            profile_image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a school.
    #[must_use]
    pub fn with_school(mut self, school: SchoolInfo) -> Self {
        self.school = Some(school);
        self
    }

    /// "First Last", falling back to the email when both names are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_owned()
        }
    }

    /// Shallow-merge `patch` over this record and stamp `updated_at`.
    ///
    /// Only top-level fields are replaced; a patched `school` replaces the
    /// whole school object. The new `updated_at` is the current time, bumped
    /// forward if needed so that it is strictly later than both the previous
    /// `updated_at` and `created_at`.
    pub fn merge(&mut self, patch: AdminPatch) {
        let AdminPatch {
            first_name,
            last_name,
            role,
            school,
            profile_image,
            is_active,
        } = patch;

        if let Some(v) = first_name {
            self.first_name = v;
        }
        if let Some(v) = last_name {
            self.last_name = v;
        }
        if let Some(v) = role {
            self.role = v;
        }
        if let Some(v) = school {
            self.school = Some(v);
        }
        if let Some(v) = profile_image {
            self.profile_image = Some(v);
        }
        if let Some(v) = is_active {
            self.is_active = v;
        }

        let floor = self.updated_at.max(self.created_at) + Duration::milliseconds(1);
        self.updated_at = Utc::now().max(floor);
    }
}

/// A partial update of an [`AdminRecord`].
///
/// `None` leaves the field untouched. The email is not patchable since it
/// is the record's identity key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<SchoolInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl AdminPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
