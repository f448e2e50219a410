//! Account roles and the dashboards they land on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}. Valid roles: super_admin, admin, teacher, student")]
pub struct RoleParseError(pub String);

/// Account role with a dedicated dashboard per level.
///
/// Parsing with [`FromStr`](std::str::FromStr) only accepts the known roles.
/// Deserializing keeps any other string as [`Role::Other`] so cached records
/// with an unfamiliar role still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// Manages schools and their admins.
    SuperAdmin,
    /// Manages a single school.
    Admin,
    /// Teaches classes within a school.
    Teacher,
    /// Enrolled in a school.
    Student,
    /// A role this build does not know. Has no dashboard.
    Other(String),
}

impl Role {
    /// All known roles, highest privilege first.
    pub const ALL: [Self; 4] = [Self::SuperAdmin, Self::Admin, Self::Teacher, Self::Student];

    /// Route that accounts without a dashboard are sent to.
    pub const NO_DASHBOARD_PATH: &'static str = "/login";

    /// Wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Other(name) => name,
        }
    }

    /// Returns true for roles with a dashboard of their own.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Client route of the dashboard for this role.
    #[must_use]
    pub const fn dashboard_path(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "/super-admin/dashboard",
            Self::Admin => "/admin/dashboard",
            Self::Teacher => "/teacher/dashboard",
            Self::Student => "/student/dashboard",
            Self::Other(_) => Self::NO_DASHBOARD_PATH,
        }
    }

    /// Human readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::Teacher => "Teacher",
            Self::Student => "Student",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Self::Other(raw)))
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "super_admin" | "super-admin" | "superadmin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_super_admin_aliases() {
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("superadmin".parse::<Role>().unwrap(), Role::SuperAdmin);
    }

    #[test]
    fn test_unknown_role() {
        let err = "principal".parse::<Role>().unwrap_err();
        assert_eq!(err, RoleParseError("principal".to_owned()));
    }

    #[test]
    fn test_dashboards_are_distinct() {
        let paths: std::collections::HashSet<_> =
            Role::ALL.iter().map(|r| r.dashboard_path()).collect();
        assert_eq!(paths.len(), 4);
        assert_eq!(Role::Teacher.dashboard_path(), "/teacher/dashboard");
    }

    #[test]
    fn test_unknown_role_deserializes_as_other() {
        let role: Role = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(role, Role::Other("x".to_owned()));
        assert!(!role.is_known());
        assert_eq!(role.dashboard_path(), Role::NO_DASHBOARD_PATH);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"x\"");
    }

    #[test]
    fn test_other_is_never_parsed() {
        assert!("x".parse::<Role>().is_err());
        assert_eq!(
            serde_json::from_str::<Role>("\"admin\"").unwrap(),
            Role::Admin
        );
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
    }
}
