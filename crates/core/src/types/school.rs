//! School summary attached to admin records.

use serde::{Deserialize, Serialize};

/// The school an admin belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolInfo {
    /// Display name.
    pub name: String,
    /// Server-assigned identifier.
    pub id: String,
    /// Short enrolment code handed out to teachers and students.
    pub code: String,
}

impl SchoolInfo {
    /// Derive an enrolment code from a school name and its id.
    ///
    /// Takes up to four leading alphanumeric characters of the name,
    /// uppercased, and the first six alphanumeric characters of the id:
    /// `"North Ridge High"` with id `"7f3a9c1e-..."` gives `"NORT-7F3A9C"`.
    #[must_use]
    pub fn derive_code(name: &str, id: &str) -> String {
        let prefix: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(4)
            .collect::<String>()
            .to_ascii_uppercase();
        let suffix: String = id
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(6)
            .collect::<String>()
            .to_ascii_uppercase();

        if prefix.is_empty() {
            suffix
        } else {
            format!("{prefix}-{suffix}")
        }
    }
}
