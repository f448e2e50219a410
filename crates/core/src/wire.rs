//! Request and response bodies exchanged between the portal and the server.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::types::AdminRecord;
use crate::validation::FieldErrors;

/// Multipart field names of the admin creation form.
pub mod fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const ROLE: &str = "role";
    pub const SCHOOL_NAME: &str = "schoolName";
    pub const SCHOOL_CODE: &str = "schoolCode";
    pub const PROFILE_IMAGE: &str = "profileImage";
}

/// Standard JSON envelope of every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Successful envelope without data.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// Plain-string serde for secret fields; the value stays wrapped in memory.
mod secret_string {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::from)
    }
}

/// Payload of `POST /create-super`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuperRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(with = "secret_string")]
    pub password: SecretString,
}

impl std::fmt::Debug for CreateSuperRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSuperRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Payload of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(with = "secret_string")]
    pub password: SecretString,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Data of the login placeholder response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEcho {
    /// The request's `Origin` header, if it had one.
    pub origin: Option<String>,
}

/// Data of the account creation responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreated {
    pub admin: AdminRecord,
}

/// Data of the profile picture upload response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_data_omits_field() {
        let json = serde_json::to_value(Envelope::message("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "ok"}));
    }

    #[test]
    fn test_create_super_request_debug_redacts_password() {
        let req = CreateSuperRequest {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "a@b.com".to_owned(),
            password: SecretString::from("hunter22"),
        };
        let debug = format!("{req:?}");
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_create_super_request_password_is_plain_on_the_wire() {
        use secrecy::ExposeSecret;

        let req = CreateSuperRequest {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "a@b.com".to_owned(),
            password: SecretString::from("hunter22"),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["password"], "hunter22");
        assert_eq!(json["firstName"], "Ada");

        let back: CreateSuperRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back.password.expose_secret(), "hunter22");
    }

    #[test]
    fn test_envelope_without_data_deserializes() {
        let envelope: Envelope<UploadReceipt> =
            serde_json::from_str(r#"{"success":true,"message":"ok"}"#).unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_error_body_defaults() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"nope"}"#).unwrap();
        assert!(!body.success);
        assert!(body.errors.is_none());
    }
}
