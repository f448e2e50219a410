//! HTTP client for the School Portal backend.
//!
//! Every request carries the configured timeout (30 s by default) and, when a
//! token is given, an `Authorization: Bearer` header. There is no retry: a
//! failure is classified into an [`ApiError`] and handed back to the form.

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use school_portal_core::wire::{
    AccountCreated, CreateSuperRequest, Envelope, ErrorBody, LoginEcho, LoginRequest,
    UploadReceipt, fields,
};
use school_portal_core::{AdminRecord, FieldErrors, Role};

use crate::config::ClientConfig;

/// Message shown when the server could not be reached.
pub const NO_RESPONSE_MESSAGE: &str =
    "No response from server. Please check your connection and try again.";

/// Message shown when the request could not be built or sent.
pub const REQUEST_SETUP_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("server responded with {status}: {message}")]
    Server {
        status: u16,
        message: String,
        errors: Option<FieldErrors>,
    },

    /// The request was sent but no response arrived (connect failure,
    /// timeout, connection reset).
    #[error("no response from server: {0}")]
    NoResponse(#[source] reqwest::Error),

    /// The request could not be built.
    #[error("request setup failed: {0}")]
    RequestSetup(String),

    /// The server answered with a success status and an unexpected body.
    #[error("unexpected response body: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } => message.clone(),
            Self::NoResponse(_) => NO_RESPONSE_MESSAGE.to_owned(),
            Self::RequestSetup(_) | Self::InvalidResponse(_) => REQUEST_SETUP_MESSAGE.to_owned(),
        }
    }

    fn from_send(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::RequestSetup(err.to_string())
        } else {
            Self::NoResponse(err)
        }
    }
}

/// Profile picture attached to an admin creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fields of an admin creation request.
#[derive(Clone)]
pub struct CreateAdminRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Role,
    pub school_name: String,
    pub school_code: Option<String>,
    pub profile_image: Option<ProfileImage>,
}

impl std::fmt::Debug for CreateAdminRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAdminRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("school_name", &self.school_name)
            .field("school_code", &self.school_code)
            .field("profile_image", &self.profile_image.as_ref().map(|i| &i.file_name))
            .finish()
    }
}

impl CreateAdminRequest {
    fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new()
            .text(fields::FIRST_NAME, self.first_name)
            .text(fields::LAST_NAME, self.last_name)
            .text(fields::EMAIL, self.email)
            .text(fields::PASSWORD, self.password.expose_secret().to_owned())
            .text(fields::ROLE, self.role.to_string())
            .text(fields::SCHOOL_NAME, self.school_name);

        if let Some(code) = self.school_code {
            form = form.text(fields::SCHOOL_CODE, code);
        }
        if let Some(image) = self.profile_image {
            form = form.part(fields::PROFILE_IMAGE, image.into_part()?);
        }
        Ok(form)
    }
}

impl ProfileImage {
    fn into_part(self) -> Result<Part, ApiError> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
            .map_err(|e| ApiError::RequestSetup(format!("invalid content type: {e}")))
    }
}

/// Backend API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestSetup` if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::RequestSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Backend origin.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /` - health check.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn health(&self) -> Result<String, ApiError> {
        let envelope: Envelope<serde_json::Value> =
            self.send(self.client.get(self.url("")?), None).await?;
        Ok(envelope.message)
    }

    /// `POST /auth/login` - placeholder login; the server echoes the origin.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginEcho, ApiError> {
        let body = LoginRequest {
            email: email.to_owned(),
            password: password.clone(),
        };
        let request = self.client.post(self.url("auth/login")?).json(&body);
        let envelope: Envelope<LoginEcho> = self.send(request, None).await?;
        envelope.data.ok_or_else(|| missing_data("login"))
    }

    /// `POST /create-admin` - multipart admin creation.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn create_admin(
        &self,
        request: CreateAdminRequest,
        token: Option<&SecretString>,
    ) -> Result<AdminRecord, ApiError> {
        tracing::debug!(email = %request.email, "Creating admin account");
        let form = request.into_form()?;
        let builder = self.client.post(self.url("create-admin")?).multipart(form);
        let envelope: Envelope<AccountCreated> = self.send(builder, token).await?;
        envelope
            .data
            .map(|d| d.admin)
            .ok_or_else(|| missing_data("create-admin"))
    }

    /// `POST /create-super` - JSON super-admin creation.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn create_super(
        &self,
        request: &CreateSuperRequest,
        token: Option<&SecretString>,
    ) -> Result<AdminRecord, ApiError> {
        tracing::debug!(email = %request.email, "Creating super admin account");
        let builder = self.client.post(self.url("create-super")?).json(request);
        let envelope: Envelope<AccountCreated> = self.send(builder, token).await?;
        envelope
            .data
            .map(|d| d.admin)
            .ok_or_else(|| missing_data("create-super"))
    }

    /// `POST /` - profile picture upload.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn upload_profile_picture(
        &self,
        image: ProfileImage,
        token: Option<&SecretString>,
    ) -> Result<UploadReceipt, ApiError> {
        let form = Form::new().part(fields::PROFILE_IMAGE, image.into_part()?);
        let builder = self.client.post(self.url("")?).multipart(form);
        let envelope: Envelope<UploadReceipt> = self.send(builder, token).await?;
        envelope.data.ok_or_else(|| missing_data("upload"))
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::RequestSetup(format!("invalid path '{path}': {e}")))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let builder = match token {
            Some(t) => builder.bearer_auth(t.expose_secret()),
            None => builder,
        };

        let response = builder.send().await.map_err(ApiError::from_send)?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(server_error(status, &text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Build `ApiError::Server` from an error response body, preferring the
/// server's `message`.
fn server_error(status: StatusCode, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    let message = parsed
        .as_ref()
        .map(|b| b.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_owned()
        });

    tracing::warn!(status = status.as_u16(), message = %message, "API request rejected");

    ApiError::Server {
        status: status.as_u16(),
        message,
        errors: parsed.and_then(|b| b.errors),
    }
}

fn missing_data(endpoint: &str) -> ApiError {
    ApiError::InvalidResponse(format!("{endpoint} response has no data"))
}
