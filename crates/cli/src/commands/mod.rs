//! CLI command implementations.

pub mod account;
pub mod session;

use std::path::PathBuf;

use thiserror::Error;

use school_portal_portal::api::{ApiClient, ApiError};
use school_portal_portal::config::{ClientConfig, ConfigError};
use school_portal_portal::forms::SubmitError;
use school_portal_portal::session::SessionStore;
use school_portal_portal::store::{FileStore, StoreError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot open session storage: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{}", .0.toast().message)]
    Submit(#[from] SubmitError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, teacher, student")]
    InvalidRole(String),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Nothing to update; pass at least one field")]
    NothingToUpdate,

    #[error("No cached account for {0}")]
    UnknownAccount(String),

    #[error("Could not {0}; see the log above")]
    SessionWrite(&'static str),
}

/// Everything a command needs: configuration, API client and session store.
pub struct Context {
    pub api: ApiClient,
    pub session: SessionStore<FileStore>,
}

impl Context {
    /// Build the context from the environment plus command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if configuration is invalid or the store cannot be
    /// opened.
    pub fn load(api_url: Option<&str>, store: Option<PathBuf>) -> Result<Self, CliError> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = api_url {
            config = config.with_api_url(url)?;
        }
        if let Some(path) = store {
            config.store_path = path;
        }
        Self::from_config(&config)
    }

    /// Build the context from a ready configuration.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the store cannot be opened.
    pub fn from_config(config: &ClientConfig) -> Result<Self, CliError> {
        tracing::debug!(
            api = %config.api_base_url,
            store = %config.store_path.display(),
            "Loading context"
        );
        Ok(Self {
            api: ApiClient::new(config)?,
            session: SessionStore::new(FileStore::open(config.store_path.clone())?),
        })
    }
}
