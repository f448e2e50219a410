//! Integration tests for School Portal.
//!
//! Each test boots the real server router on an ephemeral port and drives it
//! with the portal client, so requests cross an actual TCP socket.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p school-portal-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use school_portal_portal::{ApiClient, ClientConfig};
use school_portal_server::{AppState, ServerConfig, app};
use tokio::task::JoinHandle;

/// A server running in the background of the current test runtime.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve the default configuration on `127.0.0.1:0`.
    ///
    /// # Errors
    ///
    /// Returns the bind error if no port is available.
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(ServerConfig::default()).await
    }

    /// Serve `config` on `127.0.0.1:0`, ignoring its host and port.
    ///
    /// # Errors
    ///
    /// Returns the bind error if no port is available.
    pub async fn spawn_with(config: ServerConfig) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = app(AppState::new(config));

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { addr, handle })
    }

    /// Origin of the server, e.g. `http://127.0.0.1:41234`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointed at this server with its store in `dir`.
    ///
    /// # Errors
    ///
    /// Returns the configuration error if the URL is rejected.
    pub fn client_config(
        &self,
        dir: &std::path::Path,
    ) -> Result<ClientConfig, school_portal_portal::config::ConfigError> {
        let mut config = ClientConfig::default().with_api_url(&self.url())?;
        config.store_path = dir.join("storage.json");
        Ok(config)
    }

    /// API client pointed at this server.
    ///
    /// # Errors
    ///
    /// Returns the client error if configuration or client construction fails.
    pub fn api(&self) -> Result<ApiClient, school_portal_portal::ApiError> {
        let config = ClientConfig::default()
            .with_api_url(&self.url())
            .map_err(|e| school_portal_portal::ApiError::RequestSetup(e.to_string()))?;
        ApiClient::new(&config)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
